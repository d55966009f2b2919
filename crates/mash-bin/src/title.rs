use std::collections::BTreeMap;
use std::fmt::Write;

use mash_play::{Difficulty, ManualControls, MatchState, PlayerId, PresentationSink};

#[derive(Debug, Default, Clone, PartialEq)]
struct Row {
    percent: f64,
    score: u32,
    label: String,
}

/// Sink that renders the match into a single window-title line.
#[derive(Debug, Default)]
pub struct TitleSink {
    rows: BTreeMap<PlayerId, Row>,
    banner: Option<String>,
    manual: ManualControls,
    dirty: bool,
}

impl TitleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn title(&self, state: &MatchState) -> String {
        let difficulty = state.difficulty();
        let mut title = format!("Mash Race [{difficulty}");
        if difficulty == Difficulty::Manual {
            let _ = write!(
                title,
                " +{} -{}",
                self.manual.increment,
                self.manual.drain_rate_label()
            );
        }
        title.push(']');

        if self.rows.is_empty() {
            title.push_str(" | Press a key or button to join");
        }
        for (id, row) in &self.rows {
            let _ = write!(
                title,
                " | {id} ({}) {:.0}% [{}]",
                row.label, row.percent, row.score
            );
        }
        if let Some(banner) = &self.banner {
            let _ = write!(title, " | {banner}");
        }
        title
    }

    fn row(&mut self, player: PlayerId) -> &mut Row {
        self.dirty = true;
        self.rows.entry(player).or_default()
    }
}

impl PresentationSink for TitleSink {
    fn render_progress(&mut self, player: PlayerId, percent: f64) {
        let row = self.row(player);
        row.percent = percent;
    }

    fn render_winner(&mut self, text: Option<&str>, _style: Option<&str>) {
        self.banner = text.map(str::to_string);
        self.dirty = true;
    }

    fn render_score(&mut self, player: PlayerId, score: u32) {
        self.row(player).score = score;
    }

    fn render_controller_label(&mut self, player: PlayerId, label: &str) {
        self.row(player).label = label.to_string();
    }

    fn render_manual_controls(&mut self, manual: &ManualControls) {
        self.manual = *manual;
        self.dirty = true;
    }
}
