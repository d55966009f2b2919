use crate::difficulty::ManualControls;
use crate::player::PlayerId;

/// Receiver of state pushed by the engine after every step.
/// Implementations: the window-title renderer in the binary, [`RecordingSink`]
/// (testing), [`NullSink`].
pub trait PresentationSink {
    /// Meter fill for a player, 0.0 - 100.0.
    fn render_progress(&mut self, player: PlayerId, percent: f64);

    /// Round result text and style class; `None` text clears the banner.
    fn render_winner(&mut self, text: Option<&str>, style: Option<&str>);

    fn render_score(&mut self, player: PlayerId, score: u32);

    fn render_controller_label(&mut self, player: PlayerId, label: &str);

    /// Manual sliders after a resolve (resynchronized on presets).
    fn render_manual_controls(&mut self, _manual: &ManualControls) {}
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Progress(PlayerId, f64),
    Winner(Option<String>, Option<String>),
    Score(PlayerId, u32),
    ControllerLabel(PlayerId, String),
    ManualControls(ManualControls),
}

/// Sink that records every call, for tests and replays.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<RenderCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last rendered percent for a player.
    pub fn last_progress(&self, player: PlayerId) -> Option<f64> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::Progress(p, v) if *p == player => Some(*v),
            _ => None,
        })
    }

    pub fn last_score(&self, player: PlayerId) -> Option<u32> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::Score(p, v) if *p == player => Some(*v),
            _ => None,
        })
    }

    pub fn last_label(&self, player: PlayerId) -> Option<&str> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::ControllerLabel(p, label) if *p == player => Some(label.as_str()),
            _ => None,
        })
    }

    /// Last winner banner as (text, style).
    pub fn last_winner(&self) -> Option<(Option<&str>, Option<&str>)> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::Winner(text, style) => Some((text.as_deref(), style.as_deref())),
            _ => None,
        })
    }
}

impl PresentationSink for RecordingSink {
    fn render_progress(&mut self, player: PlayerId, percent: f64) {
        self.calls.push(RenderCall::Progress(player, percent));
    }

    fn render_winner(&mut self, text: Option<&str>, style: Option<&str>) {
        self.calls.push(RenderCall::Winner(
            text.map(str::to_string),
            style.map(str::to_string),
        ));
    }

    fn render_score(&mut self, player: PlayerId, score: u32) {
        self.calls.push(RenderCall::Score(player, score));
    }

    fn render_controller_label(&mut self, player: PlayerId, label: &str) {
        self.calls
            .push(RenderCall::ControllerLabel(player, label.to_string()));
    }

    fn render_manual_controls(&mut self, manual: &ManualControls) {
        self.calls.push(RenderCall::ManualControls(*manual));
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn render_progress(&mut self, _player: PlayerId, _percent: f64) {}
    fn render_winner(&mut self, _text: Option<&str>, _style: Option<&str>) {}
    fn render_score(&mut self, _player: PlayerId, _score: u32) {}
    fn render_controller_label(&mut self, _player: PlayerId, _label: &str) {}
}
