// mash-race: button-mash progress race in a window.
//
// Player keys and pads go through the arbiter; the window title shows the match.

mod app;
mod keys;
mod session;
mod title;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use mash_input::{GilrsSource, SystemClock};
use mash_play::config::CONFIG_FILE;
use mash_play::{Difficulty, GameConfig, RosterVariant};

use session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    /// Two seated players on W and ArrowUp.
    FixedPair,
    /// Up to four players joining by key or gamepad.
    OpenFour,
}

impl From<VariantArg> for RosterVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::FixedPair => RosterVariant::FixedPair,
            VariantArg::OpenFour => RosterVariant::OpenFour,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mash-race", about = "Button-mash progress race")]
struct Args {
    /// Path to the JSON config file.
    #[arg(long, env = "MASH_RACE_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Roster variant (overrides the config file).
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Starting difficulty: easy, medium, hard or manual.
    #[arg(long)]
    difficulty: Option<String>,

    /// Log input and binding decisions.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_to(&self, config: &mut GameConfig) {
        if let Some(variant) = self.variant {
            config.variant = variant.into();
        }
        if let Some(name) = &self.difficulty {
            config.difficulty = Difficulty::from_name_lenient(name);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = GameConfig::load_from(&args.config)?;
    args.apply_to(&mut config);
    info!(
        "Starting {:?} at {} difficulty",
        config.variant, config.difficulty
    );

    let session = Session::new(
        config,
        args.config.clone(),
        GilrsSource::new(),
        SystemClock::new(),
    );
    app::run(session)
}
