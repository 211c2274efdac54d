use clap::{Parser, Subcommand};

use self::{play::PlayArg, scores::ScoresArg, serve::ServeArg};

mod play;
mod scores;
mod serve;

/// Default location of the scoreboard service.
const DEFAULT_SCOREBOARD_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Run the high-score service
    Serve(#[clap(flatten)] ServeArg),
    /// Print the high-score table
    Scores(#[clap(flatten)] ScoresArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Serve(arg) => {
            init_logger();
            serve::run(&arg)?;
        }
        Mode::Scores(arg) => {
            init_logger();
            scores::run(&arg)?;
        }
    }
    Ok(())
}

/// Logs to stderr, filtered by `RUST_LOG` (default `info`).
///
/// Not used by `play`, which owns the terminal.
fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
