use anyhow::Context as _;
use cascadris_engine::Scoreboard as _;
use cascadris_scoreboard::HttpScoreboard;

use crate::command::DEFAULT_SCOREBOARD_URL;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ScoresArg {
    /// Base URL of the scoreboard service
    #[clap(long, default_value = DEFAULT_SCOREBOARD_URL)]
    scoreboard_url: String,
}

pub(crate) fn run(arg: &ScoresArg) -> anyhow::Result<()> {
    let scoreboard = HttpScoreboard::new(&arg.scoreboard_url)
        .with_context(|| format!("Invalid scoreboard URL: {}", arg.scoreboard_url))?;
    let scores = scoreboard
        .fetch_scores()
        .with_context(|| format!("Failed to fetch scores from {}", arg.scoreboard_url))?;

    if scores.is_empty() {
        println!("No scores yet.");
        return Ok(());
    }
    println!("{:>4}  {:<20} {:>8}", "RANK", "NAME", "SCORE");
    for entry in &scores {
        println!("{:>4}  {:<20} {:>8}", entry.rank, entry.name, entry.score);
    }
    Ok(())
}
