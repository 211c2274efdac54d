use std::path::PathBuf;

use anyhow::Context as _;
use cascadris_engine::{GameSession, OfflineScoreboard, PieceSeed, Scoreboard, SessionConfig};
use cascadris_scoreboard::HttpScoreboard;

use crate::{
    command::{DEFAULT_SCOREBOARD_URL, play::app::PlayApp},
    tui::Tui,
    util,
};

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Session configuration file (JSON)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Player name for the high-score table
    #[clap(long)]
    name: Option<String>,
    /// Piece sequence seed (32 hex digits)
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Base URL of the scoreboard service
    #[clap(long, default_value = DEFAULT_SCOREBOARD_URL)]
    scoreboard_url: String,
    /// Play without a scoreboard
    #[clap(long)]
    offline: bool,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            config: None,
            name: None,
            seed: None,
            scoreboard_url: DEFAULT_SCOREBOARD_URL.to_owned(),
            offline: false,
        }
    }
}

impl PlayArg {
    fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_session_config(path)?,
            None => SessionConfig::default(),
        };
        if let Some(name) = &self.name {
            config.player_name.clone_from(name);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }

    fn scoreboard(&self) -> anyhow::Result<Box<dyn Scoreboard>> {
        if self.offline {
            return Ok(Box::new(OfflineScoreboard));
        }
        let scoreboard = HttpScoreboard::new(&self.scoreboard_url)
            .with_context(|| format!("Invalid scoreboard URL: {}", self.scoreboard_url))?;
        Ok(Box::new(scoreboard))
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let config = arg.session_config()?;
    let session = GameSession::new(config, arg.scoreboard()?)
        .context("Invalid session configuration")?;

    let mut app = PlayApp::new(session);
    Tui::new().run(&mut app)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let arg = PlayArg {
            name: Some("ann".to_owned()),
            seed: Some(PieceSeed::from(42)),
            ..PlayArg::default()
        };
        let config = arg.session_config().unwrap();
        assert_eq!(config.player_name, "ann");
        assert_eq!(config.seed, Some(PieceSeed::from(42)));
        assert_eq!(config.fall_interval_ms, SessionConfig::default().fall_interval_ms);
    }

    #[test]
    fn test_missing_config_file() {
        let arg = PlayArg {
            config: Some(PathBuf::from("/nonexistent/cascadris.json")),
            ..PlayArg::default()
        };
        assert!(arg.session_config().is_err());
    }
}
