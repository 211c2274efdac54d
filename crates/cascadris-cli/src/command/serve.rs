use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context as _;
use cascadris_scoreboard::ScoreStore;
use tokio::net::TcpListener;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ServeArg {
    /// Address to listen on
    #[clap(long, default_value = "0.0.0.0:8080")]
    pub(super) addr: SocketAddr,
    /// JSON file keeping the scores across restarts
    #[clap(long)]
    pub(super) data_file: Option<PathBuf>,
}

pub(crate) fn run(arg: &ServeArg) -> anyhow::Result<()> {
    let store = match &arg.data_file {
        Some(path) => ScoreStore::open(path)
            .with_context(|| format!("Failed to open score file: {}", path.display()))?,
        None => {
            log::warn!("no --data-file given, scores are kept in memory only");
            ScoreStore::in_memory()
        }
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(async {
        let listener = TcpListener::bind(arg.addr)
            .await
            .with_context(|| format!("Failed to bind {}", arg.addr))?;
        cascadris_scoreboard::serve(listener, store, shutdown_signal())
            .await
            .context("Scoreboard server failed")
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}
