use std::{future::Future, io, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use cascadris_engine::{NewScore, RankedScore};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::cors::{Any, CorsLayer};

use crate::store::ScoreStore;

/// Rows returned by `GET /scores`.
pub const TOP_SCORES_LIMIT: usize = 10;

#[derive(Clone)]
struct ServerState {
    store: Arc<Mutex<ScoreStore>>,
}

/// `GET /scores` returns the ranking, `POST /scores` records a score.
pub fn router(store: ScoreStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/scores", get(list_scores).post(submit_score))
        .with_state(ServerState {
            store: Arc::new(Mutex::new(store)),
        })
        .layer(cors)
}

/// Serves the scoreboard until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, store: ScoreStore, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        log::info!("scoreboard listening on http://{addr}");
    }
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn list_scores(State(state): State<ServerState>) -> Json<Vec<RankedScore>> {
    let store = state.store.lock().await;
    Json(store.top_scores(TOP_SCORES_LIMIT))
}

async fn submit_score(
    State(state): State<ServerState>,
    Json(score): Json<NewScore>,
) -> Result<StatusCode, (StatusCode, String)> {
    log::info!("score submitted: {} {}", score.name, score.score);
    let mut store = state.store.lock().await;
    store.insert(score).map_err(|e| {
        log::error!("failed to record score: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(StatusCode::OK)
}
