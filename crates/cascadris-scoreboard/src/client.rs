use std::{
    error::Error as _,
    io,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use bytes::Bytes;
use cascadris_engine::{NewScore, RankedScore, Scoreboard, ScoreboardError};
use http_body_util::{BodyExt as _, Full};
use hyper::{Method, Request, Uri, header, http::uri::InvalidUri};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tokio::{runtime::Runtime, task::JoinHandle};

/// Upper bound for a single scoreboard request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ClientError {
    #[display("invalid scoreboard url {url:?}")]
    InvalidUrl { url: String, source: InvalidUri },
    #[display("failed to start scoreboard runtime")]
    Runtime { source: io::Error },
    #[display("failed to build request")]
    Request { source: hyper::http::Error },
    #[display("request failed")]
    Transport {
        source: hyper_util::client::legacy::Error,
    },
    #[display("failed to read response body")]
    Body { source: hyper::Error },
    #[display("unexpected status {status}")]
    Status { status: u16 },
    #[display("failed to encode score")]
    Encode { source: serde_json::Error },
    #[display("failed to decode scores")]
    Decode { source: serde_json::Error },
}

impl ClientError {
    /// The error message followed by its sources.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(e) = source {
            message.push_str(": ");
            message.push_str(&e.to_string());
            source = e.source();
        }
        message
    }
}

impl From<ClientError> for ScoreboardError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Status { status } => Self::Status { status },
            ClientError::Body { .. } | ClientError::Decode { .. } => Self::Decode {
                message: e.chain(),
            },
            _ => Self::Transport { message: e.chain() },
        }
    }
}

/// Async HTTP client for the scoreboard service.
#[derive(Debug, Clone)]
pub struct ScoreClient {
    client: Client<HttpConnector, Full<Bytes>>,
    scores_uri: Uri,
}

impl ScoreClient {
    /// `base_url` is the service root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let url = format!("{}/scores", base_url.trim_end_matches('/'));
        let scores_uri = url
            .parse::<Uri>()
            .map_err(|source| ClientError::InvalidUrl { url, source })?;
        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            scores_uri,
        })
    }

    #[must_use]
    pub fn scores_uri(&self) -> &Uri {
        &self.scores_uri
    }

    pub async fn fetch_scores(&self) -> Result<Vec<RankedScore>, ClientError> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(self.scores_uri.clone())
            .header(header::ACCEPT, "application/json")
            .body(Full::new(Bytes::new()))
            .map_err(|source| ClientError::Request { source })?;
        let body = self.send(req).await?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { source })
    }

    pub async fn submit_score(&self, score: &NewScore) -> Result<(), ClientError> {
        let json = serde_json::to_vec(score).map_err(|source| ClientError::Encode { source })?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(self.scores_uri.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(json)))
            .map_err(|source| ClientError::Request { source })?;
        self.send(req).await?;
        Ok(())
    }

    async fn send(&self, req: Request<Full<Bytes>>) -> Result<Bytes, ClientError> {
        let res = self
            .client
            .request(req)
            .await
            .map_err(|source| ClientError::Transport { source })?;
        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }
        let body = res
            .into_body()
            .collect()
            .await
            .map_err(|source| ClientError::Body { source })?;
        Ok(body.to_bytes())
    }
}

/// Blocking [`Scoreboard`] backed by [`ScoreClient`].
///
/// Owns a small runtime. Fetches block for at most the timeout; submissions
/// run in the background and are awaited when the scoreboard is dropped.
/// Must not be created or dropped from inside an async context.
#[derive(Debug)]
pub struct HttpScoreboard {
    client: ScoreClient,
    runtime: Runtime,
    timeout: Duration,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpScoreboard {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("scoreboard")
            .enable_all()
            .build()
            .map_err(|source| ClientError::Runtime { source })?;
        let client = {
            let _guard = runtime.enter();
            ScoreClient::new(base_url)?
        };
        Ok(Self {
            client,
            runtime,
            timeout,
            pending: Mutex::new(vec![]),
        })
    }

    #[must_use]
    pub fn client(&self) -> &ScoreClient {
        &self.client
    }
}

impl Scoreboard for HttpScoreboard {
    fn fetch_scores(&self) -> Result<Vec<RankedScore>, ScoreboardError> {
        let fetch = async { tokio::time::timeout(self.timeout, self.client.fetch_scores()).await };
        match self.runtime.block_on(fetch) {
            Ok(res) => res.map_err(ScoreboardError::from),
            Err(_) => Err(ScoreboardError::Timeout),
        }
    }

    fn submit_score(&self, score: &NewScore) -> Result<(), ScoreboardError> {
        let client = self.client.clone();
        let score = score.clone();
        let timeout = self.timeout;
        let handle = self.runtime.spawn(async move {
            match tokio::time::timeout(timeout, client.submit_score(&score)).await {
                Ok(Ok(())) => log::info!("submitted score {} for {}", score.score, score.name),
                Ok(Err(e)) => log::warn!("failed to submit score: {}", e.chain()),
                Err(_) => log::warn!("score submission timed out"),
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
        Ok(())
    }
}

impl Drop for HttpScoreboard {
    fn drop(&mut self) {
        let pending = std::mem::take(
            self.pending
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if pending.is_empty() {
            return;
        }
        log::debug!("waiting for {} score submissions", pending.len());
        self.runtime.block_on(async {
            for handle in pending {
                let _ = handle.await;
            }
        });
    }
}
