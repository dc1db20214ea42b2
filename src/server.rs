use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use anyhow::Context as _;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;

use crate::{
    config::ServerConfig,
    foundation::error::{ChainError, ChainResult},
    service::ImageService,
};

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Shared state behind every route: the service plus the pool that runs its CPU work.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ImageService>,
    pool: Arc<rayon::ThreadPool>,
}

impl AppState {
    /// Wrap `service` with a dedicated rayon pool. `threads: None` uses rayon defaults, as does
    /// `Some(0)`; [`ServerConfig::validate`] is where a zero count is refused.
    pub fn new(service: ImageService, threads: Option<usize>) -> ChainResult<Self> {
        Ok(Self {
            service: Arc::new(service),
            pool: Arc::new(build_thread_pool(threads)?),
        })
    }

    /// Build the service and pool described by `config`.
    pub fn from_config(config: &ServerConfig) -> ChainResult<Self> {
        Self::new(ImageService::from_config(config)?, config.threads)
    }

    /// Underlying service.
    pub fn service(&self) -> &ImageService {
        &self.service
    }
}

/// Routes: `GET /images/{operations}/{*filename}`, `GET /healthz`, `GET /stats`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/images/{operations}/{*filename}", get(get_image))
        .route("/healthz", get(healthz))
        .route("/stats", get(stats))
        .with_state(state)
}

/// Bind `config.listen` and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("bind {}", config.listen))?;
    tracing::info!(
        listen = %listener.local_addr()?,
        images_dir = %config.images_dir.display(),
        cache_dir = %config.cache_dir.display(),
        format = config.format.extension(),
        "imgchain server starting"
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server exited")?;
    tracing::info!("imgchain server stopped");
    Ok(())
}

/// HTTP status for a failed request.
pub fn status_for(err: &ChainError) -> StatusCode {
    match err {
        ChainError::Param { .. }
        | ChainError::EmptyOperation { .. }
        | ChainError::UnknownOperation { .. }
        | ChainError::Transform { .. }
        | ChainError::InvalidSourcePath(_) => StatusCode::BAD_REQUEST,
        ChainError::SourceNotFound(_) => StatusCode::NOT_FOUND,
        ChainError::SourceDecode(_) | ChainError::CacheWrite(_) | ChainError::Other(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &ChainError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!(kind = ?err.kind(), "request failed: {err:#}");
    } else {
        tracing::debug!(kind = ?err.kind(), "request rejected: {err}");
    }
    (status, format!("{err:#}")).into_response()
}

async fn get_image(
    State(state): State<AppState>,
    Path((operations, filename)): Path<(String, String)>,
) -> Response {
    let service = Arc::clone(&state.service);
    let res = run_on_pool(&state.pool, move || service.handle(&filename, &operations)).await;
    let entry = match res {
        Ok(entry) => entry,
        Err(e) => return error_response(&e),
    };

    let bytes = match tokio::fs::read(&entry.path).await {
        Ok(b) => b,
        Err(e) => {
            let err = anyhow::Error::new(e)
                .context(format!("read cache entry '{}'", entry.path.display()));
            return error_response(&err.into());
        }
    };

    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(state.service.content_type()),
            ),
            (X_CACHE, HeaderValue::from_static(entry.status.as_str())),
        ],
        bytes,
    )
        .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.stats().snapshot())
}

async fn run_on_pool<T, F>(pool: &rayon::ThreadPool, f: F) -> ChainResult<T>
where
    F: FnOnce() -> ChainResult<T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel();
    pool.spawn(move || {
        let res = catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
            let msg = panic_message(payload.as_ref());
            tracing::error!(panic = %msg, "worker panicked");
            Err(anyhow::anyhow!("worker panicked: {msg}").into())
        });
        // Receiver is gone when the client disconnected; the cache entry is still kept.
        let _ = tx.send(res);
    });
    rx.await
        .map_err(|_| ChainError::from(anyhow::anyhow!("worker pool dropped the request")))?
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return (*msg).to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "non-string panic payload".to_string()
}

/// `threads` is trusted here; [`ServerConfig::validate`] rejects `Some(0)`.
fn build_thread_pool(threads: Option<usize>) -> ChainResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("imgchain-worker-{i}"))
        .panic_handler(|payload| {
            tracing::error!(panic = %panic_message(payload.as_ref()), "uncaught worker panic");
        });
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[cfg(test)]
#[path = "../tests/unit/server.rs"]
mod tests;
