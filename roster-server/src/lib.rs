//! Roster HTTP API
//!
//! JSON endpoints over the roster services. Each request runs under a child of
//! the server's shutdown token, so shutting down cancels in-flight operations
//! at their next storage call. The same token is cancelled when the request
//! outlives `server.request_timeout` or the client goes away.

pub mod dto;
pub mod error;
mod handlers;

use std::future::Future;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use roster_core::Services;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    shutdown: CancellationToken,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(services: Services, shutdown: CancellationToken, request_timeout: Duration) -> Self {
        Self {
            services,
            shutdown,
            request_timeout,
        }
    }

    /// Token for a single request, cancelled when the server shuts down
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Drive `call` to completion under the request deadline.
    ///
    /// `cancel` is cancelled when the deadline passes and when this future is
    /// dropped, so storage work started by `call` stops at its next await.
    pub async fn within_deadline<T>(
        &self,
        cancel: &CancellationToken,
        call: impl Future<Output = roster_core::Result<T>>,
    ) -> Result<T, ApiError> {
        let _guard = cancel.clone().drop_guard();
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                cancel.cancel();
                Err(ApiError::Timeout(self.request_timeout))
            }
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/team/add", post(handlers::add_team))
        .route("/team/get", get(handlers::get_team))
        .route("/users/setIsActive", post(handlers::set_is_active))
        .route("/users/getReview", get(handlers::get_reviews))
        .route("/pullRequest/create", post(handlers::create_pull_request))
        .route("/pullRequest/merge", post(handlers::merge_pull_request))
        .route("/pullRequest/reassign", post(handlers::reassign_reviewer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use roster_core::{InMemoryStore, ReviewerPicker};

    fn state(timeout: Duration) -> AppState {
        let store = Arc::new(InMemoryStore::new());
        let services = Services::new(store.clone(), store, ReviewerPicker::seeded(1));
        AppState::new(services, CancellationToken::new(), timeout)
    }

    #[tokio::test]
    async fn test_deadline_cancels_request_token() {
        let state = state(Duration::from_millis(20));
        let cancel = state.request_token();

        let result = state
            .within_deadline(&cancel, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ApiError::Timeout(_))));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_deadline_passes_results_through() {
        let state = state(Duration::from_secs(5));
        let cancel = state.request_token();

        let value = state.within_deadline(&cancel, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);

        let rejected = async { Err::<(), _>(roster_core::Error::PrExists("pr-1".into())) };
        let err = state.within_deadline(&cancel, rejected).await.unwrap_err();
        assert!(matches!(err, ApiError::Domain(roster_core::Error::PrExists(_))));
    }

    #[tokio::test]
    async fn test_shutdown_reaches_request_token() {
        let state = state(Duration::from_secs(5));
        let cancel = state.request_token();
        state.shutdown.cancel();
        assert!(cancel.is_cancelled());
    }
}
