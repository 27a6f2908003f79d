pub mod methods;
pub mod shared;

use std::{io, net::SocketAddr};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use methods::{
  commands::{post_goto, post_hold, post_stop, post_trajectory},
  state::{get_state, health},
  stream::get_stream,
};
use shared::AppState;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const MAX_BODY_BYTES: usize = 1 << 20;

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/state", get(get_state))
    // Commands
    .route("/command/goto", post(post_goto))
    .route("/command/trajectory", post(post_trajectory))
    .route("/command/hold", post(post_hold))
    .route("/command/stop", post(post_stop))
    // Streaming
    .route("/stream", get(get_stream))
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Serves until the app's shutdown token is cancelled and every open
/// connection has finished.
pub async fn run(address: SocketAddr, state: AppState) -> io::Result<()> {
  let shutdown = state.shutdown.clone();
  let listener = TcpListener::bind(address).await?;

  tracing::info!("Listening on {address}");

  axum::serve(listener, router(state))
    .with_graceful_shutdown(shutdown.cancelled_owned())
    .await
}
