use engine::EngineHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct AppState {
  pub engine: EngineHandle,
  /// Cancelled when the server starts shutting down. Open streams end and
  /// pending state requests give up.
  pub shutdown: CancellationToken,
}

impl AppState {
  pub fn new(engine: EngineHandle, shutdown: CancellationToken) -> Self {
    Self { engine, shutdown }
  }
}
