use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
  #[error("no reply from the engine within {0:?}")]
  Timeout(Duration),
  #[error("request was cancelled")]
  Cancelled,
  #[error("engine is not running")]
  Stopped,
}
