use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use engine::AircraftState;

use crate::http::shared::AppState;

/// How long `/state` waits on the engine before giving up.
pub const STATE_DEADLINE: Duration = Duration::from_secs(2);

pub async fn health() -> &'static str {
  "ok\n"
}

pub async fn get_state(
  State(state): State<AppState>,
) -> Result<Json<AircraftState>, (StatusCode, String)> {
  match state
    .engine
    .get_state_until(STATE_DEADLINE, &state.shutdown)
    .await
  {
    Ok(snapshot) => Ok(Json(snapshot)),
    Err(e) => {
      tracing::warn!("Unable to get state: {e}");
      Err((StatusCode::REQUEST_TIMEOUT, e.to_string()))
    }
  }
}
