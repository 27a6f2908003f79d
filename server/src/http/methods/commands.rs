use axum::{
  Json,
  body::Bytes,
  extract::{State, rejection::BytesRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use engine::command::{CommandKind, GoTo, Trajectory};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
  http::shared::AppState,
  validate::{ValidationError, validate_goto, validate_trajectory},
};

#[derive(Error, Debug)]
pub enum CommandError {
  #[error("invalid json syntax at line {line}, column {column}")]
  Syntax { line: usize, column: usize },
  #[error("invalid json: {0}")]
  Json(serde_json::Error),
  #[error("invalid json: {0}")]
  Body(String),
  #[error(transparent)]
  Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CommandError {
  fn from(value: serde_json::Error) -> Self {
    if value.is_syntax() {
      Self::Syntax {
        line: value.line(),
        column: value.column(),
      }
    } else {
      Self::Json(value)
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Rejected {
  error: String,
  status: &'static str,
}

impl IntoResponse for CommandError {
  fn into_response(self) -> Response {
    tracing::debug!("Rejected command: {self}");
    let body = Rejected {
      error: self.to_string(),
      status: "rejected",
    };

    (StatusCode::BAD_REQUEST, Json(body)).into_response()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accepted {
  status: &'static str,
  #[serde(rename = "type")]
  kind: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  count: Option<usize>,
}

type Reply = Result<(StatusCode, Json<Accepted>), CommandError>;

fn accept(state: &AppState, kind: CommandKind, count: Option<usize>) -> Reply {
  let accepted = Accepted {
    status: "accepted",
    kind: kind.name(),
    count,
  };
  state.engine.submit(kind);

  Ok((StatusCode::ACCEPTED, Json(accepted)))
}

/// Decodes the whole body as one JSON value. Trailing content is an error.
fn decode<T>(body: Result<Bytes, BytesRejection>) -> Result<T, CommandError>
where
  T: DeserializeOwned,
{
  let body =
    body.map_err(|rejection| CommandError::Body(rejection.body_text()))?;
  Ok(serde_json::from_slice(&body)?)
}

pub async fn post_goto(
  State(state): State<AppState>,
  body: Result<Bytes, BytesRejection>,
) -> Reply {
  let goto: GoTo = decode(body)?;
  validate_goto(&goto)?;

  accept(&state, CommandKind::GoTo(goto), None)
}

pub async fn post_trajectory(
  State(state): State<AppState>,
  body: Result<Bytes, BytesRejection>,
) -> Reply {
  let trajectory: Trajectory = decode(body)?;
  validate_trajectory(&trajectory)?;

  let count = trajectory.waypoints.len();
  accept(&state, CommandKind::Trajectory(trajectory), Some(count))
}

pub async fn post_hold(State(state): State<AppState>) -> Reply {
  accept(&state, CommandKind::Hold, None)
}

pub async fn post_stop(State(state): State<AppState>) -> Reply {
  accept(&state, CommandKind::Stop, None)
}
