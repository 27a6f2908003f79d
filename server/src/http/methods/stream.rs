use std::convert::Infallible;

use axum::{
  extract::State,
  response::{
    IntoResponse,
    sse::{Event, Sse},
  },
};
use engine::{AircraftState, Unsubscribe};
use futures_util::{StreamExt as _, future, stream};
use tokio_util::sync::CancellationToken;

use crate::http::shared::AppState;

/// One connected `/stream` client. Dropping it unsubscribes from the engine.
struct Session {
  updates: async_channel::Receiver<AircraftState>,
  _unsubscribe: Unsubscribe,
  shutdown: CancellationToken,
}

impl Session {
  async fn next(self) -> Option<(Result<Event, Infallible>, Self)> {
    let snapshot = tokio::select! {
      _ = self.shutdown.cancelled() => return None,
      snapshot = self.updates.recv() => snapshot.ok()?,
    };

    match Event::default().event("state").json_data(&snapshot) {
      Ok(event) => Some((Ok(event), self)),
      Err(e) => {
        tracing::error!("Unable to serialise state: {e}");
        None
      }
    }
  }
}

pub async fn get_stream(State(state): State<AppState>) -> impl IntoResponse {
  let (updates, unsubscribe) = state.engine.subscribe(&state.shutdown).await;
  tracing::debug!("Stream client connected");

  let session = Session {
    updates,
    _unsubscribe: unsubscribe,
    shutdown: state.shutdown,
  };

  let connected = stream::once(future::ready(Ok::<_, Infallible>(
    Event::default().comment("connected"),
  )));
  let frames = stream::unfold(session, Session::next);

  (
    [("x-accel-buffering", "no")],
    Sse::new(connected.chain(frames)),
  )
}
