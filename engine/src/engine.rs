//! The engine actor.
//!
//! [`Engine::run`] is the only place simulation state is touched. Everything
//! else talks to it through an [`EngineHandle`], which only sends messages:
//! commands, state queries and subscription changes each get their own
//! bounded inbox.

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use async_channel::TrySendError;
use chrono::Utc;
use tokio::{
  sync::mpsc,
  time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;

use crate::{
  command::Command,
  config::EngineConfig,
  environment::Environment,
  error::EngineError,
  job::{JobQueue, JobReq},
  simulation::Simulation,
  state::AircraftState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
  State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Debug)]
pub struct Subscriber {
  id: SubscriberId,
  sender: async_channel::Sender<AircraftState>,
}

/// Removes a subscription from the engine.
///
/// Dropping it has the same effect as calling [`Unsubscribe::unsubscribe`].
/// Both are best-effort: if the engine's inbox is full the request is lost
/// and the subscription lives on until shutdown.
#[derive(Debug)]
pub struct Unsubscribe {
  inner: Option<(SubscriberId, mpsc::Sender<SubscriberId>)>,
}

impl Unsubscribe {
  fn noop() -> Self {
    Self { inner: None }
  }

  pub fn unsubscribe(mut self) {
    self.send();
  }

  fn send(&mut self) {
    if let Some((id, sender)) = self.inner.take() {
      if sender.try_send(id).is_err() {
        tracing::debug!("dropped unsubscribe request for {id:?}");
      }
    }
  }
}

impl Drop for Unsubscribe {
  fn drop(&mut self) {
    self.send();
  }
}

/// A cheap, cloneable handle for talking to a running [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineHandle {
  commands: async_channel::Sender<Command>,
  requests: mpsc::Sender<JobReq<Query, AircraftState>>,
  subscribe: mpsc::Sender<Subscriber>,
  unsubscribe: mpsc::Sender<SubscriberId>,

  next_subscriber: Arc<AtomicU64>,
  subscriber_capacity: usize,
}

impl EngineHandle {
  /// Queues a command without waiting.
  ///
  /// When the queue is full the command is dropped. Commands are statements
  /// of intent, so a client that cares can simply send it again.
  pub fn submit(&self, command: impl Into<Command>) {
    let command = command.into();
    match self.commands.try_send(command) {
      Ok(()) => {}
      Err(TrySendError::Full(command)) => {
        tracing::warn!("command queue full, dropped {}", command.kind.name());
      }
      Err(TrySendError::Closed(command)) => {
        tracing::warn!("engine is gone, dropped {}", command.kind.name());
      }
    }
  }

  /// Commands waiting for the next tick.
  pub fn pending_commands(&self) -> usize {
    self.commands.len()
  }

  /// Asks the engine for a snapshot, giving up after `deadline`.
  pub async fn get_state(
    &self,
    deadline: Duration,
  ) -> Result<AircraftState, EngineError> {
    self.get_state_until(deadline, &CancellationToken::new()).await
  }

  /// Like [`EngineHandle::get_state`], but also gives up when `lifetime` is
  /// cancelled.
  pub async fn get_state_until(
    &self,
    deadline: Duration,
    lifetime: &CancellationToken,
  ) -> Result<AircraftState, EngineError> {
    let query = async {
      JobReq::send(Query::State, &self.requests).await?.recv().await
    };

    tokio::select! {
      biased;
      _ = lifetime.cancelled() => Err(EngineError::Cancelled),
      res = tokio::time::timeout(deadline, query) => {
        res.map_err(|_| EngineError::Timeout(deadline))?
      }
    }
  }

  /// Registers a new stream of snapshots.
  ///
  /// The receiver closes when the engine shuts down or the subscription is
  /// removed. If `lifetime` is cancelled before the engine has accepted the
  /// registration, nothing is registered and the receiver is already closed.
  pub async fn subscribe(
    &self,
    lifetime: &CancellationToken,
  ) -> (async_channel::Receiver<AircraftState>, Unsubscribe) {
    let (sender, receiver) = async_channel::bounded(self.subscriber_capacity);
    let id = SubscriberId(self.next_subscriber.fetch_add(1, Ordering::Relaxed));

    // Dropping the unsent subscriber drops the only sender, which closes the
    // receiver.
    let registered = tokio::select! {
      biased;
      _ = lifetime.cancelled() => false,
      sent = self.subscribe.send(Subscriber { id, sender }) => sent.is_ok(),
    };

    if registered {
      let unsubscribe = Unsubscribe {
        inner: Some((id, self.unsubscribe.clone())),
      };
      (receiver, unsubscribe)
    } else {
      (receiver, Unsubscribe::noop())
    }
  }
}

/// Owns the simulation and runs it at a fixed rate.
#[derive(Debug)]
pub struct Engine {
  config: EngineConfig,
  simulation: Simulation,
  handle: EngineHandle,

  commands: async_channel::Receiver<Command>,
  requests: JobQueue<Query, AircraftState>,
  subscribe: mpsc::Receiver<Subscriber>,
  unsubscribe: mpsc::Receiver<SubscriberId>,

  subscribers: HashMap<SubscriberId, async_channel::Sender<AircraftState>>,
}

impl Engine {
  pub fn new(config: EngineConfig) -> Self {
    let (command_tx, command_rx) =
      async_channel::bounded(config.command_capacity.max(1));
    let (request_tx, request_rx) =
      mpsc::channel(config.request_capacity.max(1));
    let (subscribe_tx, subscribe_rx) =
      mpsc::channel(config.request_capacity.max(1));
    let (unsubscribe_tx, unsubscribe_rx) =
      mpsc::channel(config.request_capacity.max(1));

    let handle = EngineHandle {
      commands: command_tx,
      requests: request_tx,
      subscribe: subscribe_tx,
      unsubscribe: unsubscribe_tx,

      next_subscriber: Arc::new(AtomicU64::new(0)),
      subscriber_capacity: config.subscriber_capacity.max(1),
    };

    Self {
      simulation: Simulation::new(
        config.geo_ref(),
        config.initial_alt,
        config.tuning,
      ),
      config,
      handle,

      commands: command_rx,
      requests: JobQueue::new(request_rx),
      subscribe: subscribe_rx,
      unsubscribe: unsubscribe_rx,

      subscribers: HashMap::new(),
    }
  }

  pub fn with_environment(
    mut self,
    environment: impl Environment + 'static,
  ) -> Self {
    self.simulation = self.simulation.with_environment(environment);
    self
  }

  pub fn handle(&self) -> EngineHandle {
    self.handle.clone()
  }

  /// Runs the tick loop until `lifetime` is cancelled, then closes every
  /// subscriber.
  pub async fn run(mut self, lifetime: CancellationToken) {
    let period = self.config.tick_period();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();

    tracing::info!(
      origin_lat = self.config.origin_lat,
      origin_lon = self.config.origin_lon,
      tick_hz = self.config.tick_hz(),
      "engine running"
    );

    loop {
      if lifetime.is_cancelled() {
        break;
      }

      tokio::select! {
        _ = lifetime.cancelled() => break,
        Some(subscriber) = self.subscribe.recv() => {
          self.add_subscriber(subscriber);
        }
        Some(id) = self.unsubscribe.recv() => self.remove_subscriber(id),
        Some(job) = self.requests.recv() => {
          let state = match job.req() {
            Query::State => self.simulation.snapshot(),
          };
          job.reply(state);
        }
        Ok(command) = self.commands.recv() => self.apply(command),
        _ = ticker.tick() => {
          let now = Instant::now();
          let elapsed = now.saturating_duration_since(last_tick);
          last_tick = now;
          self.tick(elapsed, period);
        }
      }
    }

    self.shutdown();
  }

  fn apply(&mut self, command: Command) {
    tracing::debug!(
      kind = command.kind.name(),
      received_at = %command.received_at,
      "applying command"
    );
    self.simulation.apply_command(command.kind);
  }

  fn tick(&mut self, elapsed: Duration, period: Duration) {
    while let Ok(command) = self.commands.try_recv() {
      self.apply(command);
    }

    let dt = if elapsed.is_zero() { period } else { elapsed };
    let state = self.simulation.step(dt.as_secs_f64(), Utc::now());
    self.broadcast(state);
  }

  fn broadcast(&mut self, state: AircraftState) {
    self
      .subscribers
      .retain(|id, sender| match sender.try_send(state.clone()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
          tracing::trace!("subscriber {id:?} is behind, dropped a frame");
          true
        }
        Err(TrySendError::Closed(_)) => {
          tracing::debug!("subscriber {id:?} went away");
          false
        }
      });
  }

  fn add_subscriber(&mut self, subscriber: Subscriber) {
    let Subscriber { id, sender } = subscriber;
    let _ = sender.try_send(self.simulation.snapshot());
    self.subscribers.insert(id, sender);

    tracing::debug!(
      "added subscriber {id:?} ({} total)",
      self.subscribers.len()
    );
  }

  fn remove_subscriber(&mut self, id: SubscriberId) {
    if let Some(sender) = self.subscribers.remove(&id) {
      sender.close();
      tracing::debug!("removed subscriber {id:?}");
    }
  }

  fn shutdown(&mut self) {
    tracing::info!(
      "engine stopping, closing {} subscribers",
      self.subscribers.len()
    );

    for (_, sender) in self.subscribers.drain() {
      sender.close();
    }
  }
}
