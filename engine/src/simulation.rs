use chrono::{DateTime, Utc};

use crate::{
  autopilot::{Autopilot, Tuning, approach},
  command::CommandKind,
  environment::{Environment, NoOp},
  geometry::{GeoRef, Vec3},
  state::AircraftState,
};

/// The aircraft and everything that moves it, stepped one tick at a time.
///
/// This holds no clock of its own: callers supply the time step and the
/// timestamp, which keeps stepping deterministic.
#[derive(Debug)]
pub struct Simulation {
  geo: GeoRef,
  pos: Vec3,
  /// Air velocity. Wind drift is applied to the position only.
  vel: Vec3,
  autopilot: Autopilot,
  environment: Box<dyn Environment>,

  last_ts: DateTime<Utc>,
  last_warning: Option<String>,
}

impl Simulation {
  pub fn new(geo: GeoRef, initial_alt: f64, tuning: Tuning) -> Self {
    Self {
      pos: geo.geo_to_local(geo.origin_lat(), geo.origin_lon(), initial_alt),
      geo,
      vel: Vec3::ZERO,
      autopilot: Autopilot::new(tuning),
      environment: Box::new(NoOp),

      last_ts: Utc::now(),
      last_warning: None,
    }
  }

  pub fn with_environment(
    mut self,
    environment: impl Environment + 'static,
  ) -> Self {
    self.environment = Box::new(environment);
    self
  }

  pub fn with_state(mut self, pos: Vec3, vel: Vec3) -> Self {
    self.pos = pos;
    self.vel = vel;
    self
  }

  pub fn geo(&self) -> &GeoRef {
    &self.geo
  }

  pub fn pos(&self) -> Vec3 {
    self.pos
  }

  pub fn vel(&self) -> Vec3 {
    self.vel
  }

  pub fn autopilot(&self) -> &Autopilot {
    &self.autopilot
  }

  pub fn apply_command(&mut self, kind: CommandKind) {
    self.autopilot.accept(kind, &mut self.vel);
  }

  /// Advances the aircraft by `dt` seconds and returns the new snapshot.
  pub fn step(&mut self, dt: f64, ts: DateTime<Utc>) -> AircraftState {
    let desired = self.autopilot.desired_velocity(&self.geo, self.pos);
    self.vel = approach(self.vel, desired, dt, self.autopilot.tuning());

    let (pos, vel, warning) = self.environment.apply(dt, self.pos, self.vel);
    if warning.is_some() && self.last_warning.is_none() {
      tracing::warn!(warning = warning.as_deref(), "environment warning");
    }

    self.pos = pos + vel * dt;
    self.vel = vel;
    self.last_ts = ts;
    self.last_warning = warning;

    self.snapshot()
  }

  /// The current state, stamped with the time of the last step.
  pub fn snapshot(&self) -> AircraftState {
    let mut state =
      AircraftState::new(&self.geo, self.pos, self.vel, self.last_ts);
    state.active_command = self.autopilot.active_command();
    state.target_index = self.autopilot.target_index();
    state.warning.clone_from(&self.last_warning);

    state
  }
}
