//! Environmental effects applied to the aircraft after the control law.
//!
//! Every effect is a pure function of the time step and the current
//! kinematics. Effects never fail; anything unusual is reported as a warning
//! string that ends up in the next snapshot.

mod terrain;
mod wind;

use core::fmt;

pub use terrain::{TERRAIN_FLOOR_WARNING, Terrain};
pub use wind::Wind;

use crate::geometry::Vec3;

/// The result of applying an effect: `(position, velocity, warning)`.
pub type Applied = (Vec3, Vec3, Option<String>);

pub trait Environment: fmt::Debug + Send + Sync {
  /// Applies the effect over a step of `dt` seconds.
  fn apply(&self, dt: f64, pos: Vec3, vel: Vec3) -> Applied;
}

impl<T: Environment + ?Sized> Environment for Box<T> {
  fn apply(&self, dt: f64, pos: Vec3, vel: Vec3) -> Applied {
    (**self).apply(dt, pos, vel)
  }
}

/// Leaves position and velocity untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoOp;

impl Environment for NoOp {
  fn apply(&self, _dt: f64, pos: Vec3, vel: Vec3) -> Applied {
    (pos, vel, None)
  }
}

/// Applies effects in order, feeding each one the output of the previous.
///
/// Only the last warning raised survives. Earlier warnings from the same
/// step are overwritten rather than appended.
#[derive(Debug, Default)]
pub struct Chain {
  effects: Vec<Box<dyn Environment>>,
}

impl Chain {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, effect: impl Environment + 'static) -> Self {
    self.push(effect);
    self
  }

  pub fn push(&mut self, effect: impl Environment + 'static) {
    self.effects.push(Box::new(effect));
  }

  pub fn len(&self) -> usize {
    self.effects.len()
  }

  pub fn is_empty(&self) -> bool {
    self.effects.is_empty()
  }
}

impl Environment for Chain {
  fn apply(&self, dt: f64, mut pos: Vec3, mut vel: Vec3) -> Applied {
    let mut warning = None;
    for effect in self.effects.iter() {
      let (next_pos, next_vel, next_warning) = effect.apply(dt, pos, vel);
      if let Some(w) = next_warning.filter(|w| !w.is_empty()) {
        warning = Some(w);
      }

      pos = next_pos;
      vel = next_vel;
    }

    (pos, vel, warning)
  }
}
