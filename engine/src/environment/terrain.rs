use serde::{Deserialize, Serialize};

use super::{Applied, Environment};
use crate::geometry::Vec3;

pub const TERRAIN_FLOOR_WARNING: &str =
  "terrain-floor: altitude clipped to safety margin";

/// Keeps the aircraft a minimum height above a synthetic ground surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
  /// Minimum height above the ground, in meters.
  pub safety_margin: f64,
}

impl Default for Terrain {
  fn default() -> Self {
    Self {
      safety_margin: 80.0,
    }
  }
}

impl Terrain {
  pub fn new(safety_margin: f64) -> Self {
    Self { safety_margin }
  }

  /// Height of the ground below a local position.
  ///
  /// Two overlapping sine waves stand in for real elevation data.
  pub fn ground_altitude(&self, pos: Vec3) -> f64 {
    100.0 * (pos.x / 1000.0).sin() + 50.0 * ((pos.x + pos.y) / 500.0).sin()
  }

  pub fn floor(&self, pos: Vec3) -> f64 {
    self.ground_altitude(pos) + self.safety_margin
  }
}

impl Environment for Terrain {
  fn apply(&self, _dt: f64, mut pos: Vec3, mut vel: Vec3) -> Applied {
    let floor = self.floor(pos);
    if pos.z >= floor {
      return (pos, vel, None);
    }

    pos.z = floor;
    if vel.z < 0.0 {
      vel.z = 0.0;
    }

    (pos, vel, Some(TERRAIN_FLOOR_WARNING.to_owned()))
  }
}
