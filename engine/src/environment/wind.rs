use serde::{Deserialize, Serialize};

use super::{Applied, Environment};
use crate::geometry::Vec3;

/// A constant wind, in meters per second east (`wx`) and north (`wy`).
///
/// Wind only drifts the ground track. The aircraft's velocity is its air
/// velocity and is left alone, so drift never accumulates into it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Wind {
  pub wx: f64,
  pub wy: f64,
}

impl Wind {
  pub fn new(wx: f64, wy: f64) -> Self {
    Self { wx, wy }
  }

  pub fn calm() -> Self {
    Self::default()
  }

  /// Builds a wind blowing towards `direction` degrees, clockwise from north.
  pub fn from_speed_and_direction(speed: f64, direction: f64) -> Self {
    let radians = direction.to_radians();
    Self {
      wx: speed * radians.sin(),
      wy: speed * radians.cos(),
    }
  }

  pub fn speed(&self) -> f64 {
    self.wx.hypot(self.wy)
  }
}

impl Environment for Wind {
  fn apply(&self, dt: f64, pos: Vec3, vel: Vec3) -> Applied {
    (pos + Vec3::new(self.wx * dt, self.wy * dt, 0.0), vel, None)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_wind_drifts_position_only() {
    let wind = Wind::new(5.0, -2.0);
    let pos = Vec3::new(10.0, 20.0, 300.0);
    let vel = Vec3::new(80.0, 1.5, -3.0);

    for dt in [0.0, 0.05, 1.0, 7.5] {
      let (next_pos, next_vel, warning) = wind.apply(dt, pos, vel);
      assert_eq!(next_vel, vel);
      assert_eq!(next_pos, pos + Vec3::new(5.0 * dt, -2.0 * dt, 0.0));
      assert_eq!(warning, None);
    }
  }

  #[test]
  fn test_calm_does_nothing() {
    let pos = Vec3::new(1.0, 1.0, 1.0);
    assert_eq!(Wind::calm().apply(1.0, pos, Vec3::X), (pos, Vec3::X, None));
  }

  #[test]
  fn test_from_speed_and_direction() {
    let east = Wind::from_speed_and_direction(10.0, 90.0);
    assert!((east.wx - 10.0).abs() < 1e-9);
    assert!(east.wy.abs() < 1e-9);

    let north = Wind::from_speed_and_direction(4.0, 0.0);
    assert!(north.wx.abs() < 1e-9);
    assert!((north.wy - 4.0).abs() < 1e-9);

    let south_west = Wind::from_speed_and_direction(3.0, 225.0);
    assert!((south_west.speed() - 3.0).abs() < 1e-9);
    assert!(south_west.wx < 0.0 && south_west.wy < 0.0);
  }
}
