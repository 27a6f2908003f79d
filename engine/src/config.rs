use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
  DEFAULT_ORIGIN, DEFAULT_TICK_RATE_HZ, autopilot::Tuning, geometry::GeoRef,
};

/// Everything fixed at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub origin_lat: f64,
  pub origin_lon: f64,
  /// Ticks per second. Anything not positive falls back to the default.
  pub tick_hz: f64,
  /// Starting altitude above the origin, in meters.
  pub initial_alt: f64,

  pub command_capacity: usize,
  pub request_capacity: usize,
  /// Frames buffered per subscriber before it starts missing them.
  pub subscriber_capacity: usize,

  pub tuning: Tuning,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      origin_lat: DEFAULT_ORIGIN.0,
      origin_lon: DEFAULT_ORIGIN.1,
      tick_hz: DEFAULT_TICK_RATE_HZ,
      initial_alt: 1000.0,

      command_capacity: 128,
      request_capacity: 32,
      subscriber_capacity: 32,

      tuning: Tuning::default(),
    }
  }
}

impl EngineConfig {
  pub fn geo_ref(&self) -> GeoRef {
    GeoRef::new(self.origin_lat, self.origin_lon)
  }

  pub fn tick_hz(&self) -> f64 {
    if self.tick_hz > 0.0 && self.tick_hz.is_finite() {
      self.tick_hz
    } else {
      DEFAULT_TICK_RATE_HZ
    }
  }

  pub fn tick_period(&self) -> Duration {
    Duration::from_secs_f64(1.0 / self.tick_hz())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tick_rate_fallback() {
    let mut config = EngineConfig {
      tick_hz: 0.0,
      ..Default::default()
    };
    assert_eq!(config.tick_hz(), DEFAULT_TICK_RATE_HZ);
    assert_eq!(config.tick_period(), Duration::from_millis(50));

    config.tick_hz = -3.0;
    assert_eq!(config.tick_hz(), DEFAULT_TICK_RATE_HZ);

    config.tick_hz = 100.0;
    assert_eq!(config.tick_period(), Duration::from_millis(10));
  }

  #[test]
  fn test_partial_config_keeps_defaults() {
    let config: EngineConfig = serde_json::from_str(
      r#"{"tick_hz": 50, "tuning": {"default_speed": 60}}"#,
    )
    .unwrap();

    assert_eq!(config.tick_hz, 50.0);
    assert_eq!(config.tuning.default_speed, 60.0);
    assert_eq!(config.tuning.position_tolerance, 25.0);
    assert_eq!(config.command_capacity, 128);
    assert_eq!(config.origin_lat, DEFAULT_ORIGIN.0);
  }
}
