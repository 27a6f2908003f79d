use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{GeoRef, Vec3, heading_deg};

/// The resting command reported in a snapshot. Idle has no tag at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveCommand {
  #[serde(rename = "goto")]
  GoTo,
  Trajectory,
  Hold,
}

/// An immutable view of the aircraft at the end of a tick.
///
/// Velocity is the air velocity in the local east/north/up frame. Ground
/// drift from wind shows up in the position only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftState {
  pub lat: f64,
  pub lon: f64,
  pub alt: f64,

  pub vx: f64,
  pub vy: f64,
  pub vz: f64,

  pub heading_deg: f64,
  pub ts: DateTime<Utc>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub active_command: Option<ActiveCommand>,
  #[serde(default, skip_serializing_if = "is_zero")]
  pub target_index: usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub warning: Option<String>,
}

fn is_zero(index: &usize) -> bool {
  *index == 0
}

impl AircraftState {
  pub fn new(geo: &GeoRef, pos: Vec3, vel: Vec3, ts: DateTime<Utc>) -> Self {
    let (lat, lon, alt) = geo.local_to_geo(pos);
    Self {
      lat,
      lon,
      alt,
      vx: vel.x,
      vy: vel.y,
      vz: vel.z,
      heading_deg: heading_deg(vel),
      ts,
      active_command: None,
      target_index: 0,
      warning: None,
    }
  }

  pub fn velocity(&self) -> Vec3 {
    Vec3::new(self.vx, self.vy, self.vz)
  }

  pub fn is_idle(&self) -> bool {
    self.active_command.is_none()
  }
}
