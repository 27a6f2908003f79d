//! Range checks for incoming commands, applied before they reach the engine.

use engine::command::{GoTo, Trajectory};
use thiserror::Error;

pub const MIN_ALTITUDE: f64 = -500.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
  #[error("lat must be between -90 and 90")]
  Latitude,
  #[error("lon must be between -180 and 180")]
  Longitude,
  #[error("alt must be >= -500 meters")]
  Altitude,
  #[error("speed must be >= 0")]
  Speed,
  #[error("waypoints required")]
  NoWaypoints,
  #[error("waypoints[{index}]: {source}")]
  Waypoint {
    index: usize,
    source: Box<ValidationError>,
  },
}

pub fn validate_lat_lon(lat: f64, lon: f64) -> Result<(), ValidationError> {
  if !(-90.0..=90.0).contains(&lat) {
    return Err(ValidationError::Latitude);
  }
  if !(-180.0..=180.0).contains(&lon) {
    return Err(ValidationError::Longitude);
  }

  Ok(())
}

pub fn validate_goto(goto: &GoTo) -> Result<(), ValidationError> {
  validate_lat_lon(goto.lat, goto.lon)?;
  if !(goto.alt >= MIN_ALTITUDE) {
    return Err(ValidationError::Altitude);
  }
  if goto.speed.is_some_and(|speed| !(speed >= 0.0)) {
    return Err(ValidationError::Speed);
  }

  Ok(())
}

/// Checks every waypoint, reporting the first bad one by index.
pub fn validate_trajectory(
  trajectory: &Trajectory,
) -> Result<(), ValidationError> {
  if trajectory.waypoints.is_empty() {
    return Err(ValidationError::NoWaypoints);
  }

  for (index, waypoint) in trajectory.waypoints.iter().enumerate() {
    validate_goto(waypoint).map_err(|err| ValidationError::Waypoint {
      index,
      source: Box::new(err),
    })?;
  }

  Ok(())
}
