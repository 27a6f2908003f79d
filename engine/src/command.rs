use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SPEED: f64 = 80.0;

/// Fly directly to a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoTo {
  pub lat: f64,
  pub lon: f64,
  /// Meters.
  pub alt: f64,
  /// Meters per second.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub speed: Option<f64>,
}

/// One leg of a trajectory. Same shape as [`GoTo`].
pub type Waypoint = GoTo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trajectory {
  pub waypoints: Vec<Waypoint>,
  #[serde(default, rename = "loop")]
  pub r#loop: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type", content = "value")]
pub enum CommandKind {
  #[serde(rename = "goto")]
  GoTo(GoTo),
  Trajectory(Trajectory),
  Hold,
  Stop,
}

impl CommandKind {
  pub fn name(&self) -> &'static str {
    match self {
      Self::GoTo(_) => "goto",
      Self::Trajectory(_) => "trajectory",
      Self::Hold => "hold",
      Self::Stop => "stop",
    }
  }
}

/// A command as it was handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
  pub kind: CommandKind,
  pub received_at: DateTime<Utc>,
}

impl Command {
  /// Stamps `kind` with the current time.
  pub fn new(kind: CommandKind) -> Self {
    Self {
      kind,
      received_at: Utc::now(),
    }
  }

  pub fn goto(lat: f64, lon: f64, alt: f64, speed: Option<f64>) -> Self {
    Self::new(CommandKind::GoTo(GoTo {
      lat,
      lon,
      alt,
      speed,
    }))
  }

  pub fn trajectory(waypoints: Vec<Waypoint>, r#loop: bool) -> Self {
    Self::new(CommandKind::Trajectory(Trajectory { waypoints, r#loop }))
  }

  pub fn hold() -> Self {
    Self::new(CommandKind::Hold)
  }

  pub fn stop() -> Self {
    Self::new(CommandKind::Stop)
  }
}

impl From<CommandKind> for Command {
  fn from(value: CommandKind) -> Self {
    Self::new(value)
  }
}

impl GoTo {
  pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
    Self {
      lat,
      lon,
      alt,
      speed: None,
    }
  }

  pub fn with_speed(mut self, speed: f64) -> Self {
    self.speed = Some(speed);
    self
  }

  /// The commanded speed, or `default` when it is missing or not positive.
  pub fn speed_or(&self, default: f64) -> f64 {
    self.speed.filter(|speed| *speed > 0.0).unwrap_or(default)
  }
}
