//! The command state machine and the control law that turns it into a
//! velocity.
//!
//! Each tick the [`Autopilot`] picks a desired air velocity from its current
//! [`Mode`], and [`approach`] slews the actual velocity towards it with
//! bounded acceleration. The slew stands in for real flight dynamics: it is
//! smooth and never overshoots.

use serde::{Deserialize, Serialize};

use crate::{
  command::{CommandKind, DEFAULT_SPEED, GoTo, Waypoint},
  geometry::{GeoRef, Vec3, horizontal_direction, horizontal_length},
  state::ActiveCommand,
};

/// Tolerances and limits for guidance and the control law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
  /// Horizontal distance at which a target counts as reached, in meters.
  pub position_tolerance: f64,
  /// Vertical distance at which a target counts as reached, in meters.
  pub altitude_tolerance: f64,
  /// Speed used when a command has none, in meters per second.
  pub default_speed: f64,
  pub max_climb_rate: f64,
  pub max_horizontal_accel: f64,
  pub max_vertical_accel: f64,
}

impl Default for Tuning {
  fn default() -> Self {
    Self {
      position_tolerance: 25.0,
      altitude_tolerance: 10.0,
      default_speed: DEFAULT_SPEED,
      max_climb_rate: 8.0,
      max_horizontal_accel: 12.0,
      max_vertical_accel: 5.0,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
  #[default]
  Idle,
  GoTo(GoTo),
  Trajectory {
    waypoints: Vec<Waypoint>,
    index: usize,
    looping: bool,
  },
  Hold,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Autopilot {
  mode: Mode,
  tuning: Tuning,
}

impl Autopilot {
  pub fn new(tuning: Tuning) -> Self {
    Self {
      mode: Mode::Idle,
      tuning,
    }
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn tuning(&self) -> &Tuning {
    &self.tuning
  }

  pub fn active_command(&self) -> Option<ActiveCommand> {
    match self.mode {
      Mode::Idle => None,
      Mode::GoTo(_) => Some(ActiveCommand::GoTo),
      Mode::Trajectory { .. } => Some(ActiveCommand::Trajectory),
      Mode::Hold => Some(ActiveCommand::Hold),
    }
  }

  /// Index of the trajectory waypoint being flown to, or 0 outside of a
  /// trajectory.
  pub fn target_index(&self) -> usize {
    match self.mode {
      Mode::Trajectory { index, .. } => index,
      _ => 0,
    }
  }

  /// Replaces the current mode with the one `kind` asks for.
  ///
  /// Hold and Stop snap `vel` to zero immediately instead of slewing it.
  pub fn accept(&mut self, kind: CommandKind, vel: &mut Vec3) {
    self.mode = match kind {
      CommandKind::GoTo(goto) => Mode::GoTo(goto),
      CommandKind::Trajectory(trajectory) => Mode::Trajectory {
        waypoints: trajectory.waypoints,
        index: 0,
        looping: trajectory.r#loop,
      },
      CommandKind::Hold => {
        *vel = Vec3::ZERO;
        Mode::Hold
      }
      CommandKind::Stop => {
        *vel = Vec3::ZERO;
        Mode::Idle
      }
    };
  }

  /// Computes this tick's desired velocity from `pos`, advancing the mode on
  /// arrival.
  pub fn desired_velocity(&mut self, geo: &GeoRef, pos: Vec3) -> Vec3 {
    match &mut self.mode {
      Mode::Idle | Mode::Hold => Vec3::ZERO,
      Mode::GoTo(goto) => {
        let (desired, arrived) = guide(&self.tuning, geo, pos, goto);
        if arrived {
          self.mode = Mode::Idle;
          Vec3::ZERO
        } else {
          desired
        }
      }
      Mode::Trajectory {
        waypoints,
        index,
        looping,
      } => {
        let Some(waypoint) = waypoints.get(*index) else {
          self.mode = Mode::Idle;
          return Vec3::ZERO;
        };

        let (desired, arrived) = guide(&self.tuning, geo, pos, waypoint);
        if !arrived {
          return desired;
        }

        *index += 1;
        if *index < waypoints.len() {
          desired
        } else if *looping {
          *index = 0;
          desired
        } else {
          self.mode = Mode::Idle;
          Vec3::ZERO
        }
      }
    }
  }
}

/// Desired velocity towards `target` and whether it has been reached.
fn guide(
  tuning: &Tuning,
  geo: &GeoRef,
  pos: Vec3,
  target: &GoTo,
) -> (Vec3, bool) {
  let target_pos = geo.geo_to_local(target.lat, target.lon, target.alt);
  let delta = target_pos - pos;
  let distance = horizontal_length(delta);

  let mut desired = Vec3::ZERO;
  if distance > tuning.position_tolerance {
    desired = horizontal_direction(delta)
      * target.speed_or(tuning.default_speed);
  }

  if delta.z > tuning.altitude_tolerance {
    desired.z = tuning.max_climb_rate;
  } else if delta.z < -tuning.altitude_tolerance {
    desired.z = -tuning.max_climb_rate;
  }

  let arrived = distance <= tuning.position_tolerance
    && delta.z.abs() <= tuning.altitude_tolerance;

  (desired, arrived)
}

fn step_towards(current: f64, desired: f64, max_step: f64) -> f64 {
  current + (desired - current).clamp(-max_step, max_step)
}

/// Moves `current` towards `desired`, limiting each axis to its maximum
/// acceleration over `dt`.
pub fn approach(
  current: Vec3,
  desired: Vec3,
  dt: f64,
  tuning: &Tuning,
) -> Vec3 {
  let horizontal_step = tuning.max_horizontal_accel * dt;
  let vertical_step = tuning.max_vertical_accel * dt;

  Vec3::new(
    step_towards(current.x, desired.x, horizontal_step),
    step_towards(current.y, desired.y, horizontal_step),
    step_towards(current.z, desired.z, vertical_step),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::command::Trajectory;

  fn geo() -> GeoRef {
    GeoRef::new(0.0, 0.0)
  }

  /// A waypoint at a local position relative to the (0, 0) origin.
  fn waypoint_at(geo: &GeoRef, x: f64, y: f64, alt: f64) -> Waypoint {
    let (lat, lon, alt) = geo.local_to_geo(Vec3::new(x, y, alt));
    GoTo::new(lat, lon, alt)
  }

  mod transitions {
    use super::*;

    #[test]
    fn test_starts_idle() {
      let autopilot = Autopilot::default();
      assert_eq!(autopilot.mode(), &Mode::Idle);
      assert_eq!(autopilot.active_command(), None);
      assert_eq!(autopilot.target_index(), 0);
    }

    #[test]
    fn test_goto_replaces_trajectory() {
      let geo = geo();
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::new(10.0, 0.0, 0.0);

      autopilot.accept(
        CommandKind::Trajectory(Trajectory {
          waypoints: vec![waypoint_at(&geo, 0.0, 0.0, 0.0); 3],
          r#loop: false,
        }),
        &mut vel,
      );
      assert_eq!(autopilot.active_command(), Some(ActiveCommand::Trajectory));

      let goto = waypoint_at(&geo, 500.0, 0.0, 0.0);
      autopilot.accept(CommandKind::GoTo(goto), &mut vel);
      assert_eq!(autopilot.mode(), &Mode::GoTo(goto));
      assert_eq!(autopilot.target_index(), 0);
      assert_eq!(vel, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_hold_snaps_velocity() {
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::new(60.0, -20.0, 4.0);

      autopilot.accept(CommandKind::Hold, &mut vel);
      assert_eq!(vel, Vec3::ZERO);
      assert_eq!(autopilot.active_command(), Some(ActiveCommand::Hold));
      assert_eq!(autopilot.desired_velocity(&geo(), Vec3::ZERO), Vec3::ZERO);
      assert_eq!(autopilot.active_command(), Some(ActiveCommand::Hold));
    }

    #[test]
    fn test_stop_clears_everything() {
      let geo = geo();
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::new(60.0, -20.0, 4.0);

      autopilot.accept(
        CommandKind::Trajectory(Trajectory {
          waypoints: vec![waypoint_at(&geo, 1000.0, 0.0, 0.0)],
          r#loop: true,
        }),
        &mut vel,
      );
      autopilot.accept(CommandKind::Stop, &mut vel);

      assert_eq!(vel, Vec3::ZERO);
      assert_eq!(autopilot.mode(), &Mode::Idle);
      assert_eq!(autopilot.active_command(), None);
    }

    #[test]
    fn test_empty_trajectory_goes_idle() {
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::ZERO;

      autopilot.accept(
        CommandKind::Trajectory(Trajectory {
          waypoints: Vec::new(),
          r#loop: true,
        }),
        &mut vel,
      );

      assert_eq!(autopilot.desired_velocity(&geo(), Vec3::ZERO), Vec3::ZERO);
      assert_eq!(autopilot.mode(), &Mode::Idle);
    }
  }

  mod guidance {
    use super::*;

    #[test]
    fn test_goto_points_at_target() {
      let geo = geo();
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::ZERO;
      let target = waypoint_at(&geo, 0.0, 1000.0, 0.0).with_speed(50.0);

      autopilot.accept(CommandKind::GoTo(target), &mut vel);
      let desired = autopilot.desired_velocity(&geo, Vec3::ZERO);

      assert!(desired.x.abs() < 1e-9);
      assert!((desired.y - 50.0).abs() < 1e-9);
      assert_eq!(desired.z, 0.0);
    }

    #[test]
    fn test_goto_default_speed_and_climb() {
      let geo = geo();
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::ZERO;
      let target = waypoint_at(&geo, -1000.0, 0.0, 500.0);

      autopilot.accept(CommandKind::GoTo(target), &mut vel);
      let desired = autopilot.desired_velocity(&geo, Vec3::ZERO);

      assert!((horizontal_length(desired) - DEFAULT_SPEED).abs() < 1e-9);
      assert!(desired.x < 0.0);
      assert_eq!(desired.z, Tuning::default().max_climb_rate);
    }

    #[test]
    fn test_goto_descends_without_horizontal_motion() {
      let geo = geo();
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::ZERO;

      autopilot
        .accept(CommandKind::GoTo(waypoint_at(&geo, 10.0, 0.0, 0.0)), &mut vel);
      let desired =
        autopilot.desired_velocity(&geo, Vec3::new(0.0, 0.0, 200.0));

      assert_eq!(
        desired,
        Vec3::new(0.0, 0.0, -Tuning::default().max_climb_rate)
      );
      assert_eq!(autopilot.active_command(), Some(ActiveCommand::GoTo));
    }

    #[test]
    fn test_goto_arrival_clears() {
      let geo = geo();
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::ZERO;

      autopilot.accept(
        CommandKind::GoTo(waypoint_at(&geo, 20.0, 0.0, 1005.0)),
        &mut vel,
      );
      let desired =
        autopilot.desired_velocity(&geo, Vec3::new(0.0, 0.0, 1000.0));

      assert_eq!(desired, Vec3::ZERO);
      assert_eq!(autopilot.mode(), &Mode::Idle);
    }

    #[test]
    fn test_trajectory_advances_and_loops() {
      let geo = geo();
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::ZERO;
      let a = waypoint_at(&geo, 0.0, 0.0, 0.0);
      let b = waypoint_at(&geo, 1000.0, 0.0, 0.0);

      autopilot.accept(
        CommandKind::Trajectory(Trajectory {
          waypoints: vec![a, b],
          r#loop: true,
        }),
        &mut vel,
      );

      autopilot.desired_velocity(&geo, Vec3::ZERO);
      assert_eq!(autopilot.target_index(), 1);

      autopilot.desired_velocity(&geo, Vec3::new(500.0, 0.0, 0.0));
      assert_eq!(autopilot.target_index(), 1);

      autopilot.desired_velocity(&geo, Vec3::new(1000.0, 0.0, 0.0));
      assert_eq!(autopilot.target_index(), 0);
      assert_eq!(autopilot.active_command(), Some(ActiveCommand::Trajectory));
    }

    #[test]
    fn test_trajectory_without_loop_finishes() {
      let geo = geo();
      let mut autopilot = Autopilot::default();
      let mut vel = Vec3::ZERO;

      autopilot.accept(
        CommandKind::Trajectory(Trajectory {
          waypoints: vec![waypoint_at(&geo, 0.0, 0.0, 0.0)],
          r#loop: false,
        }),
        &mut vel,
      );

      assert_eq!(autopilot.desired_velocity(&geo, Vec3::ZERO), Vec3::ZERO);
      assert_eq!(autopilot.mode(), &Mode::Idle);
      assert_eq!(autopilot.target_index(), 0);
    }
  }

  mod control_law {
    use super::*;

    #[test]
    fn test_step_is_clamped_per_axis() {
      let tuning = Tuning::default();
      let next =
        approach(Vec3::ZERO, Vec3::new(80.0, -80.0, 8.0), 0.5, &tuning);
      assert_eq!(next, Vec3::new(6.0, -6.0, 2.5));
    }

    #[test]
    fn test_small_error_is_reached_exactly() {
      let tuning = Tuning::default();
      let desired = Vec3::new(50.1, 49.9, -0.1);
      let next = approach(Vec3::new(50.0, 50.0, 0.0), desired, 0.05, &tuning);
      assert_eq!(next, desired);
    }

    #[test]
    fn test_never_overshoots() {
      let tuning = Tuning::default();
      let desired = Vec3::new(30.0, 0.0, -8.0);
      let mut vel = Vec3::ZERO;
      for _ in 0..200 {
        vel = approach(vel, desired, 0.05, &tuning);
        assert!(vel.x <= desired.x);
        assert!(vel.z >= desired.z);
      }
      assert_eq!(vel, desired);
    }
  }
}
