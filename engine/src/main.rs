//! Steps wind and terrain by hand to show how they shape the ground track.

use engine::{
  environment::{Chain, Environment, Terrain, Wind},
  geometry::{Vec3, horizontal_length},
};

const DT: f64 = 1.0;
const STEPS: usize = 10;

fn main() {
  let wind = Wind::new(5.0, 2.0);
  let terrain = Terrain::default();
  let environment = Chain::new().with(wind).with(terrain);

  // Low and descending, so the terrain floor kicks in.
  let mut pos = Vec3::new(0.0, 0.0, 200.0);
  let mut vel = Vec3::new(100.0, 0.0, -15.0);

  println!(
    "wind {:.1} m/s ({:.1} east, {:.1} north), terrain margin {:.0} m",
    wind.speed(),
    wind.wx,
    wind.wy,
    terrain.safety_margin
  );

  for step in 1..=STEPS {
    let (applied_pos, applied_vel, warning) = environment.apply(DT, pos, vel);
    let next = applied_pos + applied_vel * DT;

    let ground_vel = (next - pos) / DT;
    let drift = ground_vel - applied_vel;
    let agl = next.z - terrain.ground_altitude(next);

    println!();
    println!(
      "t={:>4.1}s  pos ({:.1}, {:.1}, {:.1})  agl {agl:.1} m",
      step as f64 * DT,
      next.x,
      next.y,
      next.z
    );
    println!(
      "  air    ({:.1}, {:.1}, {:.1}) m/s",
      applied_vel.x, applied_vel.y, applied_vel.z
    );
    println!(
      "  ground ({:.1}, {:.1}, {:.1}) m/s, {:.1} m/s over the ground",
      ground_vel.x,
      ground_vel.y,
      ground_vel.z,
      horizontal_length(ground_vel)
    );
    println!("  estimated wind ({:.1}, {:.1}) m/s", drift.x, drift.y);

    if let Some(warning) = warning {
      println!("  warning: {warning}");
    }

    pos = next;
    vel = applied_vel;
  }
}
