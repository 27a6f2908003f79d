use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A position or velocity in the local east/north/up frame.
///
/// `x` is east, `y` is north and `z` is up, in meters (or meters per second).
pub type Vec3 = DVec3;

pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Below this magnitude a horizontal vector has no usable direction.
const DIRECTION_EPSILON: f64 = 1e-9;

pub fn normalize_angle(angle: f64) -> f64 {
  let angle = angle.rem_euclid(360.0);
  // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
  if angle >= 360.0 { 0.0 } else { angle }
}

/// Compass heading of a velocity vector: 0 is north, 90 is east.
///
/// A vector without a horizontal component has no direction and maps to 0.
pub fn heading_deg(velocity: Vec3) -> f64 {
  if velocity.x.abs() < DIRECTION_EPSILON
    && velocity.y.abs() < DIRECTION_EPSILON
  {
    return 0.0;
  }

  normalize_angle(velocity.x.atan2(velocity.y).to_degrees())
}

pub fn horizontal_length(v: Vec3) -> f64 {
  v.x.hypot(v.y)
}

/// Unit vector along the horizontal part of `v`, or zero if it has none.
pub fn horizontal_direction(v: Vec3) -> Vec3 {
  let length = horizontal_length(v);
  if length < DIRECTION_EPSILON {
    Vec3::ZERO
  } else {
    Vec3::new(v.x / length, v.y / length, 0.0)
  }
}

/// A flat-earth local tangent plane anchored at a fixed origin.
///
/// Positions are only accurate near the origin; the scale for longitude is
/// taken at the origin's latitude and never updated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRef {
  origin_lat: f64,
  origin_lon: f64,
}

impl GeoRef {
  pub fn new(origin_lat: f64, origin_lon: f64) -> Self {
    Self {
      origin_lat,
      origin_lon,
    }
  }

  pub fn origin_lat(&self) -> f64 {
    self.origin_lat
  }

  pub fn origin_lon(&self) -> f64 {
    self.origin_lon
  }

  pub fn meters_per_deg_lon(&self) -> f64 {
    METERS_PER_DEG_LAT * self.origin_lat.to_radians().cos()
  }

  pub fn geo_to_local(&self, lat: f64, lon: f64, alt: f64) -> Vec3 {
    Vec3::new(
      (lon - self.origin_lon) * self.meters_per_deg_lon(),
      (lat - self.origin_lat) * METERS_PER_DEG_LAT,
      alt,
    )
  }

  /// Returns `(lat, lon, alt)` for a local position.
  pub fn local_to_geo(&self, pos: Vec3) -> (f64, f64, f64) {
    (
      self.origin_lat + pos.y / METERS_PER_DEG_LAT,
      self.origin_lon + pos.x / self.meters_per_deg_lon(),
      pos.z,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  mod geo_ref {
    use super::*;

    const TEL_AVIV: (f64, f64) = (32.0853, 34.7818);

    #[test]
    fn test_origin_maps_to_zero() {
      let geo = GeoRef::new(TEL_AVIV.0, TEL_AVIV.1);
      let local = geo.geo_to_local(TEL_AVIV.0, TEL_AVIV.1, 1000.0);
      assert_eq!(local, Vec3::new(0.0, 0.0, 1000.0));
    }

    #[test]
    fn test_one_degree_north() {
      let geo = GeoRef::new(0.0, 0.0);
      let local = geo.geo_to_local(1.0, 0.0, 0.0);
      assert!((local.y - METERS_PER_DEG_LAT).abs() < 1e-9);
      assert_eq!(local.x, 0.0);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
      let geo = GeoRef::new(60.0, 0.0);
      let expected = METERS_PER_DEG_LAT * 0.5;
      assert!((geo.meters_per_deg_lon() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_near_origin() {
      let geo = GeoRef::new(TEL_AVIV.0, TEL_AVIV.1);
      for dlat in [-3.0, -1.5, -0.01, 0.0, 0.2, 1.0, 2.9] {
        for dlon in [-2.5, -0.3, 0.0, 0.07, 1.1, 3.0] {
          let (lat, lon, alt) = (TEL_AVIV.0 + dlat, TEL_AVIV.1 + dlon, 420.0);
          let local = geo.geo_to_local(lat, lon, alt);
          let (lat2, lon2, alt2) = geo.local_to_geo(local);

          assert!((lat - lat2).abs() < 1e-6, "lat {lat} != {lat2}");
          assert!((lon - lon2).abs() < 1e-6, "lon {lon} != {lon2}");
          assert!((alt - alt2).abs() < 1e-9);
        }
      }
    }
  }

  mod heading {
    use super::*;

    #[test]
    fn test_heading_zero_vector() {
      assert_eq!(heading_deg(Vec3::ZERO), 0.0);
      assert_eq!(heading_deg(Vec3::new(0.0, 0.0, -5.0)), 0.0);
    }

    #[test]
    fn test_heading_cardinals() {
      assert_eq!(heading_deg(Vec3::new(0.0, 1.0, 0.0)), 0.0);
      assert_eq!(heading_deg(Vec3::new(1.0, 0.0, 0.0)), 90.0);
      assert_eq!(heading_deg(Vec3::new(0.0, -1.0, 0.0)), 180.0);
      assert_eq!(heading_deg(Vec3::new(-1.0, 0.0, 0.0)), 270.0);
    }

    #[test]
    fn test_heading_is_in_range() {
      let heading = heading_deg(Vec3::new(-1.0, 1.0, 0.0));
      assert!((heading - 315.0).abs() < 1e-9);
      assert!((0.0..360.0).contains(&heading_deg(Vec3::new(-1e-6, 1.0, 0.0))));
    }
  }

  #[test]
  fn test_horizontal_direction() {
    let dir = horizontal_direction(Vec3::new(3.0, 4.0, 100.0));
    assert!((dir - Vec3::new(0.6, 0.8, 0.0)).length() < 1e-12);
    assert_eq!(horizontal_direction(Vec3::new(0.0, 0.0, 7.0)), Vec3::ZERO);
  }

  #[test]
  fn test_vector_operations() {
    let a = Vec3::new(1.0, 0.0, 0.0);
    let b = Vec3::new(0.0, 1.0, 0.0);

    assert_eq!(a + b, Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(a - b, Vec3::new(1.0, -1.0, 0.0));
    assert_eq!(a * 3.0, Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(a.dot(b), 0.0);
    assert_eq!(a.cross(b), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(Vec3::new(0.0, 0.0, 2.0).normalize_or_zero(), Vec3::Z);
    assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
  }
}
