//! Spherical Earth projection onto a local tangent plane.
//!
//! Geodetic points are placed on a sphere and then flattened into a 2D frame
//! anchored at a reference point (normally the ownship position at the same
//! timestep). The axis convention matches the well-clear formalism the
//! metrics are defined against, so it is reproduced exactly rather than
//! swapped for a generic ECEF/ENU transform.

use crate::vectors::{Vect2, Vect3};
use std::f64::consts::PI;

/// Meters in one international nautical mile.
pub const METERS_PER_NMI: f64 = 1852.0;

/// Sphere radius in nautical miles such that one arc-minute of latitude is
/// one nautical mile.
pub const EARTH_RADIUS_NMI: f64 = 180.0 * 60.0 / PI;

/// Default sphere radius for [`spherical_to_xyz`], in meters.
pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_NMI * METERS_PER_NMI;

/// Angle in radians subtended by `distance_nmi` nautical miles of arc.
pub fn angle_from_distance(distance_nmi: f64) -> f64 {
    distance_nmi * PI / (180.0 * 60.0)
}

/// Wrap an angle into `[-pi, pi)`.
pub fn to_pi(angle_rad: f64) -> f64 {
    (angle_rad + PI).rem_euclid(2.0 * PI) - PI
}

/// Map latitude/longitude (radians) onto the default Earth sphere.
pub fn spherical_to_xyz(lat_rad: f64, lon_rad: f64) -> Vect3 {
    spherical_to_xyz_with_radius(lat_rad, lon_rad, EARTH_RADIUS_M)
}

/// Map latitude/longitude (radians) onto a sphere of `radius`.
///
/// Uses colatitude `theta = pi/2 - lat` and azimuth `phi = pi - lon`.
pub fn spherical_to_xyz_with_radius(lat_rad: f64, lon_rad: f64, radius: f64) -> Vect3 {
    let theta = PI / 2.0 - lat_rad;
    let phi = PI - lon_rad;
    Vect3::new(
        radius * theta.sin() * phi.cos(),
        radius * theta.sin() * phi.sin(),
        radius * theta.cos(),
    )
}

/// Inverse of [`spherical_to_xyz_with_radius`]. Returns `(lat_rad, lon_rad)`.
///
/// The radius is taken from the vector itself; the zero vector maps to
/// `(0, 0)`.
pub fn xyz_to_spherical(v: Vect3) -> (f64, f64) {
    let r = v.norm();
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let theta = (v.z / r).clamp(-1.0, 1.0).acos();
    let phi = v.y.atan2(v.x);
    (PI / 2.0 - theta, to_pi(PI - phi))
}

/// Orthonormal frame anchored at a reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    /// Radial direction through the reference point.
    pub x_axis: Vect3,
    pub y_axis: Vect3,
    pub z_axis: Vect3,
}

impl LocalFrame {
    /// Build the frame at `reference`.
    ///
    /// At the poles (`reference.x == reference.y == 0`) the horizontal
    /// direction falls back to `(1, 0, 0)`.
    pub fn at(reference: Vect3) -> Self {
        let x_axis = reference.normalize();
        let horizontal = if reference.x != 0.0 || reference.y != 0.0 {
            Vect3::new(reference.y, -reference.x, 0.0)
        } else {
            Vect3::new(1.0, 0.0, 0.0)
        };
        let y_axis = horizontal.normalize();
        let z_axis = reference.cross(y_axis).normalize();
        Self {
            x_axis,
            y_axis,
            z_axis,
        }
    }

    /// Project `point` into the tangent plane: `(y . p, -(z . p))`.
    ///
    /// The second component is negated on purpose; with it, points north of
    /// the reference have a positive second coordinate.
    pub fn project(&self, point: Vect3) -> Vect2 {
        Vect2::new(self.y_axis.dot(point), -self.z_axis.dot(point))
    }
}

/// Build the local frame at `reference` as `(x_axis, y_axis, z_axis)`.
pub fn local_frame(reference: Vect3) -> (Vect3, Vect3, Vect3) {
    let frame = LocalFrame::at(reference);
    (frame.x_axis, frame.y_axis, frame.z_axis)
}

/// Project `point` into the tangent plane anchored at `reference`.
pub fn project_to_plane(reference: Vect3, point: Vect3) -> Vect2 {
    LocalFrame::at(reference).project(point)
}
