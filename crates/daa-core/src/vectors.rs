//! 2D and 3D Euclidean vectors used by the projection and metric code.
//!
//! Both types are plain `Copy` values. Arithmetic goes through named methods
//! (`add`, `sub`, `scale`) rather than operator overloads so every conversion
//! stays visible at the call site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default tolerance for [`Vect2::almost_equals`] and [`Vect3::almost_equals`].
pub const ALMOST_EQUALS_EPS: f64 = 1e-9;

/// Scalar comparison with an absolute tolerance.
pub fn almost_equals(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Horizontal vector (east-like, north-like components).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vect2 {
    pub x: f64,
    pub y: f64,
}

#[allow(clippy::should_implement_trait)]
impl Vect2 {
    pub const ZERO: Vect2 = Vect2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vect2) -> Vect2 {
        Vect2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Vect2) -> Vect2 {
        Vect2::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, k: f64) -> Vect2 {
        Vect2::new(self.x * k, self.y * k)
    }

    pub fn dot(self, other: Vect2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Unit vector in the same direction. The zero vector is returned as is.
    pub fn normalize(self) -> Vect2 {
        let n = self.norm();
        if n == 0.0 {
            self
        } else {
            self.scale(1.0 / n)
        }
    }

    /// Rotation by -90 degrees: `(y, -x)`.
    pub fn perpendicular(self) -> Vect2 {
        Vect2::new(self.y, -self.x)
    }

    /// 2D determinant, `dot(self, perpendicular(other))`.
    pub fn det(self, other: Vect2) -> f64 {
        self.dot(other.perpendicular())
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn almost_equals(self, other: Vect2, eps: f64) -> bool {
        almost_equals(self.x, other.x, eps) && almost_equals(self.y, other.y, eps)
    }

    pub fn to_pair(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl fmt::Display for Vect2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cartesian 3D vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vect3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[allow(clippy::should_implement_trait)]
impl Vect3 {
    pub const ZERO: Vect3 = Vect3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn add(self, other: Vect3) -> Vect3 {
        Vect3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(self, other: Vect3) -> Vect3 {
        Vect3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(self, k: f64) -> Vect3 {
        Vect3::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn dot(self, other: Vect3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Unit vector in the same direction. The zero vector is returned as is;
    /// the local frame construction relies on this instead of an error.
    pub fn normalize(self) -> Vect3 {
        let n = self.norm();
        if n == 0.0 {
            self
        } else {
            self.scale(1.0 / n)
        }
    }

    /// Right-handed cross product.
    pub fn cross(self, other: Vect3) -> Vect3 {
        Vect3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Horizontal part, dropping `z`.
    pub fn vect2(self) -> Vect2 {
        Vect2::new(self.x, self.y)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn almost_equals(self, other: Vect3, eps: f64) -> bool {
        almost_equals(self.x, other.x, eps)
            && almost_equals(self.y, other.y, eps)
            && almost_equals(self.z, other.z, eps)
    }
}

impl fmt::Display for Vect3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES2: [Vect2; 5] = [
        Vect2::new(3.0, 4.0),
        Vect2::new(-1.5, 0.25),
        Vect2::new(1e-8, -2e-8),
        Vect2::new(0.0, -7.0),
        Vect2::ZERO,
    ];

    #[test]
    fn test_normalize_is_idempotent() {
        for v in SAMPLES2 {
            let once = v.normalize();
            let twice = once.normalize();
            assert!(once.almost_equals(twice, 1e-12), "{v}: {once} vs {twice}");
        }
        let v3 = Vect3::new(1.0, -2.0, 2.0).normalize();
        assert!(v3.almost_equals(v3.normalize(), 1e-12));
    }

    #[test]
    fn test_normalize_gives_unit_length() {
        for v in SAMPLES2.iter().filter(|v| !v.is_zero()) {
            assert!((v.normalize().norm() - 1.0).abs() < 1e-12);
        }
        assert!((Vect3::new(0.0, 0.0, -9.0).normalize().norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_vector_is_fixed_point() {
        assert_eq!(Vect2::ZERO.normalize(), Vect2::ZERO);
        assert_eq!(Vect3::ZERO.normalize(), Vect3::ZERO);
    }

    #[test]
    fn test_basic_arithmetic() {
        let a = Vect2::new(1.0, 2.0);
        let b = Vect2::new(3.0, -1.0);
        assert_eq!(a.add(b), Vect2::new(4.0, 1.0));
        assert_eq!(a.sub(b), Vect2::new(-2.0, 3.0));
        assert_eq!(a.scale(2.0), Vect2::new(2.0, 4.0));
        assert_eq!(a.dot(b), 1.0);
        assert_eq!(Vect2::new(3.0, 4.0).norm(), 5.0);
    }

    #[test]
    fn test_perpendicular_rotates_clockwise() {
        let north = Vect2::new(0.0, 1.0);
        assert_eq!(north.perpendicular(), Vect2::new(1.0, 0.0));
        assert_eq!(Vect2::new(2.0, 0.0).det(Vect2::new(0.0, 3.0)), 6.0);
    }

    #[test]
    fn test_cross_is_right_handed() {
        let x = Vect3::new(1.0, 0.0, 0.0);
        let y = Vect3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vect3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(x), Vect3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_vect3_add_is_componentwise() {
        let a = Vect3::new(1.0, 2.0, 3.0);
        let b = Vect3::new(-1.0, 0.5, 4.0);
        assert_eq!(a.add(b), Vect3::new(0.0, 2.5, 7.0));
        assert_eq!(a.vect2(), Vect2::new(1.0, 2.0));
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(Vect2::new(1.0, -2.5).to_string(), "(1, -2.5)");
        assert_eq!(Vect3::new(0.0, 1.0, 2.0).to_string(), "(0, 1, 2)");
    }
}
