//! Cartesian vectors and six-DOF poses.
//!
//! All quantities are `f64` in the caller's unit system; nothing here
//! performs unit conversion. Both types are `Copy` so they can live inside
//! pre-allocated RT state without heap traffic.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

// ─── Cartesian ──────────────────────────────────────────────────────

/// Three-component vector (translation, direction, or aux-axis triple).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cartesian {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Cartesian {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn mag(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` below `eps` magnitude.
    #[inline]
    pub fn unit(self, eps: f64) -> Option<Self> {
        let mag = self.mag();
        if mag < eps { None } else { Some(self * (1.0 / mag)) }
    }
}

impl Add for Cartesian {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Cartesian {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Cartesian {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Cartesian {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Cartesian {
    type Output = Self;
    #[inline]
    fn mul(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Neg for Cartesian {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ─── Pose ───────────────────────────────────────────────────────────

/// Machine pose: three translational axes plus three auxiliary axes.
///
/// The auxiliary axes (`a`, `b`, `c`) are independent scalars; the planner
/// interpolates them linearly alongside the translational path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub tran: Cartesian,
    #[serde(default)]
    pub a: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub c: f64,
}

impl Pose {
    pub const ZERO: Self = Self::new(Cartesian::ZERO, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(tran: Cartesian, a: f64, b: f64, c: f64) -> Self {
        Self { tran, a, b, c }
    }

    /// Pose with only translational components set.
    #[inline]
    pub const fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self::new(Cartesian::new(x, y, z), 0.0, 0.0, 0.0)
    }

    /// Auxiliary axes packed as a vector (for linear a/b/c interpolation).
    #[inline]
    pub const fn abc(&self) -> Cartesian {
        Cartesian::new(self.a, self.b, self.c)
    }

    /// Build a pose from translational and auxiliary triples.
    #[inline]
    pub const fn from_parts(tran: Cartesian, abc: Cartesian) -> Self {
        Self::new(tran, abc.x, abc.y, abc.z)
    }
}

impl Add for Pose {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.tran + rhs.tran, self.a + rhs.a, self.b + rhs.b, self.c + rhs.c)
    }
}

impl AddAssign for Pose {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Pose {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.tran - rhs.tran, self.a - rhs.a, self.b - rhs.b, self.c - rhs.c)
    }
}
