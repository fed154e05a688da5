//! Angle and vector math shared by movement, scanning and projectiles.
//!
//! # Conventions
//!
//! The world origin is the centre of the arena. `+y` points north and `+x`
//! points east. Headings and bearings are degrees measured clockwise from
//! north, so 0° is north, 90° east, 180° south and 270° west. The unit
//! vector for a heading `h` is therefore `(sin h, cos h)`.

use serde::{Deserialize, Serialize};

/// Full turn in degrees.
pub const FULL_TURN: f64 = 360.0;

/// Half turn in degrees.
pub const HALF_TURN: f64 = 180.0;

/// A point or displacement in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// East-west component.
    pub x: f64,
    /// North-south component.
    pub y: f64,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `heading` degrees.
    #[must_use]
    pub fn from_heading(heading: f64) -> Self {
        let rad = heading.to_radians();
        Self::new(rad.sin(), rad.cos())
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// Scale by a factor.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Whether both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Reduce any angle into `[0, 360)`.
///
/// Rust's `%` keeps the sign of the dividend, so negative remainders are
/// shifted up by a full turn. Non-finite input maps to 0.
#[must_use]
pub fn normalize(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut reduced = angle % FULL_TURN;
    if reduced < 0.0 {
        reduced += FULL_TURN;
    }
    // -1e-20 % 360 + 360 rounds to exactly 360
    if reduced >= FULL_TURN {
        reduced = 0.0;
    }
    reduced
}

/// Signed shortest rotation from `current` to `target`, in `(-180, 180]`.
///
/// A target directly behind resolves to `+180` (clockwise).
#[must_use]
pub fn delta_angle(target: f64, current: f64) -> f64 {
    let diff = normalize(target - current);
    if diff > HALF_TURN {
        diff - FULL_TURN
    } else {
        diff
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(from: Vec2, to: Vec2) -> f64 {
    (to - from).length()
}

/// Bearing from `from` to `to` in `[0, 360)`.
///
/// Coincident points have bearing 0.
#[must_use]
pub fn bearing(from: Vec2, to: Vec2) -> f64 {
    let d = to - from;
    normalize(d.x.atan2(d.y).to_degrees())
}

/// Whether `angle` lies inside the cone centred on `center` with total
/// width `width`, boundaries included.
#[must_use]
pub fn in_cone(angle: f64, center: f64, width: f64) -> bool {
    delta_angle(angle, center).abs() <= width / 2.0
}

/// Projection of `point` onto the ray starting at `origin` with unit
/// direction `dir`.
///
/// Returns `(along, across)`: the signed distance along the ray and the
/// perpendicular distance from it.
#[must_use]
pub fn project_onto_ray(origin: Vec2, dir: Vec2, point: Vec2) -> (f64, f64) {
    let rel = point - origin;
    let along = rel.dot(dir);
    let across = (rel.x * dir.y - rel.y * dir.x).abs();
    (along, across)
}

/// Smallest `t` in `[0, max_t]` at which a point moving from `start` along
/// unit direction `dir` comes within `radius` of `obstacle`.
///
/// Returns `None` when the path never gets that close, or when the mover
/// already overlaps the obstacle but is not approaching it.
#[must_use]
pub fn first_contact(start: Vec2, dir: Vec2, max_t: f64, obstacle: Vec2, radius: f64) -> Option<f64> {
    let rel = start - obstacle;
    let approach = rel.dot(dir);
    let c = rel.dot(rel) - radius * radius;

    if c <= 0.0 {
        // Already touching: block only motion that closes the gap.
        return (approach < 0.0).then_some(0.0);
    }
    if approach >= 0.0 {
        return None;
    }

    // |rel + t*dir|^2 = r^2  =>  t^2 + 2*approach*t + c = 0
    let disc = approach * approach - c;
    if disc < 0.0 {
        return None;
    }
    let t = -approach - disc.sqrt();
    (t <= max_t).then_some(t.max(0.0))
}
