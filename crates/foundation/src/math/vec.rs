use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit direction at `angle_deg` (screen convention: +y points down),
    /// scaled by `radius`.
    pub fn from_polar_deg(angle_deg: f64, radius: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self::new(rad.cos() * radius, rad.sin() * radius)
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, k: f64) -> Self::Output {
        Self::new(self.x * k, self.y * k)
    }
}

/// World-space point. `y` is the scroll axis, negative `z` is farther away.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

#[cfg(test)]
mod tests {
    use super::{Vec2, Vec3};

    #[test]
    fn vec2_ops() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(-0.5, 4.0);
        assert_eq!(a + b, Vec2::new(0.5, 6.0));
        assert_eq!(a - b, Vec2::new(1.5, -2.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
    }

    #[test]
    fn polar_minus_ninety_points_up() {
        let p = Vec2::from_polar_deg(-90.0, 75.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y + 75.0).abs() < 1e-9);
        assert!((p.length() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn vec3_add_sub() {
        let a = Vec3::new(1.0, 2.0, -1.0);
        let b = Vec3::new(0.5, -2.0, 3.0);
        assert_eq!(a + b, Vec3::new(1.5, 0.0, 2.0));
        assert_eq!(a - b, Vec3::new(0.5, 4.0, -4.0));
        assert!(a.is_finite());
        assert!(!Vec3::new(f64::NAN, 0.0, 0.0).is_finite());
    }
}
