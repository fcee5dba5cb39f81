//! Vector and matrix math for 3D rendering
//!
//! All components are fixed-point [`Scalar`]s. Matrices are row-major and act
//! on column vectors (`M * v`). View space is left-handed: the camera looks
//! down +Z and clip-space depth runs from 0 (near) to 1 (far).

use super::fixed::Scalar;
use std::ops::{Add, Mul, Neg, Sub};

/// Vectors shorter than this are treated as degenerate when normalizing.
pub const MIN_LENGTH: Scalar = Scalar::from_bits(4);

/// Minimum eye/target separation accepted by [`Mat4::look_at`].
pub const MIN_SEPARATION: Scalar = Scalar::from_bits(64);

/// Linear interpolation `a + t * (b - a)`.
pub fn lerp(a: Scalar, b: Scalar, t: Scalar) -> Scalar {
    a + t * (b - a)
}

/// 2D vector (screen positions and texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vec2 {
    pub x: Scalar,
    pub y: Scalar,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: Scalar::ZERO, y: Scalar::ZERO };

    pub fn new(x: Scalar, y: Scalar) -> Self {
        Self { x, y }
    }

    pub fn from_f32(x: f32, y: f32) -> Self {
        Self::new(Scalar::from_f32(x), Scalar::from_f32(y))
    }

    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Scalar::from_int(x), Scalar::from_int(y))
    }

    /// 2D cross product (z component of the 3D cross product).
    pub fn cross(self, other: Vec2) -> Scalar {
        self.x * other.y - self.y * other.x
    }

    pub fn scale(self, s: Scalar) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }

    pub fn lerp(self, other: Vec2, t: Scalar) -> Vec2 {
        Vec2::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vec3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: Scalar::ZERO, y: Scalar::ZERO, z: Scalar::ZERO };
    pub const UP: Vec3 = Vec3 { x: Scalar::ZERO, y: Scalar::ONE, z: Scalar::ZERO };
    pub const FORWARD: Vec3 = Vec3 { x: Scalar::ZERO, y: Scalar::ZERO, z: Scalar::ONE };

    pub fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    pub fn from_f32(x: f32, y: f32, z: f32) -> Self {
        Self::new(Scalar::from_f32(x), Scalar::from_f32(y), Scalar::from_f32(z))
    }

    pub fn from_ints(x: i32, y: i32, z: i32) -> Self {
        Self::new(Scalar::from_int(x), Scalar::from_int(y), Scalar::from_int(z))
    }

    pub fn dot(self, other: Vec3) -> Scalar {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(self) -> Scalar {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for (near) zero-length input.
    pub fn try_normalize(self) -> Option<Vec3> {
        let l = self.length();
        if l < MIN_LENGTH {
            return None;
        }
        Some(Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        })
    }

    /// Unit vector, collapsing degenerate input to zero.
    pub fn normalize(self) -> Vec3 {
        self.try_normalize().unwrap_or(Vec3::ZERO)
    }

    pub fn scale(self, s: Scalar) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn lerp(self, other: Vec3, t: Scalar) -> Vec3 {
        Vec3::new(
            lerp(self.x, other.x, t),
            lerp(self.y, other.y, t),
            lerp(self.z, other.z, t),
        )
    }

    /// Homogeneous point (w = 1).
    pub fn to_point(self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, Scalar::ONE)
    }

    /// Homogeneous direction (w = 0), unaffected by translation.
    pub fn to_direction(self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, Scalar::ZERO)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<Scalar> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: Scalar) -> Vec3 {
        self.scale(s)
    }
}

/// Homogeneous 4D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vec4 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
    pub w: Scalar,
}

impl Vec4 {
    pub fn new(x: Scalar, y: Scalar, z: Scalar, w: Scalar) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_ints(x: i32, y: i32, z: i32, w: i32) -> Self {
        Self::new(
            Scalar::from_int(x),
            Scalar::from_int(y),
            Scalar::from_int(z),
            Scalar::from_int(w),
        )
    }

    /// Drop `w`.
    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Drop `z` and `w`.
    pub fn xy(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec4> for Vec3 {
    fn from(v: Vec4) -> Vec3 {
        v.xyz()
    }
}

impl From<Vec4> for Vec2 {
    fn from(v: Vec4) -> Vec2 {
        v.xy()
    }
}

impl From<Vec3> for Vec2 {
    fn from(v: Vec3) -> Vec2 {
        Vec2::new(v.x, v.y)
    }
}

/// Signed parallelogram area of `(a, b, p)`; positive when `p` lies on the
/// inside of edge `a -> b` for the winding the projection produces.
pub fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> Scalar {
    let ab = b - a;
    let ap = p - a;
    ab.y * ap.x - ab.x * ap.y
}

/// Row-major 4x4 matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mat4 {
    pub m: [[Scalar; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = {
        let o = Scalar::ZERO;
        let i = Scalar::ONE;
        Mat4 {
            m: [[i, o, o, o], [o, i, o, o], [o, o, i, o], [o, o, o, i]],
        }
    };

    pub fn from_rows(m: [[Scalar; 4]; 4]) -> Self {
        Self { m }
    }

    pub fn translation(t: Vec3) -> Mat4 {
        let mut out = Mat4::IDENTITY;
        out.m[0][3] = t.x;
        out.m[1][3] = t.y;
        out.m[2][3] = t.z;
        out
    }

    pub fn rotation_x(angle: Scalar) -> Mat4 {
        let (s, c) = (angle.sin(), angle.cos());
        let mut out = Mat4::IDENTITY;
        out.m[1][1] = c;
        out.m[1][2] = s;
        out.m[2][1] = -s;
        out.m[2][2] = c;
        out
    }

    pub fn rotation_y(angle: Scalar) -> Mat4 {
        let (s, c) = (angle.sin(), angle.cos());
        let mut out = Mat4::IDENTITY;
        out.m[0][0] = c;
        out.m[0][2] = -s;
        out.m[2][0] = s;
        out.m[2][2] = c;
        out
    }

    pub fn rotation_z(angle: Scalar) -> Mat4 {
        let (s, c) = (angle.sin(), angle.cos());
        let mut out = Mat4::IDENTITY;
        out.m[0][0] = c;
        out.m[0][1] = s;
        out.m[1][0] = -s;
        out.m[1][1] = c;
        out
    }

    /// Euler rotation composed as `Rx(x) * Ry(y) * Rz(z)`. Entities store their
    /// angles in this order, so it must not change.
    pub fn rotation(angles: Vec3) -> Mat4 {
        Mat4::rotation_x(angles.x) * Mat4::rotation_y(angles.y) * Mat4::rotation_z(angles.z)
    }

    /// Perspective projection mapping view-space `z` in `[near, far]` to
    /// clip-space depth `[0, 1]`, with `w` carrying the view-space `z`.
    /// `aspect` is width / height. `far == near` is a precondition violation.
    pub fn perspective(fov_y: Scalar, aspect: Scalar, near: Scalar, far: Scalar) -> Mat4 {
        let half = fov_y / Scalar::from_int(2);
        let cot = half.cos() / half.sin();
        let depth_scale = far / (far - near);

        let o = Scalar::ZERO;
        Mat4::from_rows([
            [cot / aspect, o, o, o],
            [o, cot, o, o],
            [o, o, depth_scale, -depth_scale * near],
            [o, o, Scalar::ONE, o],
        ])
    }

    /// Left-handed view matrix looking from `eye` towards `target`.
    /// Returns `None` when eye and target coincide or `up` is parallel to the
    /// view direction.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Option<Mat4> {
        let dir = target - eye;
        if dir.length() < MIN_SEPARATION {
            return None;
        }
        let z = dir.try_normalize()?;
        let x = up.cross(z).try_normalize()?;
        let y = z.cross(x);

        let o = Scalar::ZERO;
        Some(Mat4::from_rows([
            [x.x, x.y, x.z, -x.dot(eye)],
            [y.x, y.y, y.z, -y.dot(eye)],
            [z.x, z.y, z.z, -z.dot(eye)],
            [o, o, o, Scalar::ONE],
        ]))
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[Scalar::ZERO; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.m[r][0] * rhs.m[0][c]
                    + self.m[r][1] * rhs.m[1][c]
                    + self.m[r][2] * rhs.m[2][c]
                    + self.m[r][3] * rhs.m[3][c];
            }
        }
        Mat4 { m: out }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        let row = |r: usize| {
            self.m[r][0] * v.x + self.m[r][1] * v.y + self.m[r][2] * v.z + self.m[r][3] * v.w
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 0.001;

    fn approx(a: Scalar, b: f32) -> bool {
        (a.to_f32() - b).abs() < TOLERANCE
    }

    fn approx4(v: Vec4, expected: [f32; 4]) -> bool {
        approx(v.x, expected[0])
            && approx(v.y, expected[1])
            && approx(v.z, expected[2])
            && approx(v.w, expected[3])
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::from_ints(1, 2, 3);
        let b = Vec3::from_ints(4, 5, 6);
        assert_eq!(a.dot(b), Scalar::from_int(32));
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::from_ints(1, 0, 0);
        let b = Vec3::from_ints(0, 1, 0);
        assert_eq!(a.cross(b), Vec3::from_ints(0, 0, 1));
    }

    #[test]
    fn test_vec3_normalize() {
        let v = Vec3::from_ints(3, 0, 4).normalize();
        assert!(approx(v.x, 0.6) && approx(v.z, 0.8));
        assert!(approx(v.length(), 1.0));
        assert_eq!(Vec3::ZERO.try_normalize(), None);
    }

    #[test]
    fn test_vec2_cross() {
        let a = Vec2::from_ints(2, 0);
        let b = Vec2::from_ints(0, 3);
        assert_eq!(a.cross(b), Scalar::from_int(6));
        assert_eq!(b.cross(a), Scalar::from_int(-6));
    }

    #[test]
    fn test_narrowing() {
        let v = Vec4::from_ints(1, 2, 3, 4);
        assert_eq!(Vec3::from(v), Vec3::from_ints(1, 2, 3));
        assert_eq!(Vec2::from(v), Vec2::from_ints(1, 2));
        assert_eq!(Vec2::from(Vec3::from_ints(5, 6, 7)), Vec2::from_ints(5, 6));
    }

    #[test]
    fn test_translation() {
        let p = Vec4::from_ints(1, 1, 1, 1);
        let t = Mat4::translation(Vec3::from_ints(1, 2, 3));
        assert_eq!(t * p, Vec4::from_ints(2, 3, 4, 1));
    }

    #[test]
    fn test_translation_property() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let mut rand = move || Scalar::from_bits(rng.i64(-(1 << 24)..(1 << 24)));
        for _ in 0..200 {
            let t = Vec3::new(rand(), rand(), rand());
            let p = Vec4::new(rand(), rand(), rand(), Scalar::ONE);
            let moved = Mat4::translation(t) * p;
            assert_eq!(moved, Vec4::new(p.x + t.x, p.y + t.y, p.z + t.z, p.w));
        }
    }

    #[test]
    fn test_identity_is_neutral() {
        let r = Mat4::rotation(Vec3::from_f32(0.3, -1.1, 2.0));
        assert_eq!(r * Mat4::IDENTITY, r);
        assert_eq!(Mat4::IDENTITY * r, r);
        let t = Mat4::translation(Vec3::from_ints(4, -5, 6));
        assert_eq!(Mat4::IDENTITY * t, t);
    }

    #[test]
    fn test_axis_rotations_90() {
        let quarter = Scalar::FRAC_PI_2;
        let p = Vec4::from_ints(1, 1, 1, 1);
        assert!(approx4(Mat4::rotation_x(quarter) * p, [1.0, 1.0, -1.0, 1.0]));
        assert!(approx4(Mat4::rotation_y(quarter) * p, [-1.0, 1.0, 1.0, 1.0]));
        assert!(approx4(Mat4::rotation_z(quarter) * p, [1.0, -1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        let angles = Vec3::from_f32(0.4, 0.9, -0.7);
        let composed = Mat4::rotation_x(angles.x)
            * Mat4::rotation_y(angles.y)
            * Mat4::rotation_z(angles.z);
        assert_eq!(Mat4::rotation(angles), composed);
        let reversed = Mat4::rotation_z(angles.z)
            * Mat4::rotation_y(angles.y)
            * Mat4::rotation_x(angles.x);
        assert_ne!(Mat4::rotation(angles), reversed);
    }

    #[test]
    fn test_perspective_depth_range() {
        let near = Scalar::from_f32(0.1);
        let far = Scalar::from_int(100);
        let proj = Mat4::perspective(Scalar::FRAC_PI_2, Scalar::ONE, near, far);

        let at_near = proj * Vec4::new(Scalar::ZERO, Scalar::ZERO, near, Scalar::ONE);
        assert!(approx(at_near.z / at_near.w, 0.0));
        let at_far = proj * Vec4::new(Scalar::ZERO, Scalar::ZERO, far, Scalar::ONE);
        assert!(approx(at_far.z / at_far.w, 1.0));
        assert_eq!(at_far.w, far);

        // 90 degree fov: a point on the 45 degree line lands on the frustum edge
        let edge = proj * Vec4::from_ints(2, 2, 2, 1);
        assert!(approx(edge.x / edge.w, 1.0));
        assert!(approx(edge.y / edge.w, 1.0));
    }

    #[test]
    fn test_look_at() {
        let eye = Vec3::from_ints(0, 0, -5);
        let view = Mat4::look_at(eye, Vec3::ZERO, Vec3::UP).expect("valid camera");
        let origin = view * Vec4::from_ints(0, 0, 0, 1);
        assert!(approx4(origin, [0.0, 0.0, 5.0, 1.0]));
        let right = view * Vec4::from_ints(1, 0, 0, 1);
        assert!(approx4(right, [1.0, 0.0, 5.0, 1.0]));
    }

    #[test]
    fn test_look_at_degenerate() {
        let eye = Vec3::from_ints(1, 2, 3);
        assert!(Mat4::look_at(eye, eye, Vec3::UP).is_none());
        assert!(Mat4::look_at(Vec3::ZERO, Vec3::from_ints(0, 4, 0), Vec3::UP).is_none());
    }

    #[test]
    fn test_edge_function_sign() {
        let a = Vec2::from_ints(4, 1);
        let b = Vec2::from_ints(1, 1);
        let c = Vec2::from_ints(1, 4);
        assert!(edge_function(a, b, c) > Scalar::ZERO);
        assert!(edge_function(a, c, b) < Scalar::ZERO);
    }
}
