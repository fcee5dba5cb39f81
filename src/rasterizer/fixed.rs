//! Deterministic fixed-point scalar
//!
//! Every geometric quantity in the pipeline is a `Scalar`. Hardware floats can
//! round differently between compilers and CPUs, which shows up as cracks along
//! shared triangle edges; integer arithmetic on the raw bits cannot.
//!
//! Storage is `I48F16`: 16 fractional bits of precision and enough integer
//! headroom that screen-space edge functions (products of pixel coordinates)
//! never overflow. Arithmetic saturates rather than wrapping.

use fixed::types::I48F16;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

const FRAC_BITS: u32 = 16;

/// Signed fixed-point real number (48 integer bits, 16 fractional bits).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scalar(I48F16);

impl Scalar {
    pub const ZERO: Scalar = Scalar::from_bits(0);
    pub const ONE: Scalar = Scalar::from_int(1);
    pub const HALF: Scalar = Scalar::from_bits(1 << (FRAC_BITS - 1));
    /// Smallest representable positive step.
    pub const EPSILON: Scalar = Scalar::from_bits(1);
    pub const MAX: Scalar = Scalar::from_bits(i64::MAX);
    pub const MIN: Scalar = Scalar::from_bits(i64::MIN);
    pub const PI: Scalar = Scalar::from_bits(205_887);
    pub const FRAC_PI_2: Scalar = Scalar::from_bits(102_944);
    pub const TAU: Scalar = Scalar::from_bits(411_775);

    pub const fn from_bits(bits: i64) -> Self {
        Scalar(I48F16::from_bits(bits))
    }

    pub const fn to_bits(self) -> i64 {
        self.0.to_bits()
    }

    pub const fn from_int(n: i32) -> Self {
        Scalar::from_bits((n as i64) << FRAC_BITS)
    }

    /// Pixel-coordinate sized integers; magnitudes must stay below 2^47.
    pub const fn from_i64(n: i64) -> Self {
        Scalar::from_bits(n << FRAC_BITS)
    }

    /// Lossy conversion from floating point. Out-of-range values saturate;
    /// NaN maps to zero.
    pub fn from_f32(value: f32) -> Self {
        if value.is_nan() {
            return Scalar::ZERO;
        }
        Scalar(I48F16::saturating_from_num(value))
    }

    /// Lossy conversion to floating point, for presentation and diagnostics only.
    pub fn to_f32(self) -> f32 {
        self.0.to_num::<f32>()
    }

    /// Integer part, rounded towards negative infinity.
    pub const fn to_int(self) -> i64 {
        self.to_bits() >> FRAC_BITS
    }

    pub const fn floor(self) -> Self {
        Scalar::from_bits(self.to_bits() & !((1i64 << FRAC_BITS) - 1))
    }

    pub fn ceil(self) -> Self {
        -(-self).floor()
    }

    /// Fractional part in `[0, 1)`, so negative values wrap upwards.
    pub fn fract(self) -> Self {
        self - self.floor()
    }

    pub fn abs(self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }

    pub fn is_negative(self) -> bool {
        self.to_bits() < 0
    }

    pub fn is_zero(self) -> bool {
        self.to_bits() == 0
    }

    pub fn min(self, other: Scalar) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    pub fn max(self, other: Scalar) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    pub fn clamp(self, lo: Scalar, hi: Scalar) -> Self {
        self.max(lo).min(hi)
    }

    /// Division that reports a zero divisor instead of panicking.
    pub fn checked_div(self, rhs: Scalar) -> Option<Self> {
        self.0.checked_div(rhs.0).map(Scalar)
    }

    /// `1 / self`, or `None` for zero.
    pub fn recip(self) -> Option<Self> {
        Scalar::ONE.checked_div(self)
    }

    /// Square root. Negative input yields zero.
    pub fn sqrt(self) -> Self {
        if self.to_bits() <= 0 {
            return Scalar::ZERO;
        }
        Scalar(self.0.sqrt())
    }

    /// Sine of an angle in radians.
    pub fn sin(self) -> Self {
        let mut x = self.wrap_angle();
        if x > Scalar::FRAC_PI_2 {
            x = Scalar::PI - x;
        } else if x < -Scalar::FRAC_PI_2 {
            x = -Scalar::PI - x;
        }

        // Taylor series through x^11 in Horner form; truncation error on
        // [-pi/2, pi/2] is below one raw unit.
        let x2 = x * x;
        let mut t = Scalar::ONE - x2 / Scalar::from_int(110);
        t = Scalar::ONE - x2 * t / Scalar::from_int(72);
        t = Scalar::ONE - x2 * t / Scalar::from_int(42);
        t = Scalar::ONE - x2 * t / Scalar::from_int(20);
        t = Scalar::ONE - x2 * t / Scalar::from_int(6);
        x * t
    }

    pub fn cos(self) -> Self {
        (self + Scalar::FRAC_PI_2).sin()
    }

    /// Tangent. The cosine of the angle must not be zero.
    pub fn tan(self) -> Self {
        self.sin() / self.cos()
    }

    /// Reduce an angle into `[-pi, pi)`.
    fn wrap_angle(self) -> Self {
        let pi = Scalar::PI.to_bits();
        let tau = Scalar::TAU.to_bits();
        let shifted = self.to_bits().saturating_add(pi);
        Scalar::from_bits(shifted.rem_euclid(tau) - pi)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::from_int(n)
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Scalar {
    type Output = Scalar;
    fn sub(self, rhs: Scalar) -> Scalar {
        Scalar(self.0.saturating_sub(rhs.0))
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar(self.0.saturating_mul(rhs.0))
    }
}

/// Division by zero is a precondition violation and panics; guard with
/// [`Scalar::checked_div`] wherever the divisor comes from geometry.
impl Div for Scalar {
    type Output = Scalar;
    fn div(self, rhs: Scalar) -> Scalar {
        Scalar(self.0.saturating_div(rhs.0))
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        Scalar(self.0.saturating_neg())
    }
}

impl AddAssign for Scalar {
    fn add_assign(&mut self, rhs: Scalar) {
        *self = *self + rhs;
    }
}

impl SubAssign for Scalar {
    fn sub_assign(&mut self, rhs: Scalar) {
        *self = *self - rhs;
    }
}

impl MulAssign for Scalar {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = *self * rhs;
    }
}

impl DivAssign for Scalar {
    fn div_assign(&mut self, rhs: Scalar) {
        *self = *self / rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Scalar, b: f32, tol: f32) -> bool {
        (a.to_f32() - b).abs() <= tol
    }

    #[test]
    fn test_basic_arithmetic() {
        let a = Scalar::from_f32(1.5);
        let b = Scalar::from_int(2);
        assert_eq!(a + b, Scalar::from_f32(3.5));
        assert_eq!(a - b, Scalar::from_f32(-0.5));
        assert_eq!(a * b, Scalar::from_int(3));
        assert_eq!(b / Scalar::from_int(4), Scalar::HALF);
    }

    #[test]
    fn test_floor_ceil() {
        let v = Scalar::from_f32(2.25);
        assert_eq!(v.floor(), Scalar::from_int(2));
        assert_eq!(v.ceil(), Scalar::from_int(3));
        let n = Scalar::from_f32(-2.25);
        assert_eq!(n.floor(), Scalar::from_int(-3));
        assert_eq!(n.ceil(), Scalar::from_int(-2));
        assert_eq!(Scalar::from_int(4).ceil(), Scalar::from_int(4));
        assert_eq!(n.to_int(), -3);
        assert_eq!(n.fract(), Scalar::from_f32(0.75));
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(Scalar::from_int(9).sqrt(), Scalar::from_int(3));
        assert_eq!(Scalar::from_int(144).sqrt(), Scalar::from_int(12));
        assert!(close(Scalar::from_int(2).sqrt(), 1.41421, 0.0001));
        assert_eq!(Scalar::from_int(-4).sqrt(), Scalar::ZERO);
    }

    #[test]
    fn test_from_f32_is_total() {
        assert_eq!(Scalar::from_f32(f32::NAN), Scalar::ZERO);
        assert_eq!(Scalar::from_f32(f32::INFINITY), Scalar::MAX);
        assert_eq!(Scalar::from_f32(f32::NEG_INFINITY), Scalar::MIN);
        assert_eq!(Scalar::from_f32(1e30), Scalar::MAX);
    }

    #[test]
    fn test_trig() {
        assert!(close(Scalar::ZERO.sin(), 0.0, 0.0001));
        assert!(close(Scalar::FRAC_PI_2.sin(), 1.0, 0.0002));
        assert!(close(Scalar::ZERO.cos(), 1.0, 0.0002));
        assert!(close(Scalar::PI.cos(), -1.0, 0.0002));
        assert!(close(Scalar::FRAC_PI_2.cos(), 0.0, 0.0002));
        assert!(close(Scalar::from_f32(0.5).sin(), 0.5_f32.sin(), 0.0002));
        assert!(close(Scalar::from_f32(-2.0).sin(), (-2.0_f32).sin(), 0.0002));
        assert!(close(Scalar::from_f32(7.0).cos(), 7.0_f32.cos(), 0.0005));
        assert!(close((Scalar::PI / Scalar::from_int(4)).tan(), 1.0, 0.0005));
    }

    #[test]
    fn test_trig_is_deterministic() {
        let angle = Scalar::from_f32(1.2345);
        assert_eq!(angle.sin().to_bits(), angle.sin().to_bits());
        assert_eq!(angle.cos(), (angle + Scalar::FRAC_PI_2).sin());
    }

    #[test]
    fn test_saturation_and_checked_div() {
        assert_eq!(Scalar::MAX + Scalar::ONE, Scalar::MAX);
        assert_eq!(Scalar::ONE.checked_div(Scalar::ZERO), None);
        assert_eq!(Scalar::from_int(4).recip(), Some(Scalar::from_f32(0.25)));
    }

    #[test]
    fn test_ordering() {
        assert!(Scalar::from_f32(-0.5) < Scalar::ZERO);
        assert!(Scalar::EPSILON > Scalar::ZERO);
        assert_eq!(Scalar::from_int(3).max(Scalar::from_int(5)), Scalar::from_int(5));
        assert_eq!(Scalar::from_int(7).clamp(Scalar::ZERO, Scalar::ONE), Scalar::ONE);
    }
}
