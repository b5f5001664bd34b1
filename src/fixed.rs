//! Q-format fixed-point numbers.
//!
//! Every fixed-point field of a [`crate::RasterizedTriangle`] shares one binary
//! point position, given by the `FRAC` parameter. Conversions from floating point
//! name their rounding mode and what happens when the value does not fit.

use std::fmt;

/// How a float is brought onto the fixed-point grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Round to the nearest step, halfway cases away from zero.
    #[default]
    Nearest,
    /// Drop the bits below the binary point (round toward zero).
    Truncate,
}

/// What a conversion does with a value outside the `i32` range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// The conversion fails and the triangle is rejected.
    #[default]
    Reject,
    /// The value is clamped to the nearest representable one.
    Saturate,
}

/// Signed 32-bit fixed-point number with `FRAC` fractional bits.
#[repr(transparent)]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed<const FRAC: u32>(i32);

impl<const FRAC: u32> Fixed<FRAC> {
    const VALID: () = assert!(FRAC >= 1 && FRAC <= 30, "fractional bits must be in 1..=30");

    pub const FRAC_BITS: u32 = FRAC;
    pub const SCALE: f64 = (1u64 << FRAC) as f64;
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << FRAC);
    pub const MIN: Self = Self(i32::MIN);
    pub const MAX: Self = Self(i32::MAX);

    #[inline(always)]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn raw(self) -> i32 {
        self.0
    }

    fn scaled(value: f64, rounding: Rounding) -> f64 {
        let () = Self::VALID;
        let scaled = value * Self::SCALE;
        match rounding {
            Rounding::Nearest => scaled.round(),
            Rounding::Truncate => scaled.trunc(),
        }
    }

    /// Converts a float, or returns `None` when it is not finite or does not fit.
    pub fn from_f64(value: f64, rounding: Rounding) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = Self::scaled(value, rounding);
        if scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
            return None;
        }
        Some(Self(scaled as i32))
    }

    /// Converts a float, clamping to [`Self::MIN`]/[`Self::MAX`]. NaN becomes zero.
    pub fn saturating_from_f64(value: f64, rounding: Rounding) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        // `as` saturates at the integer bounds
        Self(Self::scaled(value, rounding) as i32)
    }

    /// Converts a float under an explicit overflow policy. NaN never converts.
    pub fn convert(value: f64, rounding: Rounding, policy: OverflowPolicy) -> Option<Self> {
        match policy {
            OverflowPolicy::Reject => Self::from_f64(value, rounding),
            OverflowPolicy::Saturate if value.is_nan() => None,
            OverflowPolicy::Saturate => Some(Self::saturating_from_f64(value, rounding)),
        }
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Multiplies by a plain integer, e.g. a number of pixel steps.
    pub fn checked_mul_int(self, steps: i32) -> Option<Self> {
        self.0.checked_mul(steps).map(Self)
    }

    /// Fixed-point reciprocal: `round(2^(2 * FRAC) / raw)` in integer arithmetic.
    ///
    /// The result is exact to half a step and identical on every platform.
    /// Returns `None` for zero, for values so small that `1 / x` overflows and
    /// for values so large that `1 / x` rounds to zero.
    pub fn recip(self) -> Option<Self> {
        self.recip_scaled(0)
    }

    /// `2^shift / x`, rounded once: `round(2^(2 * FRAC + shift) / raw)`.
    ///
    /// Scaling inside the division keeps the significant bits that a plain
    /// [`Self::recip`] loses for large `x`.
    pub fn recip_scaled(self, shift: u32) -> Option<Self> {
        let () = Self::VALID;
        if self.0 == 0 || shift > 32 {
            return None;
        }
        let numerator = 1i128 << (2 * FRAC + shift);
        let divisor = self.0 as i128;
        let half = divisor.abs() / 2;
        let quotient = if divisor > 0 {
            (numerator + half) / divisor
        } else {
            -((numerator + half) / -divisor)
        };
        match i32::try_from(quotient) {
            Ok(0) | Err(_) => None,
            Ok(raw) => Some(Self(raw)),
        }
    }
}

impl<const FRAC: u32> fmt::Debug for Fixed<FRAC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed<{}>({} = {})", FRAC, self.0, self.to_f64())
    }
}

impl<const FRAC: u32> From<Fixed<FRAC>> for f64 {
    fn from(value: Fixed<FRAC>) -> f64 {
        value.to_f64()
    }
}
