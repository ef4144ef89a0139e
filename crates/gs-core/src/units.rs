//! Unit-safe electrical and geometric quantities.
//!
//! Prevents mixing incompatible units like kW and kvar, or metres and volts.
//! Every type stores its canonical SI magnitude (`m`, `V`, `A`, `VA`, `W`,
//! `var`, `rad`) as an `f64`; equality and ordering compare that magnitude.
//! All wrappers are `#[repr(transparent)]`, so there is no runtime overhead
//! over raw `f64`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Implement common arithmetic for a quantity newtype.
macro_rules! impl_quantity_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        /// Ratio of two same-unit quantities is a bare scalar.
        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Raw magnitude in the canonical SI unit.
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Length in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Distance(f64);

impl_quantity_ops!(Distance, "m");

impl Distance {
    #[inline]
    pub const fn meters(m: f64) -> Self {
        Self(m)
    }

    #[inline]
    pub fn kilometers(km: f64) -> Self {
        Self(km * 1_000.0)
    }

    #[inline]
    pub fn as_meters(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn as_kilometers(self) -> f64 {
        self.0 / 1_000.0
    }
}

/// Angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Angle(f64);

impl_quantity_ops!(Angle, "rad");

impl Angle {
    #[inline]
    pub const fn radians(rad: f64) -> Self {
        Self(rad)
    }

    #[inline]
    pub fn degrees(deg: f64) -> Self {
        Self(deg.to_radians())
    }

    #[inline]
    pub fn as_degrees(self) -> f64 {
        self.0.to_degrees()
    }
}

// ── Voltage and current ───────────────────────────────────────────────────────

/// Voltage magnitude in volts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Voltage(f64);

impl_quantity_ops!(Voltage, "V");

impl Voltage {
    #[inline]
    pub const fn volts(v: f64) -> Self {
        Self(v)
    }

    #[inline]
    pub fn kilovolts(kv: f64) -> Self {
        Self(kv * 1_000.0)
    }

    #[inline]
    pub fn as_volts(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn as_kilovolts(self) -> f64 {
        self.0 / 1_000.0
    }
}

/// Current magnitude in amperes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Current(f64);

impl_quantity_ops!(Current, "A");

impl Current {
    #[inline]
    pub const fn amperes(a: f64) -> Self {
        Self(a)
    }

    #[inline]
    pub fn as_amperes(self) -> f64 {
        self.0
    }
}

// ── Power ─────────────────────────────────────────────────────────────────────

/// Apparent power in volt-amperes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ApparentPower(f64);

impl_quantity_ops!(ApparentPower, "VA");

impl ApparentPower {
    #[inline]
    pub const fn volt_amperes(va: f64) -> Self {
        Self(va)
    }

    #[inline]
    pub fn kilovolt_amperes(kva: f64) -> Self {
        Self(kva * 1_000.0)
    }

    #[inline]
    pub fn as_volt_amperes(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn as_kilovolt_amperes(self) -> f64 {
        self.0 / 1_000.0
    }
}

/// Active power in watts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ActivePower(f64);

impl_quantity_ops!(ActivePower, "W");

impl ActivePower {
    #[inline]
    pub const fn watts(w: f64) -> Self {
        Self(w)
    }

    #[inline]
    pub fn kilowatts(kw: f64) -> Self {
        Self(kw * 1_000.0)
    }

    #[inline]
    pub fn as_kilowatts(self) -> f64 {
        self.0 / 1_000.0
    }

    /// Apparent power from this active power and a reactive component:
    /// `S = √(P² + Q²)`.
    #[inline]
    pub fn apparent_with(self, q: ReactivePower) -> ApparentPower {
        ApparentPower((self.0.powi(2) + q.0.powi(2)).sqrt())
    }
}

/// Reactive power in volt-amperes reactive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ReactivePower(f64);

impl_quantity_ops!(ReactivePower, "var");

impl ReactivePower {
    #[inline]
    pub const fn vars(var: f64) -> Self {
        Self(var)
    }

    #[inline]
    pub fn kilovars(kvar: f64) -> Self {
        Self(kvar * 1_000.0)
    }

    #[inline]
    pub fn as_kilovars(self) -> f64 {
        self.0 / 1_000.0
    }
}
