//! Element types supported by the solvers.

use num_complex::{Complex32, Complex64};
use num_traits::{Float, One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// The fixed set of numeric kinds a matrix buffer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    F32,
    F64,
    C32,
    C64,
}

impl ElementType {
    pub fn is_complex(self) -> bool {
        matches!(self, ElementType::C32 | ElementType::C64)
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::C32 => "c32",
            ElementType::C64 => "c64",
        };
        f.write_str(name)
    }
}

/// Field arithmetic plus the handful of operations factorization kernels need.
///
/// For real types `conj` is the identity and `modulus` is `abs`.
pub trait Scalar:
    Copy
    + Debug
    + Default
    + PartialEq
    + Send
    + Sync
    + 'static
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// The underlying real type (`f32` for `f32` and `Complex32`, ...).
    type Real: Float + Debug + Send + Sync + 'static;

    const ELEMENT_TYPE: ElementType;

    fn conj(self) -> Self;

    /// Absolute value (complex modulus for complex types).
    fn modulus(self) -> Self::Real;

    fn real(self) -> Self::Real;

    fn from_real(re: Self::Real) -> Self;

    /// False if any component is NaN or infinite.
    fn is_finite(self) -> bool;
}

macro_rules! impl_real_scalar {
    ($ty:ty, $tag:expr) => {
        impl Scalar for $ty {
            type Real = $ty;

            const ELEMENT_TYPE: ElementType = $tag;

            #[inline(always)]
            fn conj(self) -> Self {
                self
            }

            #[inline(always)]
            fn modulus(self) -> Self::Real {
                self.abs()
            }

            #[inline(always)]
            fn real(self) -> Self::Real {
                self
            }

            #[inline(always)]
            fn from_real(re: Self::Real) -> Self {
                re
            }

            #[inline(always)]
            fn is_finite(self) -> bool {
                <$ty>::is_finite(self)
            }
        }
    };
}

macro_rules! impl_complex_scalar {
    ($ty:ty, $real:ty, $tag:expr) => {
        impl Scalar for $ty {
            type Real = $real;

            const ELEMENT_TYPE: ElementType = $tag;

            #[inline(always)]
            fn conj(self) -> Self {
                <$ty>::new(self.re, -self.im)
            }

            #[inline(always)]
            fn modulus(self) -> Self::Real {
                self.re.hypot(self.im)
            }

            #[inline(always)]
            fn real(self) -> Self::Real {
                self.re
            }

            #[inline(always)]
            fn from_real(re: Self::Real) -> Self {
                <$ty>::new(re, 0.0)
            }

            #[inline(always)]
            fn is_finite(self) -> bool {
                self.re.is_finite() && self.im.is_finite()
            }
        }
    };
}

impl_real_scalar!(f32, ElementType::F32);
impl_real_scalar!(f64, ElementType::F64);
impl_complex_scalar!(Complex32, f32, ElementType::C32);
impl_complex_scalar!(Complex64, f64, ElementType::C64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_scalar_ops() {
        assert_eq!(Scalar::conj(-2.5f64), -2.5);
        assert_eq!((-2.5f32).modulus(), 2.5);
        assert!(!Scalar::is_finite(f64::NAN));
        assert_eq!(<f64 as Scalar>::ELEMENT_TYPE, ElementType::F64);
    }

    #[test]
    fn test_complex_scalar_ops() {
        let z = Complex64::new(3.0, -4.0);
        assert_eq!(Scalar::conj(z), Complex64::new(3.0, 4.0));
        assert_eq!(z.modulus(), 5.0);
        assert_eq!(Scalar::real(z), 3.0);
        assert_eq!(<Complex64 as Scalar>::from_real(2.0), Complex64::new(2.0, 0.0));
        assert!(!Scalar::is_finite(Complex32::new(1.0, f32::INFINITY)));
        assert!(<Complex32 as Scalar>::ELEMENT_TYPE.is_complex());
    }

    #[test]
    fn test_element_type_display() {
        assert_eq!(ElementType::C64.to_string(), "c64");
        assert!(!ElementType::F32.is_complex());
    }
}
