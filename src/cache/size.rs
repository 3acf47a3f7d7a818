//! Size Estimator Module
//!
//! Approximates the byte footprint of cached values for the memory budget.
//! The numbers are estimates used for eviction pressure, not an exact
//! accounting of heap usage.

use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

// == Size Estimate Trait ==
/// Types that can report an approximate size in bytes.
///
/// Estimation never fails: values that cannot be introspected report 0.
pub trait SizeEstimate {
    /// Returns the estimated footprint in bytes.
    fn estimated_size(&self) -> usize;
}

/// Estimates the footprint of `value` in bytes.
pub fn estimate<T: SizeEstimate + ?Sized>(value: &T) -> usize {
    value.estimated_size()
}

/// Fixed cost charged for floating point numbers.
pub const FLOAT_SIZE: usize = 8;
/// Fixed cost charged for booleans.
pub const BOOL_SIZE: usize = 4;
/// Header added on top of the magnitude bytes of an integer.
pub const INTEGER_HEADER_SIZE: usize = 8;

/// `ceil(bit_length / 8) + header` for an integer magnitude.
fn integer_size(magnitude: u128) -> usize {
    let bits = (u128::BITS - magnitude.leading_zeros()) as usize;
    bits.div_ceil(8) + INTEGER_HEADER_SIZE
}

// == Byte Buffers ==
impl SizeEstimate for [u8] {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl SizeEstimate for Vec<u8> {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> SizeEstimate for [u8; N] {
    fn estimated_size(&self) -> usize {
        N
    }
}

// == Strings ==
impl SizeEstimate for str {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl SizeEstimate for String {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl SizeEstimate for char {
    fn estimated_size(&self) -> usize {
        self.len_utf8()
    }
}

// == Scalars ==
impl SizeEstimate for f32 {
    fn estimated_size(&self) -> usize {
        FLOAT_SIZE
    }
}

impl SizeEstimate for f64 {
    fn estimated_size(&self) -> usize {
        FLOAT_SIZE
    }
}

impl SizeEstimate for bool {
    fn estimated_size(&self) -> usize {
        BOOL_SIZE
    }
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(impl SizeEstimate for $t {
            fn estimated_size(&self) -> usize {
                integer_size(*self as u128)
            }
        })*
    };
}

macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(impl SizeEstimate for $t {
            fn estimated_size(&self) -> usize {
                integer_size(self.unsigned_abs() as u128)
            }
        })*
    };
}

impl_unsigned!(u8, u16, u32, u64, u128, usize);
impl_signed!(i8, i16, i32, i64, i128, isize);

impl SizeEstimate for () {
    fn estimated_size(&self) -> usize {
        0
    }
}

// == Wrappers ==
impl<T: SizeEstimate> SizeEstimate for Option<T> {
    fn estimated_size(&self) -> usize {
        self.as_ref().map_or(0, SizeEstimate::estimated_size)
    }
}

impl<T: SizeEstimate + ?Sized> SizeEstimate for Box<T> {
    fn estimated_size(&self) -> usize {
        (**self).estimated_size()
    }
}

impl<T: SizeEstimate + ?Sized> SizeEstimate for Rc<T> {
    fn estimated_size(&self) -> usize {
        (**self).estimated_size()
    }
}

impl<T: SizeEstimate + ?Sized> SizeEstimate for Arc<T> {
    fn estimated_size(&self) -> usize {
        (**self).estimated_size()
    }
}

impl<T: SizeEstimate + ?Sized> SizeEstimate for &T {
    fn estimated_size(&self) -> usize {
        (**self).estimated_size()
    }
}

// == Structured Values ==
impl SizeEstimate for Value {
    fn estimated_size(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Bool(_) => BOOL_SIZE,
            Value::Number(_) => FLOAT_SIZE,
            Value::String(s) => s.len(),
            Value::Array(_) | Value::Object(_) => json_size(self),
        }
    }
}

/// Structured value measured by its JSON encoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Json<T>(pub T);

impl<T: Serialize> SizeEstimate for Json<T> {
    fn estimated_size(&self) -> usize {
        json_size(&self.0)
    }
}

/// Value the estimator cannot look into; always reports 0 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Opaque<T>(pub T);

impl<T> SizeEstimate for Opaque<T> {
    fn estimated_size(&self) -> usize {
        0
    }
}

/// Length of the JSON encoding, or 0 when the value does not serialize.
fn json_size<T: Serialize + ?Sized>(value: &T) -> usize {
    serde_json::to_vec(value).map_or(0, |bytes| bytes.len())
}
