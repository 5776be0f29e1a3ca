//! Element encoders
//!
//! Implementations of [`ElementEncoder`]. Callers pick the encoder that is
//! canonical for their element type:
//!
//! - `CanonicalEncoder` - fixed little-endian layout for primitives, strings
//!   and byte buffers (see [`CanonicalBytes`])
//! - `BincodeEncoder` - any `serde::Serialize` type, via bincode
//! - `EncodeFn` - an arbitrary closure

use std::borrow::Cow;

use serde::Serialize;
use tracing::warn;

use crate::error::FilterError;
use crate::ports::ElementEncoder;

/// Types with a single, stable byte representation.
pub trait CanonicalBytes {
    fn canonical_bytes(&self) -> Cow<'_, [u8]>;
}

macro_rules! impl_canonical_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CanonicalBytes for $ty {
                fn canonical_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_le_bytes().to_vec())
                }
            }
        )*
    };
}

impl_canonical_le!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl CanonicalBytes for usize {
    // Widened so the encoding does not depend on the target's pointer width.
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned((*self as u64).to_le_bytes().to_vec())
    }
}

impl CanonicalBytes for isize {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned((*self as i64).to_le_bytes().to_vec())
    }
}

impl CanonicalBytes for f32 {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.to_bits().to_le_bytes().to_vec())
    }
}

impl CanonicalBytes for f64 {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.to_bits().to_le_bytes().to_vec())
    }
}

impl CanonicalBytes for bool {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(vec![u8::from(*self)])
    }
}

impl CanonicalBytes for char {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        let mut buf = [0u8; 4];
        Cow::Owned(self.encode_utf8(&mut buf).as_bytes().to_vec())
    }
}

impl CanonicalBytes for str {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl CanonicalBytes for String {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl CanonicalBytes for [u8] {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl CanonicalBytes for Vec<u8> {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl<const N: usize> CanonicalBytes for [u8; N] {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl<T: CanonicalBytes + ?Sized> CanonicalBytes for &T {
    fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        (**self).canonical_bytes()
    }
}

/// Encodes any [`CanonicalBytes`] element.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalEncoder;

impl<T: CanonicalBytes + ?Sized> ElementEncoder<T> for CanonicalEncoder {
    fn encode(&self, item: &T) -> Vec<u8> {
        item.canonical_bytes().into_owned()
    }
}

/// Encodes any serde-serializable element with bincode.
///
/// A value bincode cannot serialize encodes as an empty buffer and the
/// failure is logged. Every such value maps to the same indexes, so they
/// are indistinguishable to the filter and raise its false positive rate.
/// Screen elements with [`BincodeEncoder::try_encode`] when that matters.
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeEncoder;

impl BincodeEncoder {
    /// Serialize `item`, reporting failure instead of hashing empty bytes.
    pub fn try_encode<T: Serialize + ?Sized>(&self, item: &T) -> Result<Vec<u8>, FilterError> {
        bincode::serialize(item).map_err(|e| FilterError::SerializationError(e.to_string()))
    }
}

impl<T: Serialize + ?Sized> ElementEncoder<T> for BincodeEncoder {
    fn encode(&self, item: &T) -> Vec<u8> {
        self.try_encode(item).unwrap_or_else(|e| {
            warn!(error = %e, "Element could not be serialized, hashing empty bytes");
            Vec::new()
        })
    }
}

/// Adapts a closure into an [`ElementEncoder`].
#[derive(Clone, Copy, Debug)]
pub struct EncodeFn<F>(pub F);

impl<T: ?Sized, F> ElementEncoder<T> for EncodeFn<F>
where
    F: Fn(&T) -> Vec<u8> + Send + Sync,
{
    fn encode(&self, item: &T) -> Vec<u8> {
        (self.0)(item)
    }
}
