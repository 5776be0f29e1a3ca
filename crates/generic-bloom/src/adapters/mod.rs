//! Adapters Layer (Driven Adapters)
//!
//! Contains implementations of the driven ports: hash primitives and
//! element encoders.
//!
//! ## Adapters
//!
//! - `DigestPrimitive` - SHA-2 / SHA-3 / Keccak digests
//! - `KeyedPrimitive` - HMAC, re-keyable for the generator strategy
//! - `Murmur3Primitive` - seedable non-cryptographic hash
//! - `HashCodePrimitive` - 32-bit fallback over the runtime `Hash` trait
//! - `CanonicalEncoder`, `BincodeEncoder`, `EncodeFn` - element encoders

pub mod encoding;
pub mod hash_primitives;

pub use encoding::{BincodeEncoder, CanonicalBytes, CanonicalEncoder, EncodeFn};
pub use hash_primitives::{DigestPrimitive, HashCodePrimitive, KeyedPrimitive, Murmur3Primitive};
