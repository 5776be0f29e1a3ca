//! Outbound Ports (Driven Ports)
//!
//! These traits describe the collaborators the filter depends on but never
//! implements itself: hash primitives with a known output width, and an
//! encoder that turns an element into a deterministic byte sequence.

use std::fmt;

/// A byte-sequence-to-bits hashing capability.
///
/// `output_bits` is the number of meaningful bits in every `compute` result.
/// A width of zero is allowed; such a primitive contributes nothing when it
/// is combined with others.
pub trait HashPrimitive: fmt::Debug + Send + Sync {
    /// Short human-readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Bits produced by a single invocation.
    fn output_bits(&self) -> usize;

    /// Hash `data`. The result holds `output_bits() / 8` bytes.
    fn compute(&self, data: &[u8]) -> Vec<u8>;
}

/// A hash primitive that can be re-keyed to produce independent outputs.
///
/// Each key selects a different member of the hash family, so a single
/// primitive can supply an unbounded number of bits by varying the key.
pub trait KeyedHashPrimitive: HashPrimitive {
    /// Hash `data` under `key`. The result holds `output_bits() / 8` bytes.
    fn compute_keyed(&self, key: &[u8], data: &[u8]) -> Vec<u8>;
}

/// Serializes an element to bytes before hashing.
///
/// Encoding MUST be deterministic: equal elements produce equal bytes on
/// every call. The no-false-negative guarantee depends on it.
pub trait ElementEncoder<T: ?Sized>: Send + Sync {
    fn encode(&self, item: &T) -> Vec<u8>;
}
