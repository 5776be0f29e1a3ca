//! # Generic Bloom
//!
//! Bloom filters over arbitrary element types, with pluggable hash
//! primitives and two strategies for deriving bit indexes from them.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `BloomFilter<T>`: Typed probabilistic set
//!   - `ErasedBloomFilter`: Same filter behind `&dyn Any`
//!   - `ExtendAndSplit`: Repeats and reseeds a primitive list, slices LSB-first
//!   - `HashGenerator`: One primitive, keyed fan-out, slices MSB-first
//!   - `Sizing` / `FilterParameters`: Planning from a byte budget or a rate
//!   - `FilterConfig` / `FilterConfigBuilder`: Serializable configuration
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `ProbabilisticSet`, `ErasedSet`: Driving ports (membership API)
//!   - `HashPrimitive`, `KeyedHashPrimitive`, `ElementEncoder`: Driven ports
//!
//! - **Adapters Layer** (`adapters/`): SHA-2, SHA-3, Keccak, HMAC,
//!   MurmurHash3 and SipHash-backed primitives; canonical and bincode encoders
//!
//! ## Invariants
//!
//! - No false negatives: once added, an element is always reported present
//! - Expected FPR = (1 - e^(-kn/m))^k
//! - Bits are never cleared; sizes are fixed at construction
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use generic_bloom::{BloomFilter, CanonicalEncoder, DigestPrimitive, HashPrimitive};
//!
//! let primitives: Vec<Arc<dyn HashPrimitive>> = vec![Arc::new(DigestPrimitive::sha256())];
//! let mut filter =
//!     BloomFilter::<str>::with_false_positive_rate(0.01, 1000, &primitives, CanonicalEncoder)?;
//!
//! filter.add("alice");
//! assert!(filter.probably_contains("alice"));
//! ```
//!
//! ## Concurrency
//!
//! Filters are not synchronized. `add` takes `&mut self`; shared lookups
//! are safe. The only internal parallelism is the keyed generator fan-out.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;

// Re-exports for convenience
pub use adapters::{
    BincodeEncoder, CanonicalBytes, CanonicalEncoder, DigestPrimitive, EncodeFn,
    HashCodePrimitive, KeyedPrimitive, Murmur3Primitive,
};
pub use domain::{
    BloomFilter, DerivationStrategy, ElementType, ErasedBloomFilter, ExtendAndSplit,
    FilterConfig, FilterConfigBuilder, FilterParameters, HashAlgorithm, HashGenerator,
    IndexFunction, Sizing,
};
pub use error::FilterError;
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{ElementEncoder, ErasedSet, HashPrimitive, KeyedHashPrimitive, ProbabilisticSet};
