//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - The packed bit store
//! - Bit-stream slicing for both derivation strategies
//! - Extend-and-split and generator index derivation
//! - Parameter planning
//! - The typed and type-erased Bloom filters
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Hash primitives and element encoders only through the outbound ports

pub mod bit_split;
pub mod bit_store;
pub mod bloom_filter;
pub mod config;
pub mod erased;
pub mod extend_split;
pub mod generator;
pub mod index;
pub mod parameters;

pub use bit_split::{split_lsb_first, split_msb_first, MAX_INDEX_BITS};
pub use bit_store::BitStore;
pub use bloom_filter::BloomFilter;
pub use config::{DerivationStrategy, FilterConfig, FilterConfigBuilder, HashAlgorithm};
pub use erased::{ElementType, ErasedBloomFilter};
pub use extend_split::{extend_list, ExtendAndSplit};
pub use generator::{GeneratedIndexes, HashGenerator, PARALLEL_THRESHOLD};
pub use index::IndexFunction;
pub use parameters::{
    calculate_fpr, from_false_positive_rate, from_memory_budget, FilterParameters, Sizing,
    MAX_MEMORY_BYTES,
};
