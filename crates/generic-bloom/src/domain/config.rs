//! Bloom filter configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use generic_bloom::{CanonicalEncoder, FilterConfigBuilder, HashAlgorithm};
//!
//! let config = FilterConfigBuilder::new()
//!     .false_positive_rate(0.001, 10_000)
//!     .hash(HashAlgorithm::Sha256)
//!     .build()?;
//!
//! let mut filter = config.build_filter::<str, _>(CanonicalEncoder)?;
//! filter.add("alice");
//! ```
//!
//! The same configuration as JSON:
//!
//! ```json
//! {
//!   "sizing": { "kind": "false_positive_rate", "rate": 0.001, "expected_items": 10000 },
//!   "hash": "sha256",
//!   "strategy": "generator"
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::bit_split::MAX_INDEX_BITS;
use super::bit_store::BitStore;
use super::bloom_filter::BloomFilter;
use super::generator::HashGenerator;
use super::index::index_width_for;
use super::parameters::{FilterParameters, Sizing};
use crate::adapters::{DigestPrimitive, HashCodePrimitive, KeyedPrimitive, Murmur3Primitive};
use crate::error::FilterError;
use crate::ports::{ElementEncoder, HashPrimitive, KeyedHashPrimitive};

/// Concrete hash primitive selected by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
    #[serde(rename = "sha3_256")]
    Sha3_256,
    #[serde(rename = "sha3_512")]
    Sha3_512,
    Keccak256,
    Murmur3,
    HmacSha256,
    #[default]
    HmacSha512,
    /// Runtime `Hash` trait, 32 bits. Only for small, simple filters.
    HashCode,
}

impl HashAlgorithm {
    pub fn primitive(self) -> Arc<dyn HashPrimitive> {
        match self {
            Self::Sha256 => Arc::new(DigestPrimitive::sha256()),
            Self::Sha384 => Arc::new(DigestPrimitive::sha384()),
            Self::Sha512 => Arc::new(DigestPrimitive::sha512()),
            Self::Sha3_256 => Arc::new(DigestPrimitive::sha3_256()),
            Self::Sha3_512 => Arc::new(DigestPrimitive::sha3_512()),
            Self::Keccak256 => Arc::new(DigestPrimitive::keccak256()),
            Self::Murmur3 => Arc::new(Murmur3Primitive::new()),
            Self::HmacSha256 => Arc::new(KeyedPrimitive::hmac_sha256()),
            Self::HmacSha512 => Arc::new(KeyedPrimitive::hmac_sha512()),
            Self::HashCode => Arc::new(HashCodePrimitive::new()),
        }
    }

    /// The re-keyable form, for algorithms that have one.
    pub fn keyed(self) -> Option<Arc<dyn KeyedHashPrimitive>> {
        match self {
            Self::HmacSha256 => Some(Arc::new(KeyedPrimitive::hmac_sha256())),
            Self::HmacSha512 => Some(Arc::new(KeyedPrimitive::hmac_sha512())),
            Self::Murmur3 => Some(Arc::new(Murmur3Primitive::new())),
            _ => None,
        }
    }

    /// Keyed generator where possible, fixed otherwise.
    pub fn generator(self) -> HashGenerator {
        match self.keyed() {
            Some(keyed) => HashGenerator::Keyed(keyed),
            None => HashGenerator::Fixed(self.primitive()),
        }
    }
}

/// Which index derivation a configured filter uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationStrategy {
    ExtendAndSplit,
    #[default]
    Generator,
}

/// Bloom filter configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub sizing: Sizing,
    #[serde(default)]
    pub hash: HashAlgorithm,
    #[serde(default)]
    pub strategy: DerivationStrategy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sizing: Sizing::FalsePositiveRate {
                rate: 0.01, // 1% false positive rate
                expected_items: 1000,
            },
            hash: HashAlgorithm::default(),
            strategy: DerivationStrategy::default(),
        }
    }
}

impl FilterConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FilterError::SerializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, FilterError> {
        serde_json::to_string_pretty(self).map_err(|e| FilterError::SerializationError(e.to_string()))
    }

    /// Run every construction check without allocating the bit array.
    ///
    /// Returns the planned parameters.
    pub fn validate(&self) -> Result<FilterParameters, FilterError> {
        let params = self.sizing.plan()?;
        let bit_count = BitStore::rounded_len(params.bit_count)?;

        match self.strategy {
            DerivationStrategy::ExtendAndSplit => {
                let width = index_width_for(bit_count);
                if width > MAX_INDEX_BITS {
                    return Err(FilterError::ItemTooLarge(format!(
                        "index width {width} exceeds {MAX_INDEX_BITS} bits"
                    )));
                }
                width.checked_mul(params.index_count).ok_or_else(|| {
                    FilterError::ItemTooLarge(format!(
                        "{} indexes of {width} bits overflow",
                        params.index_count
                    ))
                })?;
            }
            DerivationStrategy::Generator => {
                self.hash
                    .generator()
                    .validate(bit_count, params.index_count)?;
            }
        }

        Ok(params)
    }

    /// Build an empty filter for elements of type `T`.
    pub fn build_filter<T, E>(&self, encoder: E) -> Result<BloomFilter<T>, FilterError>
    where
        T: ?Sized + 'static,
        E: ElementEncoder<T> + 'static,
    {
        let params = self.validate()?;
        match self.strategy {
            DerivationStrategy::ExtendAndSplit => {
                BloomFilter::from_parameters(&params, &[self.hash.primitive()], encoder)
            }
            DerivationStrategy::Generator => {
                BloomFilter::from_generator(&params, &self.hash.generator(), encoder)
            }
        }
    }
}

/// Builder for FilterConfig with validation
///
/// Unset fields fall back to [`FilterConfig::default`].
///
/// # Example
///
/// ```ignore
/// let config = FilterConfigBuilder::new()
///     .memory_budget(4096, 500)
///     .hash(HashAlgorithm::Murmur3)
///     .strategy(DerivationStrategy::ExtendAndSplit)
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct FilterConfigBuilder {
    sizing: Option<Sizing>,
    hash: Option<HashAlgorithm>,
    strategy: Option<DerivationStrategy>,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size for a target false positive rate at `expected_items`.
    pub fn false_positive_rate(mut self, rate: f64, expected_items: usize) -> Self {
        self.sizing = Some(Sizing::FalsePositiveRate {
            rate,
            expected_items,
        });
        self
    }

    /// Size for a fixed memory budget in bytes.
    pub fn memory_budget(mut self, target_bytes: usize, expected_items: usize) -> Self {
        self.sizing = Some(Sizing::MemoryBudget {
            target_bytes,
            expected_items,
        });
        self
    }

    /// Use exactly `bit_count` bits and `indexes_per_item` indexes.
    pub fn explicit(mut self, bit_count: usize, indexes_per_item: usize) -> Self {
        self.sizing = Some(Sizing::Explicit {
            bit_count,
            indexes_per_item,
        });
        self
    }

    pub fn hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn strategy(mut self, strategy: DerivationStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Build the FilterConfig, validating all parameters
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> FilterConfig {
        let defaults = FilterConfig::default();

        FilterConfig {
            sizing: self.sizing.unwrap_or(defaults.sizing),
            hash: self.hash.unwrap_or(defaults.hash),
            strategy: self.strategy.unwrap_or(defaults.strategy),
        }
    }
}
