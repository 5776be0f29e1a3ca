//! Optimal Bloom filter parameter planning
//!
//! Formulas:
//! - m = -n*ln(fpr) / (ln(2)^2)  -- optimal bits
//! - k = (m/n) * ln(2)           -- optimal hash functions
//!
//! `k` is always rounded up. Both rounding directions are valid
//! approximations of the optimum; ceiling is used on every path so a filter
//! planned from a rate and one planned from the equivalent byte budget agree.

use std::f64::consts::LN_2;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Largest memory budget accepted, in bytes. The bit count must fit a signed
/// 32-bit integer.
pub const MAX_MEMORY_BYTES: usize = i32::MAX as usize / 8;

/// Planned filter parameters
#[derive(Clone, Debug, PartialEq)]
pub struct FilterParameters {
    /// Number of bits in the filter (m)
    pub bit_count: usize,
    /// Indexes derived per item (k)
    pub index_count: usize,
    /// False positive rate once the expected item count is reached.
    /// `None` when the parameters were given explicitly.
    pub expected_fpr: Option<f64>,
}

/// How a filter's `(m, k)` pair is chosen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sizing {
    Explicit {
        bit_count: usize,
        indexes_per_item: usize,
    },
    MemoryBudget {
        target_bytes: usize,
        expected_items: usize,
    },
    FalsePositiveRate {
        rate: f64,
        expected_items: usize,
    },
}

impl Sizing {
    /// Run the planner for this sizing.
    pub fn plan(&self) -> Result<FilterParameters, FilterError> {
        match *self {
            Sizing::Explicit {
                bit_count,
                indexes_per_item,
            } => {
                if bit_count == 0 {
                    return Err(FilterError::invalid_argument(
                        "bit_count",
                        "must be greater than zero",
                    ));
                }
                if indexes_per_item == 0 {
                    return Err(FilterError::invalid_argument(
                        "indexes_per_item",
                        "must be greater than zero",
                    ));
                }
                Ok(FilterParameters {
                    bit_count,
                    index_count: indexes_per_item,
                    expected_fpr: None,
                })
            }
            Sizing::MemoryBudget {
                target_bytes,
                expected_items,
            } => from_memory_budget(target_bytes, expected_items),
            Sizing::FalsePositiveRate {
                rate,
                expected_items,
            } => from_false_positive_rate(rate, expected_items),
        }
    }
}

fn validate_item_count(expected_items: usize) -> Result<(), FilterError> {
    if expected_items == 0 {
        return Err(FilterError::invalid_argument(
            "expected_items",
            "must be at least 1",
        ));
    }
    Ok(())
}

/// Plan `(m, k)` for a fixed memory budget.
///
/// `m = target_bytes * 8` and `k = ceil(m / n * ln 2)`.
pub fn from_memory_budget(
    target_bytes: usize,
    expected_items: usize,
) -> Result<FilterParameters, FilterError> {
    if !(1..=MAX_MEMORY_BYTES).contains(&target_bytes) {
        return Err(FilterError::invalid_argument(
            "target_bytes",
            format!("must be within 1..={MAX_MEMORY_BYTES}"),
        ));
    }
    validate_item_count(expected_items)?;

    let bit_count = target_bytes * 8;
    let bits_per_item = bit_count as f64 / expected_items as f64;
    let index_count = ((bits_per_item * LN_2).ceil() as usize).max(1);

    Ok(FilterParameters {
        bit_count,
        index_count,
        expected_fpr: Some(calculate_fpr(bit_count, expected_items, index_count)),
    })
}

/// Plan `(m, k)` for a target false positive rate.
///
/// The optimal bit count is rounded up to whole bytes and clamped to
/// [`MAX_MEMORY_BYTES`], then planned as a memory budget.
pub fn from_false_positive_rate(
    target_rate: f64,
    expected_items: usize,
) -> Result<FilterParameters, FilterError> {
    // NaN fails both comparisons
    if !(target_rate > 0.0 && target_rate < 1.0) {
        return Err(FilterError::invalid_argument(
            "target_rate",
            "must be strictly between 0 and 1",
        ));
    }
    validate_item_count(expected_items)?;

    let bits = minimum_bits(expected_items, target_rate);
    let bytes = (bits / 8.0).ceil();
    let target_bytes = if bytes >= MAX_MEMORY_BYTES as f64 {
        MAX_MEMORY_BYTES
    } else {
        (bytes as usize).max(1)
    };

    from_memory_budget(target_bytes, expected_items)
}

/// Calculate the false positive rate for given parameters
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k.min(i32::MAX as usize) as i32)
}

/// Minimum m for given n and target FPR, before rounding.
fn minimum_bits(n: usize, target_fpr: f64) -> f64 {
    let ln2_squared = LN_2 * LN_2;
    (-(n as f64) * target_fpr.ln() / ln2_squared).ceil()
}
