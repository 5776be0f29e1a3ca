//! Type-erased Bloom filter
//!
//! Wraps a typed filter behind `&dyn Any` so heterogeneous filters can share
//! one container. The element type is captured once, when the filter is
//! wrapped; every call checks the value against it and a mismatch is
//! rejected without touching the bit store.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use tracing::warn;

use super::bloom_filter::BloomFilter;
use crate::error::FilterError;
use crate::ports::ErasedSet;

/// Runtime descriptor of a filter's element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementType {
    id: TypeId,
    name: &'static str,
}

impl ElementType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True if `value` is exactly of this type.
    pub fn matches(&self, value: &dyn Any) -> bool {
        value.type_id() == self.id
    }
}

impl<T: Any> ErasedSet for BloomFilter<T> {
    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn bits_set(&self) -> usize {
        BloomFilter::bits_set(self)
    }

    fn add_any(&mut self, item: &dyn Any) -> Result<(), FilterError> {
        let item = self.downcast(item)?;
        self.add(item);
        Ok(())
    }

    fn probably_contains_any(&self, item: &dyn Any) -> Result<bool, FilterError> {
        let item = self.downcast(item)?;
        Ok(self.probably_contains(item))
    }
}

impl<T: Any> BloomFilter<T> {
    fn downcast<'a>(&self, item: &'a dyn Any) -> Result<&'a T, FilterError> {
        item.downcast_ref::<T>().ok_or_else(|| {
            self.metrics().record_rejected();
            warn!(expected = type_name::<T>(), "Rejected value of the wrong element type");
            FilterError::InvalidElementType {
                expected: type_name::<T>(),
            }
        })
    }
}

/// A Bloom filter accepting values of any type at the call site.
///
/// Only values of the wrapped filter's element type are accepted; anything
/// else fails with [`FilterError::InvalidElementType`].
pub struct ErasedBloomFilter {
    element: ElementType,
    inner: Box<dyn ErasedSet>,
}

impl ErasedBloomFilter {
    pub fn new<T: Any>(filter: BloomFilter<T>) -> Self {
        Self {
            element: ElementType::of::<T>(),
            inner: Box::new(filter),
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.element
    }

    /// True if `item` would be accepted.
    pub fn accepts(&self, item: &dyn Any) -> bool {
        self.element.matches(item)
    }

    pub fn add(&mut self, item: &dyn Any) -> Result<(), FilterError> {
        self.inner.add_any(item)
    }

    pub fn probably_contains(&self, item: &dyn Any) -> Result<bool, FilterError> {
        self.inner.probably_contains_any(item)
    }

    pub fn bits_set(&self) -> usize {
        self.inner.bits_set()
    }
}

impl<T: Any> From<BloomFilter<T>> for ErasedBloomFilter {
    fn from(filter: BloomFilter<T>) -> Self {
        Self::new(filter)
    }
}

impl fmt::Debug for ErasedBloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedBloomFilter")
            .field("element", &self.element.name())
            .field("bits_set", &self.inner.bits_set())
            .finish()
    }
}
