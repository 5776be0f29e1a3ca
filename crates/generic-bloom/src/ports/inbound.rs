//! Inbound Ports (Driving Ports)
//!
//! The membership API that callers use, in a typed and a type-erased form.

use std::any::Any;

use crate::error::FilterError;

/// Typed probabilistic set membership.
///
/// False positives are possible, false negatives are not: once `add(x)`
/// returns, `probably_contains(x)` returns true for the lifetime of the set.
pub trait ProbabilisticSet<T: ?Sized> {
    /// Adds an item. Adding the same item again changes nothing.
    fn add(&mut self, item: &T);

    /// Returns false only if the item was definitely never added.
    fn probably_contains(&self, item: &T) -> bool;
}

/// Object-safe membership API over values of unknown static type.
///
/// Implementations reject values that are not of their element type with
/// [`FilterError::InvalidElementType`] and leave their state untouched.
pub trait ErasedSet: Send + Sync {
    /// Name of the element type this set accepts.
    fn element_type_name(&self) -> &'static str;

    /// Number of bits currently set.
    fn bits_set(&self) -> usize;

    fn add_any(&mut self, item: &dyn Any) -> Result<(), FilterError>;

    fn probably_contains_any(&self, item: &dyn Any) -> Result<bool, FilterError>;
}
