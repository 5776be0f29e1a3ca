//! Index functions: element -> ordered sequence of k bit indexes

/// Maps an element to the bit positions it occupies in a filter.
///
/// Must be pure: the same element always yields the same sequence. Emitted
/// values may exceed the filter length; the filter reduces them modulo its
/// bit count.
pub trait IndexFunction<T: ?Sized>: Send + Sync {
    fn indexes(&self, item: &T) -> Vec<u32>;
}

impl<T: ?Sized, F> IndexFunction<T> for F
where
    F: Fn(&T) -> Vec<u32> + Send + Sync,
{
    fn indexes(&self, item: &T) -> Vec<u32> {
        self(item)
    }
}

/// Index width for a filter of `bit_count` bits: the bit length of the
/// count, so 8 bits use 4-bit indexes and 1024 bits use 11-bit indexes.
pub fn index_width_for(bit_count: usize) -> usize {
    (usize::BITS - bit_count.leading_zeros()) as usize
}
