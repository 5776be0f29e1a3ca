//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - membership API for callers
//! - Driven Ports (outbound) - hash primitives and element encoders

pub mod inbound;
pub mod outbound;

pub use inbound::{ErasedSet, ProbabilisticSet};
pub use outbound::{ElementEncoder, HashPrimitive, KeyedHashPrimitive};
