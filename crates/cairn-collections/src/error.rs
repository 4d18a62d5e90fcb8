//! Error types shared across the collection implementations
//!
//! Absence is never an error here: lookups return `Option`. These variants
//! cover contract violations only, and every positional operation surfaces
//! the same error kind rather than clamping or swallowing bad input.

use thiserror::Error;

/// Errors raised by positional and capacity-bounded operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Positional index past the end of the sequence
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
    /// Range with `from > to` or `to` past the end of the sequence
    #[error("invalid range {from}..{to} for length {len}")]
    InvalidRange { from: usize, to: usize, len: usize },
    /// More entries than a fixed-capacity map can hold
    #[error("{requested} entries exceed fixed capacity {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },
}
