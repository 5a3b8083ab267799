//! Error taxonomy for the batch renderer and its collaborators.
//!
//! Every variant is surfaced synchronously at the offending call and is meant
//! to be treated as a usage or configuration bug, not a runtime condition to
//! degrade from. Nothing is retried internally; a failed call leaves the
//! batch's buffers unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A call violated the begin/started/end state machine (double begin,
    /// draw/flush/end before begin, double set/unset on a render target).
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A single shape's requirement exceeds the pool's total capacity.
    ///
    /// Unrecoverable for that call: the shape can never fit, even after a
    /// flush. No submission is performed.
    #[error("shape requires {needed} {kind}, pool capacity is {capacity}")]
    Capacity {
        needed: usize,
        capacity: usize,
        kind: &'static str,
    },

    /// Input geometry that cannot be tessellated (zero-length line, polygon
    /// with too few points, malformed triangulation).
    #[error("degenerate input: {0}")]
    DegenerateInput(&'static str),

    /// Invalid construction arguments.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Shading or draw submission failure propagated from the backend.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
