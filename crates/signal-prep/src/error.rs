//! Signal Processing Error Types

use thiserror::Error;

/// Errors during row-wise signal transforms
#[derive(Debug, Clone, Error)]
pub enum SignalError {
    /// Transform applied to a zero-length row
    #[error("Cannot transform an empty sequence")]
    EmptySequence,
}
