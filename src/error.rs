//! Error types for erasure coding operations

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while building the engine or processing fragments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Data/parity counts outside the supported bounds
    #[error("Invalid coding configuration: {data} data + {parity} parity fragments")]
    InvalidConfiguration { data: usize, parity: usize },

    /// Too few known fragments to reconstruct anything
    #[error("Cannot recover: {known} known fragments but {required} are required")]
    InsufficientFragments { known: usize, required: usize },

    /// A slot index beyond the engine's fragment count
    #[error("Fragment slot {slot} out of range (engine has {limit} slots)")]
    SlotOutOfRange { slot: usize, limit: usize },

    /// A required input or output buffer was not supplied
    #[error("Missing buffer for fragment slot {slot}")]
    MissingFragment { slot: usize },

    /// Buffer length differs from the operation size
    #[error("Fragment slot {slot} has {actual} bytes, expected {expected}")]
    LengthMismatch {
        slot: usize,
        expected: usize,
        actual: usize,
    },

    /// Zero-length operation
    #[error("Fragment size must be non-zero")]
    EmptyFragments,

    /// A slot was marked both erased and known-zero
    #[error("Fragment slot {slot} is both erased and declared zero")]
    ErasedZeroOverlap { slot: usize },

    /// Output buffers do not line up with the erased slots
    #[error("Expected {expected} output buffers, got {actual}")]
    OutputMismatch { expected: usize, actual: usize },

    /// A selected submatrix of the generator was singular.
    /// The generator matrix is MDS, so this is a defect in the codec itself.
    #[error("Internal error: coding submatrix is singular")]
    SingularMatrix,
}

impl CodecError {
    /// The surviving fragments do not carry enough information; retrying with the
    /// same inputs cannot succeed.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, CodecError::InsufficientFragments { .. })
    }

    /// The caller broke an operation precondition
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidConfiguration { .. }
                | CodecError::SlotOutOfRange { .. }
                | CodecError::MissingFragment { .. }
                | CodecError::LengthMismatch { .. }
                | CodecError::EmptyFragments
                | CodecError::ErasedZeroOverlap { .. }
                | CodecError::OutputMismatch { .. }
        )
    }

    /// An invariant of the codec itself was broken
    pub fn is_internal(&self) -> bool {
        matches!(self, CodecError::SingularMatrix)
    }
}
