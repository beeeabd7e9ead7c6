//! Error types for merkle_disclosure

use thiserror::Error;

/// Main error type for tree, proof and filtered-record operations
#[derive(Error, Debug)]
pub enum DisclosureError {
    /// Malformed or out-of-range caller input
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A proof whose shape disagrees with its declared tree size or index set
    #[error("Merkle proof rebuild failed: {reason}")]
    MerkleProofRebuildFailure { reason: String },

    /// A filtered record whose fragments do not reconstruct its identifier
    #[error("Inconsistent filtered data: {reason}")]
    InconsistentFilteredData { reason: String },

    /// Configuration errors
    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Hex encoding/decoding errors
    #[error("Hex encoding error: {0}")]
    HexError(#[from] hex::FromHexError),
}

impl DisclosureError {
    /// Create a new invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a new proof rebuild failure
    pub fn rebuild_failure(reason: impl Into<String>) -> Self {
        Self::MerkleProofRebuildFailure {
            reason: reason.into(),
        }
    }

    /// Create a new inconsistent filtered data error
    pub fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentFilteredData {
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }

    /// Whether the error signals a proof or record that must not be trusted
    pub fn is_trust_failure(&self) -> bool {
        matches!(
            self,
            Self::MerkleProofRebuildFailure { .. } | Self::InconsistentFilteredData { .. }
        )
    }
}

/// Result type alias for merkle_disclosure operations
pub type Result<T> = std::result::Result<T, DisclosureError>;
