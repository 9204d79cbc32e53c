use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur while creating an atomic asset
#[derive(Error, Debug)]
pub enum AssetError {
    /// Errors that occur while fetching content from its source
    #[error("Content fetch failed: {0}")]
    Fetch(String),

    /// Errors that occur while publishing base content to the ledger
    #[error("Content publish failed: {0}")]
    Publish(String),

    /// Errors that occur while querying current contract state
    #[error("Contract state query failed: {0}")]
    StateQuery(String),

    /// Errors related to an unusable holder distribution
    #[error("Holder distribution error: {0}")]
    Distribution(String),

    /// Errors that occur while uploading the descriptor through the bundling relay
    #[error("Bundle dispatch failed: {0}")]
    Dispatch(String),

    /// Errors that occur while posting the registration transaction
    #[error("Contract registration failed: {0}")]
    Registration(String),

    /// Errors related to loading or using the signing key
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Errors related to malformed identifiers
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport-level HTTP errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// IO errors that occur when reading key or configuration files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Anyhow error wrapper for error context
    #[error(transparent)]
    Context(#[from] anyhow::Error),
}

// Additional From conversions for common error types

impl From<serde_json::Error> for AssetError {
    fn from(err: serde_json::Error) -> Self {
        AssetError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for AssetError {
    fn from(err: toml::de::Error) -> Self {
        AssetError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AssetError {
    fn from(err: reqwest::Error) -> Self {
        AssetError::Http(err.to_string())
    }
}

/// The pipeline stage at which an aborting failure occurred
///
/// Registration is deliberately absent: a registration failure never aborts
/// the pipeline (see `AssetPipeline`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Publishing the base content transaction
    ContentPublish,
    /// Building the asset descriptor from contract state
    DescriptorBuild,
    /// Uploading the descriptor through the bundling relay
    BundleDispatch,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::ContentPublish => "content publish",
            PipelineStage::DescriptorBuild => "descriptor build",
            PipelineStage::BundleDispatch => "bundle dispatch",
        };
        f.write_str(name)
    }
}

/// Composite error surfaced when the creation pipeline aborts
///
/// The per-stage cause is preserved as the error source so callers can
/// distinguish which network round trip failed.
#[derive(Error, Debug)]
#[error("Atomic asset creation failed at {stage}: {source}")]
pub struct AtomicAssetCreationError {
    /// The stage that aborted the pipeline
    pub stage: PipelineStage,
    /// The underlying stage error
    #[source]
    pub source: AssetError,
}

impl AtomicAssetCreationError {
    pub fn new(stage: PipelineStage, source: AssetError) -> Self {
        Self { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_error_preserves_stage_and_cause() {
        let err = AtomicAssetCreationError::new(
            PipelineStage::BundleDispatch,
            AssetError::Dispatch("relay unreachable".to_string()),
        );
        let msg = err.to_string();
        assert!(msg.contains("bundle dispatch"));
        assert!(matches!(err.source, AssetError::Dispatch(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "wallet.json");
        let err: AssetError = io_err.into();
        assert!(matches!(err, AssetError::Io(_)));
    }
}
