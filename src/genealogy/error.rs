//! Error types for family tree generation.

use thiserror::Error;

use super::PersonId;

/// Errors raised while loading demographic data or growing a tree.
#[derive(Debug, Error)]
pub enum GenealogyError {
    /// A decade, gender pool or name table lookup had no data.
    #[error("Missing demographic data: {0}")]
    MissingData(String),

    /// The dataset is present but malformed.
    #[error("Invalid demographic data: {0}")]
    InvalidData(String),

    /// Tree configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `build` was called on a tree that is already built.
    #[error("Family tree has already been built")]
    AlreadyBuilt,

    /// An earlier build failed and left a partial population.
    #[error("Family tree build failed earlier and cannot be resumed")]
    BuildFailed,

    /// A person already has a different partner.
    #[error("{0} already has a partner")]
    AlreadyPartnered(PersonId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenealogyError {
    /// Creates a missing-data error.
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingData(msg.into())
    }

    /// Creates an invalid-data error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, GenealogyError>;
