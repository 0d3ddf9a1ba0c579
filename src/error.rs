// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheironError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to serialize registry credentials: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unsupported reconciliation mode: {0}")]
    UnsupportedMode(String),

    #[error("Resource has no namespace: {0}")]
    MissingNamespace(String),

    #[error("Resource has no uid: {0}")]
    MissingUid(String),

    #[error("Secret {0} is already controlled by another owner")]
    AlreadyOwned(String),
}

impl CheironError {
    /// Only API failures are transient. Everything else is a configuration
    /// problem that will not fix itself until the declaration changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheironError::KubeError(_))
    }
}

pub type Result<T> = std::result::Result<T, CheironError>;
