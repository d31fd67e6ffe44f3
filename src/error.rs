// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::retry::MultiError;
use crate::volumes::VolumeClaimRef;
use thiserror::Error;

/// A failed call against the cluster, with the command or API operation
/// that was attempted and whatever it printed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{operation}' failed: {output}")]
pub struct GatewayError {
    pub operation: String,
    pub output: String,
}

impl GatewayError {
    pub fn new(operation: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            output: output.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum F8Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid input: {0}")]
    InputError(String),

    #[error("Failed to discover pods attached to the claim:\n{0}")]
    DiscoveryError(MultiError<GatewayError>),

    #[error("Failed to export the claim manifest:\n{0}")]
    ExportError(MultiError<GatewayError>),

    #[error("Exported manifest for claim {0} is empty")]
    ManifestEmpty(VolumeClaimRef),

    #[error("Failed to delete claim {claim}: {source}")]
    DeleteError {
        claim: VolumeClaimRef,
        source: GatewayError,
    },

    #[error(
        "Claim {claim} was deleted but could not be recreated, it no longer exists \
         and needs manual intervention: {source}"
    )]
    CreateError {
        claim: VolumeClaimRef,
        source: GatewayError,
    },

    #[error(
        "Failed to delete {} attached pod(s) (deleted: [{}]):\n{}",
        .failures.len(),
        .evicted.join(", "),
        .failures
    )]
    PodEvictionError {
        evicted: Vec<String>,
        failures: MultiError<GatewayError>,
    },

    #[error("Service {namespace}/{name} not found")]
    ServiceNotFound { namespace: String, name: String },

    #[error("Service {namespace}/{name} has no exposed URL")]
    ServiceNotExposed { namespace: String, name: String },

    #[error("Service {namespace}/{name} did not become ready:\n{failures}")]
    ServiceNotReady {
        namespace: String,
        name: String,
        failures: MultiError<String>,
    },
}

impl F8Error {
    /// True when the failure left the cluster worse off than before the
    /// command started.
    pub fn is_unsafe(&self) -> bool {
        matches!(self, F8Error::CreateError { .. })
    }
}

pub type Result<T> = std::result::Result<T, F8Error>;
