// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation from the local kubeconfig

use crate::error::{F8Error, Result};
use kube::{Client, Config as KConfig};
use tracing::{debug, instrument};

/// Create a client for the current kubeconfig context (or the in-cluster
/// service account)
#[instrument]
pub async fn create_client() -> Result<Client> {
    let config = KConfig::infer()
        .await
        .map_err(|e| F8Error::KubeconfigError(format!("Failed to infer config: {}", e)))?;

    debug!(
        "Using cluster {} with default namespace {}",
        config.cluster_url, config.default_namespace
    );

    Client::try_from(config)
        .map_err(|e| F8Error::KubeconfigError(format!("Failed to create client: {}", e)))
}
