// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Delete and recreate a persistent volume claim, then restart the pods
//! that used it so they attach to the new claim.
//!
//! Steps run strictly in order:
//!
//! 1. find the attached pods (read-only, retried)
//! 2. export the claim manifest (read-only, retried) and sanitize it
//! 3. delete the claim and wait until it is gone, then create it from the
//!    sanitized manifest
//! 4. delete every attached pod, continuing past failures
//!
//! Nothing is mutated before step 3. Step 3 is not atomic and never
//! retried: if creation fails after the delete went through, the claim is
//! gone and [`F8Error::CreateError`] says so. A claim that never goes away
//! (held by a finalizer) is a [`F8Error::DeleteError`] instead.

use crate::error::{F8Error, GatewayError, Result};
use crate::kubernetes::gateway::ClusterGateway;
use crate::retry::{retry_after, MultiError, RetryPolicy};
use crate::volumes::discovery::find_attached_pods;
use crate::volumes::manifest::ManifestDocument;
use crate::volumes::VolumeClaimRef;
use tracing::{error, info, instrument, warn};

/// Input of [`recreate_volume`]
#[derive(Debug, Clone, Default)]
pub struct RecreateRequest {
    pub claim_name: String,
    /// Falls back to the current context's namespace
    pub namespace: Option<String>,
}

/// Non-fatal findings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecreateWarning {
    /// No pod references the claim, so nothing was restarted
    NoPodsFound,
}

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecreateReport {
    pub claim: VolumeClaimRef,
    pub attached_pods: Vec<String>,
    pub evicted_pods: Vec<String>,
    pub warnings: Vec<RecreateWarning>,
}

/// Resolve the claim reference, without touching the cluster when the
/// claim name is missing
async fn resolve_claim<G: ClusterGateway + ?Sized>(
    gateway: &G,
    request: &RecreateRequest,
) -> Result<VolumeClaimRef> {
    let name = request.claim_name.trim();
    if name.is_empty() {
        return Err(F8Error::InputError(
            "a persistent volume claim name is required".to_string(),
        ));
    }

    let namespace = match request.namespace.as_deref().map(str::trim) {
        Some(ns) if !ns.is_empty() => ns.to_string(),
        _ => gateway.current_namespace().await?,
    };

    Ok(VolumeClaimRef::new(namespace, name))
}

/// Fetch the claim manifest and strip what must not be sent back on create
async fn export_manifest<G: ClusterGateway + ?Sized>(
    gateway: &G,
    claim: &VolumeClaimRef,
    retry: RetryPolicy,
) -> Result<ManifestDocument> {
    let text = retry_after(retry.attempts, retry.delay, || gateway.get_manifest(claim))
        .await
        .map_err(F8Error::ExportError)?;

    let exported = ManifestDocument::parse(&text);
    if exported.is_blank() {
        return Err(F8Error::ManifestEmpty(claim.clone()));
    }

    let sanitized = exported.sanitized();
    info!(
        "Exported claim {} ({} of {} manifest lines kept)",
        claim,
        sanitized.lines().len(),
        exported.lines().len()
    );
    Ok(sanitized)
}

/// Delete each pod in turn; one failure does not stop the rest
async fn evict_pods<G: ClusterGateway + ?Sized>(
    gateway: &G,
    claim: &VolumeClaimRef,
    pods: &[String],
) -> std::result::Result<Vec<String>, (Vec<String>, MultiError<GatewayError>)> {
    let mut evicted = Vec::with_capacity(pods.len());
    let mut failures = MultiError::new();

    for pod in pods {
        match gateway.delete_pod(&claim.namespace, pod).await {
            Ok(()) => {
                info!("Pod {} attached to {} has been deleted", pod, claim.name);
                evicted.push(pod.clone());
            }
            Err(e) => {
                error!("Failed to delete pod {}: {}", pod, e);
                failures.push(e);
            }
        }
    }

    match failures.into_result() {
        Ok(()) => Ok(evicted),
        Err(failures) => Err((evicted, failures)),
    }
}

/// Recreate a persistent volume claim and restart the pods attached to it.
#[instrument(skip(gateway, retry), fields(claim = %request.claim_name))]
pub async fn recreate_volume<G: ClusterGateway + ?Sized>(
    gateway: &G,
    request: &RecreateRequest,
    retry: RetryPolicy,
) -> Result<RecreateReport> {
    let claim = resolve_claim(gateway, request).await?;
    let mut warnings = Vec::new();

    let attached_pods = find_attached_pods(gateway, &claim, retry).await?;
    if attached_pods.is_empty() {
        warn!("No pods reference claim {}, no pod will be restarted", claim);
        warnings.push(RecreateWarning::NoPodsFound);
    }

    let manifest = export_manifest(gateway, &claim, retry).await?;

    gateway
        .delete_claim(&claim)
        .await
        .map_err(|source| F8Error::DeleteError {
            claim: claim.clone(),
            source,
        })?;
    info!("Deleted claim {}", claim);

    if let Err(source) = gateway
        .create_resource(&claim.namespace, &manifest.to_text())
        .await
    {
        error!(
            "Claim {} was deleted but recreating it failed, it must be restored by hand",
            claim
        );
        return Err(F8Error::CreateError { claim, source });
    }
    info!("Recreated claim {}", claim);

    let evicted_pods = evict_pods(gateway, &claim, &attached_pods)
        .await
        .map_err(|(evicted, failures)| F8Error::PodEvictionError { evicted, failures })?;

    info!("Volume {} has been recreated", claim.name);
    Ok(RecreateReport {
        claim,
        attached_pods,
        evicted_pods,
        warnings,
    })
}
