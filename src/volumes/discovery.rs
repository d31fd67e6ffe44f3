// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Finding the pods that must be restarted when a claim is recreated.

use crate::constants::labels;
use crate::error::{F8Error, Result};
use crate::kubernetes::gateway::{ClusterGateway, PodInfo};
use crate::retry::{retry_after, RetryPolicy};
use crate::volumes::VolumeClaimRef;
use tracing::{debug, info, instrument};

/// Append the names not already present, keeping order
fn union_into(target: &mut Vec<String>, names: impl IntoIterator<Item = String>) {
    for name in names {
        if !target.contains(&name) {
            target.push(name);
        }
    }
}

async fn list_pods<G: ClusterGateway + ?Sized>(
    gateway: &G,
    namespace: &str,
    selector: Option<&str>,
    retry: RetryPolicy,
) -> Result<Vec<PodInfo>> {
    retry_after(retry.attempts, retry.delay, || gateway.list_pods(namespace, selector))
        .await
        .map_err(F8Error::DiscoveryError)
}

/// Pods attached to `claim`: those mounting it, plus every pod sharing a
/// `service` label value with one of them.
///
/// The label expansion is a single pass over the pods that mount the claim.
/// Pods picked up through a label are not expanded again, so a chain of
/// services sharing pods is only followed one step.
#[instrument(skip(gateway, retry), fields(claim = %claim))]
pub async fn find_attached_pods<G: ClusterGateway + ?Sized>(
    gateway: &G,
    claim: &VolumeClaimRef,
    retry: RetryPolicy,
) -> Result<Vec<String>> {
    let pods = list_pods(gateway, &claim.namespace, None, retry).await?;
    let mounting: Vec<&PodInfo> = pods.iter().filter(|p| p.has_volume(&claim.name)).collect();
    let mut attached: Vec<String> = mounting.iter().map(|p| p.name.clone()).collect();

    debug!("{} pod(s) mount claim {}", attached.len(), claim);

    for pod in mounting {
        let service = pod.label(labels::SERVICE).unwrap_or_default();
        if service.is_empty() {
            continue;
        }

        let selector = format!("{}={}", labels::SERVICE, service);
        let members = list_pods(gateway, &claim.namespace, Some(&selector), retry).await?;
        debug!(
            "Service {} of pod {} has {} pod(s)",
            service,
            pod.name,
            members.len()
        );
        union_into(&mut attached, members.into_iter().map(|p| p.name));
    }

    info!("Found {} pod(s) attached to claim {}", attached.len(), claim);
    Ok(attached)
}
