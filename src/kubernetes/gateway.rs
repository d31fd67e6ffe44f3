// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The cluster operations the volume workflow depends on.

use crate::error::GatewayError;
use crate::volumes::VolumeClaimRef;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use std::collections::BTreeMap;

/// A pod as seen by discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodInfo {
    pub name: String,
    /// Names of the volumes declared in the pod spec
    pub volumes: Vec<String>,
    pub labels: BTreeMap<String, String>,
}

impl PodInfo {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn has_volume(&self, volume: &str) -> bool {
        self.volumes.iter().any(|v| v == volume)
    }
}

/// Read and write access to a cluster.
///
/// Implementations either call the API directly or drive a CLI binary;
/// callers only see this trait.
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    /// Namespace of the current kubeconfig context
    async fn current_namespace(&self) -> Result<String, GatewayError>;

    /// List pods in `namespace`, optionally restricted by a label selector
    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<PodInfo>, GatewayError>;

    /// Fetch the claim as YAML text
    async fn get_manifest(&self, claim: &VolumeClaimRef) -> Result<String, GatewayError>;

    async fn delete_claim(&self, claim: &VolumeClaimRef) -> Result<(), GatewayError>;

    /// Create whatever `manifest` describes in `namespace`
    async fn create_resource(&self, namespace: &str, manifest: &str) -> Result<(), GatewayError>;

    async fn delete_pod(&self, namespace: &str, pod: &str) -> Result<(), GatewayError>;
}

impl From<&Pod> for PodInfo {
    fn from(pod: &Pod) -> Self {
        PodInfo {
            name: pod.name_any(),
            volumes: pod
                .spec
                .as_ref()
                .and_then(|s| s.volumes.as_ref())
                .map(|volumes| volumes.iter().map(|v| v.name.clone()).collect())
                .unwrap_or_default(),
            labels: pod.labels().clone(),
        }
    }
}
