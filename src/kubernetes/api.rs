// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! [`ClusterGateway`] backed by typed Kubernetes API calls

use crate::constants::deletion;
use crate::error::GatewayError;
use crate::kubernetes::gateway::{ClusterGateway, PodInfo};
use crate::retry::{retry_after, RetryPolicy};
use crate::volumes::VolumeClaimRef;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod};
use kube::{
    api::{DeleteParams, ListParams, PostParams},
    Api, Client, ResourceExt,
};
use std::time::Duration;
use tracing::{debug, info, instrument};

pub struct KubeGateway {
    client: Client,
    /// Polling used while a deleted claim is still terminating
    deletion_wait: RetryPolicy,
}

impl KubeGateway {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            deletion_wait: RetryPolicy {
                attempts: deletion::WAIT_ATTEMPTS,
                delay: Duration::from_secs(deletion::WAIT_DELAY_SECS),
            },
        }
    }

    pub fn with_deletion_wait(mut self, wait: RetryPolicy) -> Self {
        self.deletion_wait = wait;
        self
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn claims(&self, namespace: &str) -> Api<PersistentVolumeClaim> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Poll until the claim is gone. Finalizers keep a deleted claim around
    /// (terminating) for as long as they hold it.
    async fn wait_until_deleted(&self, claim: &VolumeClaimRef) -> Result<(), GatewayError> {
        let claims = &self.claims(&claim.namespace);
        let name = claim.name.as_str();

        retry_after(self.deletion_wait.attempts, self.deletion_wait.delay, move || async move {
            match claims.get_opt(name).await {
                Ok(None) => Ok(()),
                Ok(Some(pvc)) => Err(format!(
                    "claim is still terminating (finalizers: [{}])",
                    pvc.finalizers().join(", ")
                )),
                Err(e) => Err(e.to_string()),
            }
        })
        .await
        .map_err(|failures| {
            let last = failures.errors().last().cloned().unwrap_or_default();
            GatewayError::new(
                format!("wait for persistentvolumeclaim {} to be deleted", claim),
                format!("still present after {} checks: {}", failures.len(), last),
            )
        })
    }
}

fn api_error(operation: String, e: impl std::fmt::Display) -> GatewayError {
    GatewayError::new(operation, e.to_string())
}

#[async_trait]
impl ClusterGateway for KubeGateway {
    async fn current_namespace(&self) -> Result<String, GatewayError> {
        Ok(self.client.default_namespace().to_string())
    }

    #[instrument(skip(self))]
    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<PodInfo>, GatewayError> {
        let mut lp = ListParams::default();
        if let Some(selector) = label_selector {
            lp = lp.labels(selector);
        }

        let pods = self.pods(namespace).list(&lp).await.map_err(|e| {
            api_error(
                format!("list pods in {} (selector: {:?})", namespace, label_selector),
                e,
            )
        })?;

        debug!("Listed {} pods in {}", pods.items.len(), namespace);
        Ok(pods.items.iter().map(PodInfo::from).collect())
    }

    #[instrument(skip(self), fields(claim = %claim))]
    async fn get_manifest(&self, claim: &VolumeClaimRef) -> Result<String, GatewayError> {
        let operation = format!("get persistentvolumeclaim {}", claim);
        let mut pvc = self
            .claims(&claim.namespace)
            .get(&claim.name)
            .await
            .map_err(|e| api_error(operation.clone(), e))?;

        // Same view as `kubectl get -o yaml`, which hides managed fields
        pvc.metadata.managed_fields = None;

        serde_yaml::to_string(&pvc).map_err(|e| api_error(operation, e))
    }

    #[instrument(skip(self), fields(claim = %claim))]
    async fn delete_claim(&self, claim: &VolumeClaimRef) -> Result<(), GatewayError> {
        let deleted = self
            .claims(&claim.namespace)
            .delete(&claim.name, &DeleteParams::default())
            .await
            .map_err(|e| api_error(format!("delete persistentvolumeclaim {}", claim), e))?;

        // Left: the object came back, so deletion is pending
        if deleted.is_left() {
            info!("Claim {} is terminating, waiting for it to be removed", claim);
            self.wait_until_deleted(claim).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, manifest))]
    async fn create_resource(&self, namespace: &str, manifest: &str) -> Result<(), GatewayError> {
        let operation = format!("create persistentvolumeclaim in {}", namespace);
        let pvc: PersistentVolumeClaim = serde_yaml::from_str(manifest)
            .map_err(|e| api_error(operation.clone(), format!("invalid manifest: {}", e)))?;

        let created = self
            .claims(namespace)
            .create(&PostParams::default(), &pvc)
            .await
            .map_err(|e| api_error(operation, e))?;

        debug!("Created claim {}/{}", namespace, created.name_any());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_pod(&self, namespace: &str, pod: &str) -> Result<(), GatewayError> {
        self.pods(namespace)
            .delete(pod, &DeleteParams::default())
            .await
            .map_err(|e| api_error(format!("delete pod {}/{}", namespace, pod), e))?;
        Ok(())
    }
}
