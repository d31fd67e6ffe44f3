// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking the cluster.

use crate::error::GatewayError;
use crate::kubernetes::gateway::{ClusterGateway, PodInfo};
use crate::volumes::VolumeClaimRef;
use async_trait::async_trait;
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Responses registered for the same method and path are served in order;
/// the last one keeps being served once the others are used up.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), VecDeque<(u16, String)>>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service, defaulting to the
    /// `default` namespace
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();

        let key = (method.to_string(), path.to_string());
        let key = if responses.contains_key(&key) {
            key
        } else {
            // Prefix match for paths like /api/v1/namespaces/foo
            responses
                .keys()
                .find(|(m, p)| m == method && path.starts_with(p.as_str()))
                .cloned()?
        };

        let queue = responses.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) =
                response.unwrap_or_else(|| (404, not_found_json("resource", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// A pod with the given labels and volume names
pub fn pod_json(name: &str, labels: &[(&str, &str)], volumes: &[&str]) -> serde_json::Value {
    let labels: BTreeMap<&str, &str> = labels.iter().copied().collect();
    let volumes: Vec<_> = volumes
        .iter()
        .map(|v| serde_json::json!({ "name": v, "persistentVolumeClaim": { "claimName": v } }))
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": "ns1",
            "labels": labels
        },
        "spec": {
            "containers": [{ "name": "main", "image": "busybox" }],
            "volumes": volumes
        }
    })
}

pub fn pod_list_json(pods: &[serde_json::Value]) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "PodList",
        "metadata": { "resourceVersion": "1" },
        "items": pods
    })
    .to_string()
}

/// A bound claim carrying server-managed fields
pub fn pvc_json(name: &str, namespace: &str) -> String {
    pvc_value(name, namespace).to_string()
}

/// A deleted claim still held by the pvc-protection finalizer
pub fn terminating_pvc_json(name: &str, namespace: &str) -> String {
    let mut pvc = pvc_value(name, namespace);
    pvc["metadata"]["deletionTimestamp"] = serde_json::json!("2026-01-01T00:05:00Z");
    pvc["metadata"]["finalizers"] = serde_json::json!(["kubernetes.io/pvc-protection"]);
    pvc.to_string()
}

fn pvc_value(name: &str, namespace: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "PersistentVolumeClaim",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "0b7e0c52-test",
            "resourceVersion": "4242",
            "creationTimestamp": "2026-01-01T00:00:00Z",
            "annotations": {
                "pv.kubernetes.io/bind-completed": "yes"
            },
            "managedFields": [{
                "manager": "kube-controller-manager",
                "operation": "Update",
                "apiVersion": "v1"
            }]
        },
        "spec": {
            "accessModes": ["ReadWriteOnce"],
            "resources": { "requests": { "storage": "1Gi" } },
            "volumeName": "pvc-0b7e0c52"
        },
        "status": {
            "phase": "Bound"
        }
    })
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Calls received by [`FakeGateway`], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ListPods(String, Option<String>),
    GetManifest(VolumeClaimRef),
    DeleteClaim(VolumeClaimRef),
    CreateResource(String, String),
    DeletePod(String, String),
}

/// In-memory cluster that records every call
#[derive(Default)]
pub struct FakeGateway {
    pub namespace: String,
    pub pods: Vec<PodInfo>,
    pub manifest: String,
    /// Number of leading list calls that fail
    pub failing_lists: Mutex<u32>,
    pub fail_export: bool,
    pub fail_delete_claim: bool,
    pub fail_create: bool,
    pub failing_pods: HashSet<String>,
    pub calls: Mutex<Vec<GatewayCall>>,
}

impl FakeGateway {
    pub fn new(namespace: &str, pods: Vec<PodInfo>, manifest: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            pods,
            manifest: manifest.to_string(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deleted_pods(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::DeletePod(_, pod) => Some(pod),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn pod(name: &str, service: Option<&str>, volumes: &[&str]) -> PodInfo {
    PodInfo {
        name: name.to_string(),
        volumes: volumes.iter().map(|v| v.to_string()).collect(),
        labels: service
            .map(|s| BTreeMap::from([("service".to_string(), s.to_string())]))
            .unwrap_or_default(),
    }
}

#[async_trait]
impl ClusterGateway for FakeGateway {
    async fn current_namespace(&self) -> Result<String, GatewayError> {
        Ok(self.namespace.clone())
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<PodInfo>, GatewayError> {
        self.record(GatewayCall::ListPods(
            namespace.to_string(),
            label_selector.map(str::to_string),
        ));

        {
            let mut failing = self.failing_lists.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(GatewayError::new("list pods", "connection refused"));
            }
        }

        let pods = match label_selector.and_then(|s| s.split_once('=')) {
            Some((key, value)) => self
                .pods
                .iter()
                .filter(|p| p.label(key) == Some(value))
                .cloned()
                .collect(),
            None => self.pods.clone(),
        };
        Ok(pods)
    }

    async fn get_manifest(&self, claim: &VolumeClaimRef) -> Result<String, GatewayError> {
        self.record(GatewayCall::GetManifest(claim.clone()));
        if self.fail_export {
            return Err(GatewayError::new("get pvc", "forbidden"));
        }
        Ok(self.manifest.clone())
    }

    async fn delete_claim(&self, claim: &VolumeClaimRef) -> Result<(), GatewayError> {
        self.record(GatewayCall::DeleteClaim(claim.clone()));
        if self.fail_delete_claim {
            return Err(GatewayError::new("delete pvc", "forbidden"));
        }
        Ok(())
    }

    async fn create_resource(&self, namespace: &str, manifest: &str) -> Result<(), GatewayError> {
        self.record(GatewayCall::CreateResource(
            namespace.to_string(),
            manifest.to_string(),
        ));
        if self.fail_create {
            return Err(GatewayError::new("create -f manifest", "admission denied"));
        }
        Ok(())
    }

    async fn delete_pod(&self, namespace: &str, pod: &str) -> Result<(), GatewayError> {
        self.record(GatewayCall::DeletePod(namespace.to_string(), pod.to_string()));
        if self.failing_pods.contains(pod) {
            return Err(GatewayError::new(format!("delete pod {}", pod), "not found"));
        }
        Ok(())
    }
}
