// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! [`ClusterGateway`] that drives the kubectl (or oc) binary

use crate::constants::{defaults, deletion};
use crate::error::GatewayError;
use crate::kubernetes::gateway::{ClusterGateway, PodInfo};
use crate::volumes::VolumeClaimRef;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use serde::Deserialize;
use std::io::Write;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

/// What a finished command produced
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl CommandOutput {
    /// stderr and stdout together, for error reports
    pub fn combined(&self) -> String {
        [self.stderr.trim(), self.stdout.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs external commands (swapped out in tests)
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput>;
}

/// Runs commands as child processes
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output().await?;
        Ok(output.into())
    }
}

/// `kubectl get pods -o json` wraps items in a plain `List`
#[derive(Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<Pod>,
}

pub struct KubectlGateway<R = ProcessRunner> {
    kubectl: String,
    runner: R,
    /// How long `kubectl delete pvc` waits for the claim to be removed
    delete_timeout: Duration,
}

impl KubectlGateway<ProcessRunner> {
    pub fn new(kubectl: impl Into<String>) -> Self {
        Self::with_runner(kubectl, ProcessRunner)
    }
}

impl<R: CommandRunner> KubectlGateway<R> {
    pub fn with_runner(kubectl: impl Into<String>, runner: R) -> Self {
        Self {
            kubectl: kubectl.into(),
            runner,
            delete_timeout: Duration::from_secs(deletion::TIMEOUT_SECS),
        }
    }

    pub fn with_delete_timeout(mut self, timeout: Duration) -> Self {
        self.delete_timeout = timeout;
        self
    }

    /// Run kubectl and return stdout, or the command line and its output
    /// when it fails
    async fn kubectl(&self, args: &[&str]) -> Result<String, GatewayError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let command_line = format!("{} {}", self.kubectl, args.join(" "));
        debug!("Running {}", command_line);

        let output = self
            .runner
            .run(&self.kubectl, &args)
            .await
            .map_err(|e| GatewayError::new(command_line.clone(), e.to_string()))?;

        if !output.success {
            return Err(GatewayError::new(command_line, output.combined()));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl<R: CommandRunner> ClusterGateway for KubectlGateway<R> {
    async fn current_namespace(&self) -> Result<String, GatewayError> {
        let out = self
            .kubectl(&["config", "view", "--minify", "-o", "jsonpath={..namespace}"])
            .await?;
        let namespace = out.trim();
        if namespace.is_empty() {
            Ok(defaults::NAMESPACE.to_string())
        } else {
            Ok(namespace.to_string())
        }
    }

    #[instrument(skip(self))]
    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<PodInfo>, GatewayError> {
        let mut args = vec!["get", "pods", "-n", namespace, "-o", "json"];
        if let Some(selector) = label_selector {
            args.extend(["-l", selector]);
        }

        let out = self.kubectl(&args).await?;
        let list: PodList = serde_json::from_str(&out).map_err(|e| {
            GatewayError::new(
                format!("{} {}", self.kubectl, args.join(" ")),
                format!("unreadable pod list: {}", e),
            )
        })?;

        Ok(list.items.iter().map(PodInfo::from).collect())
    }

    #[instrument(skip(self), fields(claim = %claim))]
    async fn get_manifest(&self, claim: &VolumeClaimRef) -> Result<String, GatewayError> {
        let (namespace, name) = (claim.namespace.as_str(), claim.name.as_str());
        self.kubectl(&["get", "-o", "yaml", "-n", namespace, "pvc", name])
            .await
    }

    /// kubectl waits for finalizers to release the claim; running into the
    /// timeout fails the delete while the claim still exists.
    #[instrument(skip(self), fields(claim = %claim))]
    async fn delete_claim(&self, claim: &VolumeClaimRef) -> Result<(), GatewayError> {
        let timeout = format!("--timeout={}s", self.delete_timeout.as_secs());
        let (namespace, name) = (claim.namespace.as_str(), claim.name.as_str());
        self.kubectl(&["delete", "-n", namespace, "pvc", name, timeout.as_str()])
            .await?;
        Ok(())
    }

    /// The manifest goes through a temporary file that is removed once
    /// kubectl returns, whatever the outcome.
    #[instrument(skip(self, manifest))]
    async fn create_resource(&self, namespace: &str, manifest: &str) -> Result<(), GatewayError> {
        let write_error = |e: std::io::Error| {
            GatewayError::new("write temporary manifest", e.to_string())
        };

        let mut file = tempfile::Builder::new()
            .prefix("f8ctl-")
            .suffix(".yaml")
            .tempfile()
            .map_err(write_error)?;
        file.write_all(manifest.as_bytes()).map_err(write_error)?;
        file.flush().map_err(write_error)?;

        let path = file.path().to_string_lossy().to_string();
        let result = self.kubectl(&["create", "-n", namespace, "-f", path.as_str()]).await;

        drop(file);
        result.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn delete_pod(&self, namespace: &str, pod: &str) -> Result<(), GatewayError> {
        self.kubectl(&["delete", "-n", namespace, "pod", pod]).await?;
        Ok(())
    }
}
