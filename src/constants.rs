// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Label and annotation keys used by the platform
pub mod labels {
    /// Pods belonging to the same platform service share this label
    pub const SERVICE: &str = "service";
}

pub mod annotations {
    /// External URL of an exposed service
    pub const EXPOSE_URL: &str = "fabric8.io/exposeUrl";
}

/// Manifest sanitization before a claim is recreated
pub mod manifest {
    /// Lines whose trimmed content starts with one of these are dropped.
    /// Server-generated metadata is rejected on create, and the binding
    /// fields would tie the new claim to the old volume.
    pub const EXCLUDED_PREFIXES: &[&str] = &[
        "selfLink",
        "resourceVersion",
        "uid",
        "creationTimestamp",
        "kubectl.kubernetes.io/last-applied-configuration:",
        "control-plane.alpha.kubernetes.io/leader:",
        "pv.kubernetes.io/",
        "volume.beta.kubernetes.io/",
        "volumeName",
    ];

    /// Start of the observed-state block, dropped as a whole
    pub const STATUS_BLOCK: &str = "status:";
}

/// Defaults for configuration read from the environment
pub mod defaults {
    pub const KUBECTL: &str = "kubectl";
    pub const RETRY_ATTEMPTS: u32 = 3;
    pub const RETRY_DELAY_SECS: u64 = 2;
    /// Namespace used when the kubeconfig context does not name one
    pub const NAMESPACE: &str = "default";
}

/// Waiting for a service to be exposed and ready
pub mod service {
    pub const WAIT_ATTEMPTS: u32 = 1200;
    pub const WAIT_DELAY_SECS: u64 = 10;
}

/// Waiting for a deleted claim to be removed before it is recreated
pub mod deletion {
    /// Checks while a finalizer such as `kubernetes.io/pvc-protection`
    /// still holds the claim
    pub const WAIT_ATTEMPTS: u32 = 30;
    pub const WAIT_DELAY_SECS: u64 = 2;
    /// Passed to `kubectl delete --timeout`
    pub const TIMEOUT_SECS: u64 = 60;
}
