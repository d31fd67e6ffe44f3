// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persistent volume claim maintenance.

pub mod discovery;
pub mod manifest;
pub mod recreate;

use std::fmt;

pub use discovery::find_attached_pods;
pub use manifest::ManifestDocument;
pub use recreate::{recreate_volume, RecreateReport, RecreateRequest, RecreateWarning};

/// A claim identified by namespace and name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VolumeClaimRef {
    pub namespace: String,
    pub name: String,
}

impl VolumeClaimRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for VolumeClaimRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
