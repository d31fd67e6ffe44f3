// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster access: client creation and the gateways used by the commands.

pub mod api;
pub mod client;
pub mod gateway;
pub mod kubectl;

pub use api::KubeGateway;
pub use client::create_client;
pub use gateway::{ClusterGateway, PodInfo};
pub use kubectl::KubectlGateway;
