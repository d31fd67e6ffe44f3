// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Exposed service URL lookup

use crate::constants::annotations;
use crate::error::{F8Error, Result};
use crate::retry::{retry_after, RetryPolicy};
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kube::{Api, Client};
use tracing::{debug, info, instrument};

/// The exposed URL annotation of a service, if set and non-empty
pub fn exposed_url(service: &Service) -> Option<&str> {
    service
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::EXPOSE_URL))
        .map(String::as_str)
        .filter(|url| !url.is_empty())
}

/// An endpoint is ready once it has addresses and none of them is pending
pub fn endpoint_ready(endpoints: &Endpoints) -> std::result::Result<(), String> {
    let subsets = endpoints.subsets.as_deref().unwrap_or_default();
    if subsets.is_empty() {
        return Err("endpoint for service is not ready yet".to_string());
    }
    if subsets
        .iter()
        .any(|s| s.not_ready_addresses.as_ref().is_some_and(|a| !a.is_empty()))
    {
        return Err("endpoint for service has addresses that are not ready yet".to_string());
    }
    Ok(())
}

/// One readiness probe: the service is exposed and its endpoint is ready
async fn check_service_ready(
    client: &Client,
    namespace: &str,
    name: &str,
) -> std::result::Result<(), String> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let service = services.get(name).await.map_err(|e| e.to_string())?;
    if exposed_url(&service).is_none() {
        return Err(format!("no {} annotation yet", annotations::EXPOSE_URL));
    }

    let endpoints: Api<Endpoints> = Api::namespaced(client.clone(), namespace);
    let endpoint = endpoints.get(name).await.map_err(|e| e.to_string())?;
    endpoint_ready(&endpoint)
}

/// Look up the exposed URL of a service, optionally waiting until it is
/// exposed and serving
#[instrument(skip(client, retry))]
pub async fn service_url(
    client: &Client,
    namespace: &str,
    name: &str,
    wait: bool,
    retry: RetryPolicy,
) -> Result<String> {
    if wait {
        info!("Waiting for service {}/{} to be ready", namespace, name);
        retry_after(retry.attempts, retry.delay, || {
            check_service_ready(client, namespace, name)
        })
        .await
        .map_err(|failures| F8Error::ServiceNotReady {
            namespace: namespace.to_string(),
            name: name.to_string(),
            failures,
        })?;
    }

    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let service = services
        .get_opt(name)
        .await?
        .ok_or_else(|| F8Error::ServiceNotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?;

    let url = exposed_url(&service).ok_or_else(|| F8Error::ServiceNotExposed {
        namespace: namespace.to_string(),
        name: name.to_string(),
    })?;

    debug!("Service {}/{} is exposed at {}", namespace, name, url);
    Ok(url.to_string())
}
