// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface

use crate::config::{Backend, Config};
use crate::constants::service as service_wait;
use crate::error::Result;
use crate::kubernetes::{create_client, ClusterGateway, KubeGateway, KubectlGateway};
use crate::retry::RetryPolicy;
use crate::services::service_url;
use crate::volumes::{recreate_volume, RecreateRequest, RecreateWarning};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tracing::info;

/// f8ctl - manage the platform on a Kubernetes or OpenShift cluster
#[derive(Parser, Debug)]
#[command(name = "f8ctl", version, about, long_about = None)]
pub struct Cli {
    /// How to talk to the cluster (overrides F8_BACKEND)
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Delete and recreate a persistent volume claim
    ///
    /// Pods mounting the claim, and pods sharing their `service` label, are
    /// deleted afterwards so their controllers restart them on the new claim.
    ErasePvc(ErasePvcArgs),

    /// Print the exposed URL of a service
    Service(ServiceArgs),
}

#[derive(Args, Debug)]
pub struct ErasePvcArgs {
    /// Name of the persistent volume claim
    pub claim: String,

    /// The namespace where the claim is located. Defaults to the current namespace
    #[arg(short, long)]
    pub namespace: Option<String>,
}

#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// Name of the service
    pub name: String,

    /// The service namespace. Defaults to the current namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Do not wait for the service to be exposed and ready
    #[arg(long)]
    pub no_wait: bool,
}

/// Run the parsed command
pub async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    match cli.command {
        Commands::ErasePvc(args) => erase_pvc(args, &config).await,
        Commands::Service(args) => service(args).await,
    }
}

async fn gateway(config: &Config) -> Result<Box<dyn ClusterGateway>> {
    match config.backend {
        Backend::Api => Ok(Box::new(KubeGateway::new(create_client().await?))),
        Backend::Kubectl => Ok(Box::new(KubectlGateway::new(config.kubectl.clone()))),
    }
}

async fn erase_pvc(args: ErasePvcArgs, config: &Config) -> Result<()> {
    let gateway = gateway(config).await?;
    info!("Using the {:?} backend", config.backend);

    let request = RecreateRequest {
        claim_name: args.claim,
        namespace: args.namespace,
    };
    let report = recreate_volume(gateway.as_ref(), &request, RetryPolicy::from(config)).await?;

    for warning in &report.warnings {
        match warning {
            RecreateWarning::NoPodsFound => println!(
                "No pods are attached to {}, nothing was restarted.",
                report.claim
            ),
        }
    }
    for pod in &report.evicted_pods {
        println!("Pod {} attached to {} has been deleted.", pod, report.claim.name);
    }
    println!("Volume: {} has been recreated.", report.claim.name);
    Ok(())
}

async fn service(args: ServiceArgs) -> Result<()> {
    let client = create_client().await?;
    let namespace = args
        .namespace
        .filter(|ns| !ns.trim().is_empty())
        .unwrap_or_else(|| client.default_namespace().to_string());
    let retry = RetryPolicy {
        attempts: service_wait::WAIT_ATTEMPTS,
        delay: Duration::from_secs(service_wait::WAIT_DELAY_SECS),
    };

    let url = service_url(&client, &namespace, &args.name, !args.no_wait, retry).await?;
    println!("{}", url);
    Ok(())
}
