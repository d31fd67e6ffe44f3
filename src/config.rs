// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How cluster operations are carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Typed calls against the Kubernetes API
    Api,
    /// Shell out to the kubectl binary
    Kubectl,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "api" => Ok(Backend::Api),
            "kubectl" => Ok(Backend::Kubectl),
            other => bail!("unknown backend '{}', expected 'api' or 'kubectl'", other),
        }
    }
}

/// Tool configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    /// kubectl (or oc) binary used by the kubectl backend
    pub kubectl: String,
    /// Attempts for read-only cluster calls
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::Api,
            kubectl: defaults::KUBECTL.to_string(),
            retry_attempts: defaults::RETRY_ATTEMPTS,
            retry_delay: Duration::from_secs(defaults::RETRY_DELAY_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(backend) = lookup("F8_BACKEND") {
            config.backend = backend.parse().context("F8_BACKEND is invalid")?;
        }
        if let Some(kubectl) = lookup("F8_KUBECTL").filter(|k| !k.trim().is_empty()) {
            config.kubectl = kubectl;
        }
        if let Some(attempts) = lookup("F8_RETRY_ATTEMPTS") {
            config.retry_attempts = attempts
                .parse()
                .with_context(|| format!("F8_RETRY_ATTEMPTS is not a number: {}", attempts))?;
        }
        if let Some(delay) = lookup("F8_RETRY_DELAY_SECS") {
            let secs: u64 = delay
                .parse()
                .with_context(|| format!("F8_RETRY_DELAY_SECS is not a number: {}", delay))?;
            config.retry_delay = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
