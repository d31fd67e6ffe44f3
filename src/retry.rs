// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded retry with a fixed delay between attempts.
//!
//! Every failed attempt is kept, so a caller that gives up can report all of
//! them at once instead of only the last.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use tokio::time::sleep;
use tracing::{debug, warn};

/// A collection of errors gathered across attempts or independent steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiError<E> {
    errors: Vec<E>,
}

impl<E> MultiError<E> {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: E) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// `Ok(())` when nothing was collected, the collection otherwise
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<E> Default for MultiError<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<Vec<E>> for MultiError<E> {
    fn from(errors: Vec<E>) -> Self {
        Self { errors }
    }
}

impl<E: fmt::Display> fmt::Display for MultiError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for MultiError<E> {}

/// Attempt count and delay for calls that are safe to repeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    /// A single attempt
    fn default() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        Self {
            attempts: config.retry_attempts,
            delay: config.retry_delay,
        }
    }
}

/// Run `operation` up to `attempts` times, sleeping `delay` between attempts.
///
/// Returns the first success, or every collected failure once the attempts
/// are used up. Zero attempts counts as one.
pub async fn retry_after<F, Fut, T, E>(
    attempts: u32,
    delay: Duration,
    mut operation: F,
) -> Result<T, MultiError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let attempts = attempts.max(1);
    let mut failures = MultiError::new();

    for attempt in 1..=attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) => {
                warn!(attempt, attempts, error = %e, "Attempt failed");
                failures.push(e);
                if attempt < attempts && !delay.is_zero() {
                    sleep(delay).await;
                }
            }
        }
    }

    Err(failures)
}

/// [`retry_after`] without a delay between attempts.
pub async fn retry<F, Fut, T, E>(attempts: u32, operation: F) -> Result<T, MultiError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    retry_after(attempts, Duration::ZERO, operation).await
}
