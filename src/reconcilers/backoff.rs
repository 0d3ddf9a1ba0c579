// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Per-object exponential requeue delays after transient failures.

use crate::error::CheironError;
use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{error, warn};

pub struct ErrorBackoff {
    base: Duration,
    max: Duration,
    failures: Mutex<HashMap<String, u32>>,
}

impl ErrorBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Record a failure and return how long to wait before retrying
    pub fn next_delay(&self, key: &str) -> Duration {
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        let count = failures.entry(key.to_string()).or_insert(0);
        let delay = self
            .base
            .checked_mul(2u32.saturating_pow(*count))
            .unwrap_or(self.max)
            .min(self.max);
        *count = count.saturating_add(1);
        delay
    }

    /// Forget past failures after a successful reconcile
    pub fn reset(&self, key: &str) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Backoff key of an object
pub fn object_key<K: Resource>(obj: &K) -> String {
    format!("{}/{}", obj.namespace().unwrap_or_default(), obj.name_any())
}

/// Shared error policy: terminal errors wait for the next change of the
/// object, transient ones are retried with a growing delay.
pub fn requeue_after_error(key: &str, error: &CheironError, backoff: &ErrorBackoff) -> Action {
    if !error.is_retryable() {
        error!("Reconciliation of {} failed permanently: {}", key, error);
        return Action::await_change();
    }

    let delay = backoff.next_delay(key);
    warn!(
        "Reconciliation of {} failed: {}, retrying in {:?}",
        key, error, delay
    );
    Action::requeue(delay)
}
