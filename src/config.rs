// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Restricts every watch to a single namespace. All namespaces when unset.
    pub watch_namespace: Option<String>,
    /// Label selector narrowing the objects the manager claims. Whole namespace when unset.
    pub candidate_label_selector: Option<String>,
    /// First requeue delay after a transient reconcile failure
    pub error_requeue_base: Duration,
    /// Upper bound for the requeue delay
    pub error_requeue_max: Duration,
    pub enable_pod_attachment: bool,
    pub enable_service_account_attachment: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let watch_namespace = non_empty_var("WATCH_NAMESPACE");
        let candidate_label_selector = non_empty_var("CANDIDATE_LABEL_SELECTOR");

        let error_requeue_base = seconds_var("ERROR_REQUEUE_BASE_SECS", 5)?;
        let error_requeue_max = seconds_var("ERROR_REQUEUE_MAX_SECS", 300)?;

        let enable_pod_attachment = bool_var("ENABLE_POD_ATTACHMENT", true)?;
        let enable_service_account_attachment =
            bool_var("ENABLE_SERVICE_ACCOUNT_ATTACHMENT", true)?;

        Ok(Config {
            watch_namespace,
            candidate_label_selector,
            error_requeue_base,
            error_requeue_max: error_requeue_max.max(error_requeue_base),
            enable_pod_attachment,
            enable_service_account_attachment,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            watch_namespace: None,
            candidate_label_selector: None,
            error_requeue_base: Duration::from_secs(5),
            error_requeue_max: Duration::from_secs(300),
            enable_pod_attachment: true,
            enable_service_account_attachment: true,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn seconds_var(name: &str, default: u64) -> Result<Duration> {
    let secs = match non_empty_var(name) {
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("{} must be a number of seconds, got '{}'", name, v))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}

fn bool_var(name: &str, default: bool) -> Result<bool> {
    match non_empty_var(name) {
        Some(v) => v
            .parse::<bool>()
            .with_context(|| format!("{} must be 'true' or 'false', got '{}'", name, v)),
        None => Ok(default),
    }
}
