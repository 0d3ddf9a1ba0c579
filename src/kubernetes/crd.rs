// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::ImagePullSecretManager;
use kube::{
    core::ApiResource,
    discovery::{ApiGroup, Discovery},
    Client,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait for the ImagePullSecretManager CRD to become available in the cluster.
/// Polls with exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_manager_crd(client: &Client) -> Result<()> {
    let target = ApiResource::erase::<ImagePullSecretManager>(&());
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match is_served(client, &target).await {
            Ok(true) => {
                info!("{} CRD ({}) is available", target.kind, target.api_version);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "{} CRD ({}) not yet available, waiting {} seconds...",
                    target.kind, target.api_version, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for {} CRD: {}, retrying in {} seconds...",
                    target.kind, e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;
        interval = next_interval(interval);
    }
}

fn next_interval(interval: u64) -> u64 {
    interval.saturating_mul(2).min(POLL_MAX_INTERVAL_SECS)
}

async fn is_served(client: &Client, target: &ApiResource) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[target.group.as_str()])
        .run()
        .await?;

    let served = discovery.groups().any(|group| serves_kind(group, target));
    Ok(served)
}

fn serves_kind(group: &ApiGroup, target: &ApiResource) -> bool {
    group.name() == target.group
        && group
            .versioned_resources(&target.version)
            .iter()
            .any(|(ar, _)| ar.kind == target.kind)
}
