// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::{Pod, ServiceAccount};
use kube::Client;
use tracing::{info, warn};

use cheiron::config::Config;
use cheiron::constants::OPERATOR_NAME;
use cheiron::kubernetes::wait_for_manager_crd;
use cheiron::reconcilers::{AttachmentReconciler, ManagerReconciler};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting {} operator", OPERATOR_NAME);

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, pod_attachment={}, service_account_attachment={}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.enable_pod_attachment,
        config.enable_service_account_attachment
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for ImagePullSecretManager CRD to become available...");
    wait_for_manager_crd(&client).await?;

    let manager_reconciler = ManagerReconciler::new(client.clone(), config.clone());
    let pod_reconciler = AttachmentReconciler::<Pod>::new(client.clone(), config.clone());
    let service_account_reconciler =
        AttachmentReconciler::<ServiceAccount>::new(client, config.clone());

    info!("Starting reconcilers...");

    let pods = async {
        if config.enable_pod_attachment {
            pod_reconciler.run().await
        } else {
            info!("Pod attachment disabled");
            Ok(())
        }
    };
    let service_accounts = async {
        if config.enable_service_account_attachment {
            service_account_reconciler.run().await
        } else {
            info!("ServiceAccount attachment disabled");
            Ok(())
        }
    };

    tokio::try_join!(manager_reconciler.run(), pods, service_accounts)?;

    warn!("All reconcilers stopped");
    Ok(())
}
