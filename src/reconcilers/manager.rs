// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Manager reconciler - materializes pull secrets from ImagePullSecretManager
//! resources and claims the pods or service accounts of their namespace.

use crate::config::Config;
use crate::error::{CheironError, Result};
use crate::kubernetes::{post_params, scoped_api, upsert_pull_secret};
use crate::protocol::{self, ClaimOutcome};
use crate::reconcilers::backoff::{object_key, requeue_after_error, ErrorBackoff};
use crate::selector::{self, CandidateSelector};
use crate::types::{CredentialSource, ImagePullSecretManager, ReconciliationMode};
use futures::StreamExt;
use k8s_openapi::api::core::v1::{Pod, Secret, ServiceAccount};
use k8s_openapi::NamespaceResourceScope;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct ManagerReconciler {
    client: Client,
    config: Config,
    selector: Box<dyn CandidateSelector>,
    backoff: ErrorBackoff,
}

/// Counts of claim outcomes for one reconcile
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClaimSummary {
    pub claimed: usize,
    pub retargeted: usize,
    pub unchanged: usize,
    pub ignored: usize,
}

impl ClaimSummary {
    fn record(&mut self, outcome: ClaimOutcome) {
        match outcome {
            ClaimOutcome::Claimed => self.claimed += 1,
            ClaimOutcome::Retargeted => self.retargeted += 1,
            ClaimOutcome::Unchanged => self.unchanged += 1,
            ClaimOutcome::Ignored => self.ignored += 1,
        }
    }
}

impl ManagerReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        let selector = selector::from_config(&config);
        let backoff = ErrorBackoff::new(config.error_requeue_base, config.error_requeue_max);
        Self {
            client,
            config,
            selector,
            backoff,
        }
    }

    /// Replace the candidate selection policy
    pub fn with_selector(mut self, selector: Box<dyn CandidateSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let namespace = self.config.watch_namespace.clone();
        let managers: Api<ImagePullSecretManager> =
            scoped_api(self.client.clone(), namespace.as_deref());
        let secrets: Api<Secret> = scoped_api(self.client.clone(), namespace.as_deref());

        info!(
            "Starting ImagePullSecretManager reconciler, claiming {}",
            self.selector.describe()
        );
        let context = Arc::new(self);

        Controller::new(managers, WatcherConfig::default())
            .owns(secrets, WatcherConfig::default())
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled ImagePullSecretManager: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    /// Materialize inline credentials and collect the names of all secrets to attach.
    /// Partially specified entries are skipped.
    async fn apply_secrets(
        &self,
        manager: &ImagePullSecretManager,
        namespace: &str,
    ) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(manager.spec.secrets.len());

        for (index, spec) in manager.spec.secrets.iter().enumerate() {
            match spec.source() {
                None => {
                    warn!(
                        "ImagePullSecret #{} of {}/{} is not fully specified, skipping",
                        index,
                        namespace,
                        manager.name_any()
                    );
                }
                Some(CredentialSource::Existing(name)) => {
                    names.push(name.to_string());
                }
                Some(CredentialSource::Inline(credentials)) => {
                    let secret =
                        upsert_pull_secret(&self.client, manager, namespace, &credentials).await?;
                    names.push(secret.name_any());
                }
            }
        }

        Ok(names)
    }

    /// Write the claim annotations onto every candidate object in the namespace
    async fn claim_candidates<K>(&self, namespace: &str, secrets: &str) -> Result<ClaimSummary>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
            + Clone
            + Debug
            + DeserializeOwned
            + Serialize,
    {
        let kind = K::kind(&());
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let candidates = api.list(&self.selector.list_params()).await?;

        let mut summary = ClaimSummary::default();
        for mut obj in candidates.items {
            let name = obj.name_any();
            let outcome = protocol::claim(obj.meta_mut(), secrets);
            summary.record(outcome);

            match outcome {
                ClaimOutcome::Ignored => {
                    debug!("{} {}/{} opted out, leaving untouched", kind, namespace, name);
                }
                ClaimOutcome::Unchanged => {}
                ClaimOutcome::Claimed | ClaimOutcome::Retargeted => {
                    api.replace(&name, &post_params(), &obj).await?;
                    debug!(
                        "Marked {} {}/{} to reconcile with [{}]",
                        kind, namespace, name, secrets
                    );
                }
            }
        }

        Ok(summary)
    }
}

async fn reconcile(
    manager: Arc<ImagePullSecretManager>,
    ctx: Arc<ManagerReconciler>,
) -> Result<Action> {
    let name = manager.name_any();
    let namespace = manager
        .namespace()
        .ok_or_else(|| CheironError::MissingNamespace(name.clone()))?;
    let key = object_key(&*manager);

    debug!("Reconciling ImagePullSecretManager: {}/{}", namespace, name);

    let managers: Api<ImagePullSecretManager> = Api::namespaced(ctx.client.clone(), &namespace);
    let Some(manager) = managers.get_opt(&name).await? else {
        debug!(
            "ImagePullSecretManager {}/{} no longer exists, nothing to do",
            namespace, name
        );
        ctx.backoff.reset(&key);
        return Ok(Action::await_change());
    };

    // Checked before any write so a misconfigured manager mutates nothing
    let mode = manager.spec.reconciliation_mode().inspect_err(|e| {
        error!("ImagePullSecretManager {}/{}: {}", namespace, name, e);
    })?;

    let secret_names = ctx.apply_secrets(&manager, &namespace).await?;
    let secrets = protocol::join_secret_names(&secret_names);

    let summary = match mode {
        ReconciliationMode::Pod => ctx.claim_candidates::<Pod>(&namespace, &secrets).await?,
        ReconciliationMode::ServiceAccount => {
            ctx.claim_candidates::<ServiceAccount>(&namespace, &secrets)
                .await?
        }
    };

    info!(
        "ImagePullSecretManager {}/{} ({} mode) reconciled with [{}]: {} claimed, {} retargeted, {} unchanged, {} ignored",
        namespace,
        name,
        mode,
        secrets,
        summary.claimed,
        summary.retargeted,
        summary.unchanged,
        summary.ignored
    );

    ctx.backoff.reset(&key);
    Ok(Action::await_change())
}

fn error_policy(
    manager: Arc<ImagePullSecretManager>,
    error: &CheironError,
    ctx: Arc<ManagerReconciler>,
) -> Action {
    requeue_after_error(&object_key(&*manager), error, &ctx.backoff)
}
