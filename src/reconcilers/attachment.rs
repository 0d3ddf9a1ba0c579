// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Attachment reconciler - applies the secret set claimed by the manager to
//! pods or service accounts.

use crate::admission::AdmissionTracker;
use crate::config::Config;
use crate::error::{CheironError, Result};
use crate::kubernetes::{post_params, scoped_api};
use crate::protocol;
use crate::reconcilers::backoff::{object_key, requeue_after_error, ErrorBackoff};
use crate::types::target::{secret_references, AttachmentTarget};
use futures::{future, StreamExt, TryStreamExt};
use kube::{
    runtime::{controller::Action, reflector, watcher, Controller, WatchStreamExt},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AttachmentReconciler<K> {
    client: Client,
    config: Config,
    backoff: ErrorBackoff,
    _target: PhantomData<fn() -> K>,
}

impl<K> AttachmentReconciler<K>
where
    K: AttachmentTarget,
{
    pub fn new(client: Client, config: Config) -> Self {
        let backoff = ErrorBackoff::new(config.error_requeue_base, config.error_requeue_max);
        Self {
            client,
            config,
            backoff,
            _target: PhantomData,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let targets: Api<K> = scoped_api(
            self.client.clone(),
            self.config.watch_namespace.as_deref(),
        );

        // Updates of objects that were already handled never reach the queue
        let (reader, writer) = reflector::store();
        let mut admission = AdmissionTracker::<K>::new();
        let admitted = watcher(targets, WatcherConfig::default())
            .default_backoff()
            .reflect(writer)
            .try_filter_map(move |event| future::ready(Ok(admission.observe(event))));

        info!("Starting {} attachment reconciler", K::KIND);
        let context = Arc::new(self);

        Controller::for_stream(admitted, reader)
            .shutdown_on_signal()
            .run(reconcile::<K>, error_policy::<K>, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled {}: {:?}", K::KIND, o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile<K>(target: Arc<K>, ctx: Arc<AttachmentReconciler<K>>) -> Result<Action>
where
    K: AttachmentTarget,
{
    let name = target.name_any();
    let namespace = target
        .namespace()
        .ok_or_else(|| CheironError::MissingNamespace(name.clone()))?;
    let key = object_key(&*target);

    let api: Api<K> = Api::namespaced(ctx.client.clone(), &namespace);
    let Some(mut target) = api.get_opt(&name).await? else {
        debug!("{} {}/{} no longer exists, nothing to do", K::KIND, namespace, name);
        ctx.backoff.reset(&key);
        return Ok(Action::await_change());
    };

    if !protocol::is_claimed(target.meta()) {
        debug!(
            "{} {}/{} is not marked as reconcilable, skipping",
            K::KIND,
            namespace,
            name
        );
        ctx.backoff.reset(&key);
        return Ok(Action::await_change());
    }

    let secret_names = protocol::reconcile_with(target.meta());
    if secret_names.is_empty() {
        info!(
            "No secrets attached to {} {}/{}, clearing imagePullSecrets",
            K::KIND,
            namespace,
            name
        );
    }

    let desired = secret_references(&secret_names);
    let up_to_date = target.image_pull_secrets() == desired.as_slice();
    let newly_handled = protocol::mark_handled(target.meta_mut());

    if up_to_date && !newly_handled {
        debug!("{} {}/{} is already up to date", K::KIND, namespace, name);
    } else {
        target.set_image_pull_secrets(desired);
        api.replace(&name, &post_params(), &target).await?;
        info!(
            "Updated {} {}/{} with imagePullSecrets [{}]",
            K::KIND,
            namespace,
            name,
            secret_names.join(", ")
        );
    }

    ctx.backoff.reset(&key);
    Ok(Action::await_change())
}

fn error_policy<K>(target: Arc<K>, error: &CheironError, ctx: Arc<AttachmentReconciler<K>>) -> Action
where
    K: AttachmentTarget,
{
    requeue_after_error(&object_key(&*target), error, &ctx.backoff)
}
