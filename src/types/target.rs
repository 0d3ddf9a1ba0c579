// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::{LocalObjectReference, Pod, ServiceAccount};
use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// A resource that can carry image pull secret references.
///
/// The pod and service account attachment reconcilers differ only in which
/// type they are instantiated with.
pub trait AttachmentTarget:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
    /// Human readable kind used in log output
    const KIND: &'static str;

    fn image_pull_secrets(&self) -> &[LocalObjectReference];

    /// Replace the full reference list. An empty list clears the field.
    fn set_image_pull_secrets(&mut self, secrets: Vec<LocalObjectReference>);
}

impl AttachmentTarget for Pod {
    const KIND: &'static str = "Pod";

    fn image_pull_secrets(&self) -> &[LocalObjectReference] {
        self.spec
            .as_ref()
            .and_then(|s| s.image_pull_secrets.as_deref())
            .unwrap_or_default()
    }

    fn set_image_pull_secrets(&mut self, secrets: Vec<LocalObjectReference>) {
        let spec = self.spec.get_or_insert_with(Default::default);
        spec.image_pull_secrets = (!secrets.is_empty()).then_some(secrets);
    }
}

impl AttachmentTarget for ServiceAccount {
    const KIND: &'static str = "ServiceAccount";

    fn image_pull_secrets(&self) -> &[LocalObjectReference] {
        self.image_pull_secrets.as_deref().unwrap_or_default()
    }

    fn set_image_pull_secrets(&mut self, secrets: Vec<LocalObjectReference>) {
        self.image_pull_secrets = (!secrets.is_empty()).then_some(secrets);
    }
}

/// Build the reference list for a set of secret names
pub fn secret_references(names: &[String]) -> Vec<LocalObjectReference> {
    names
        .iter()
        .map(|name| LocalObjectReference { name: name.clone() })
        .collect()
}
