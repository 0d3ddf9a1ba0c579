// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery and pull secret management.

pub mod crd;
pub mod secrets;

pub use crd::wait_for_manager_crd;
pub use secrets::upsert_pull_secret;

use crate::constants::OPERATOR_NAME;
use k8s_openapi::NamespaceResourceScope;
use kube::{api::PostParams, Api, Client, Resource};

/// Api for a namespaced resource, restricted to one namespace when configured
pub fn scoped_api<K>(client: Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    }
}

/// Write parameters recording the operator as field manager
pub fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    }
}
