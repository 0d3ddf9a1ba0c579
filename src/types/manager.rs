// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0
use crate::error::{CheironError, Result};
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(
    group = "cheiron.anny.co",
    version = "v1alpha1",
    kind = "ImagePullSecretManager"
)]
#[kube(namespaced)]
#[kube(status = "ImagePullSecretManagerStatus")]
#[serde(rename_all = "camelCase")]
pub struct ImagePullSecretManagerSpec {
    /// Pull secrets to attach, either existing ones or inline credentials
    #[serde(default)]
    pub secrets: Vec<ImagePullSecretSpec>,
    /// Which resources receive the secrets: `Pod` or `ServiceAccount`
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    ReconciliationMode::ServiceAccount.to_string()
}

impl ImagePullSecretManagerSpec {
    /// Parse the declared mode. Read fresh on every reconcile.
    pub fn reconciliation_mode(&self) -> Result<ReconciliationMode> {
        self.mode.parse()
    }
}

/// No status is reported yet
#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct ImagePullSecretManagerStatus {}

/// A single pull secret, either a reference to an existing secret or inline credentials
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePullSecretSpec {
    /// Existing `kubernetes.io/dockerconfigjson` secret in the same namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_secret_ref: Option<SecretReference>,
    /// Registry hostname the credentials are for
    #[serde(default)]
    pub registry: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Required by at least Docker Hub
    #[serde(default)]
    pub email: String,
    /// Name of the secret to create
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct SecretReference {
    #[serde(default)]
    pub name: String,
}

/// Where the credentials of a spec come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource<'a> {
    Existing(&'a str),
    Inline(InlineCredentials<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineCredentials<'a> {
    pub name: &'a str,
    pub registry: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
}

impl ImagePullSecretSpec {
    /// Classify the spec. Returns `None` for partially filled inline credentials,
    /// which must be skipped rather than materialized.
    pub fn source(&self) -> Option<CredentialSource<'_>> {
        if let Some(existing) = self
            .existing_secret_ref
            .as_ref()
            .filter(|r| !r.name.is_empty())
        {
            return Some(CredentialSource::Existing(&existing.name));
        }

        let fields = [
            &self.name,
            &self.registry,
            &self.username,
            &self.password,
            &self.email,
        ];
        if fields.iter().any(|f| f.is_empty()) {
            return None;
        }

        Some(CredentialSource::Inline(InlineCredentials {
            name: &self.name,
            registry: &self.registry,
            username: &self.username,
            password: &self.password,
            email: &self.email,
        }))
    }
}

/// The kind of resource pull secrets are attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationMode {
    Pod,
    ServiceAccount,
}

impl FromStr for ReconciliationMode {
    type Err = CheironError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pod" => Ok(ReconciliationMode::Pod),
            "ServiceAccount" => Ok(ReconciliationMode::ServiceAccount),
            other => Err(CheironError::UnsupportedMode(other.to_string())),
        }
    }
}

impl fmt::Display for ReconciliationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationMode::Pod => f.write_str("Pod"),
            ReconciliationMode::ServiceAccount => f.write_str("ServiceAccount"),
        }
    }
}
