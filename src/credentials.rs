// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Docker config json payloads for registry pull secrets.

use crate::constants::secret::DOCKER_CONFIG_JSON_TYPE;
use crate::error::Result;
use crate::types::InlineCredentials;
use base64::{engine::general_purpose::STANDARD, Engine};
use k8s_openapi::api::core::v1::Secret;
use kube::api::ObjectMeta;
use serde::Serialize;
use std::collections::BTreeMap;

/// Local docker auth config as read by the kubelet
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DockerConfigJson {
    pub auths: BTreeMap<String, DockerConfigEntry>,
}

/// Credentials for a single registry
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DockerConfigEntry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth: String,
}

/// Basic auth token: base64 of `username:password`
pub fn encode_auth(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}

/// Serialize the docker config for a single registry
pub fn docker_config_json(
    username: &str,
    password: &str,
    email: &str,
    registry: &str,
) -> Result<Vec<u8>> {
    let entry = DockerConfigEntry {
        username: username.to_string(),
        password: password.to_string(),
        email: email.to_string(),
        auth: encode_auth(username, password),
    };
    let config = DockerConfigJson {
        auths: BTreeMap::from([(registry.to_string(), entry)]),
    };
    Ok(serde_json::to_vec(&config)?)
}

impl InlineCredentials<'_> {
    pub fn docker_config_json(&self) -> Result<Vec<u8>> {
        docker_config_json(self.username, self.password, self.email, self.registry)
    }
}

/// Scaffold of an empty dockerconfigjson secret
pub fn new_docker_secret(name: &str, namespace: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        type_: Some(DOCKER_CONFIG_JSON_TYPE.to_string()),
        data: Some(BTreeMap::new()),
        ..Default::default()
    }
}
