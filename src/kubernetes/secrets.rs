// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Pull secret creation and update

use crate::constants::secret::DOCKER_CONFIG_JSON_KEY;
use crate::credentials::new_docker_secret;
use crate::kubernetes::post_params;
use crate::error::{CheironError, Result};
use crate::types::{ImagePullSecretManager, InlineCredentials};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{Api, Client, Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Create or update the pull secret for inline credentials.
///
/// The whole payload is replaced on every call and the secret is owned by the
/// manager so it is garbage collected together with it.
#[instrument(skip(client, owner, credentials), fields(secret = %credentials.name))]
pub async fn upsert_pull_secret(
    client: &Client,
    owner: &ImagePullSecretManager,
    namespace: &str,
    credentials: &InlineCredentials<'_>,
) -> Result<Secret> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);

    let existing = secrets.get_opt(credentials.name).await?;
    let create = existing.is_none();
    let mut secret = existing.unwrap_or_else(|| new_docker_secret(credentials.name, namespace));

    let payload = credentials.docker_config_json()?;
    secret.data = Some(BTreeMap::from([(
        DOCKER_CONFIG_JSON_KEY.to_string(),
        ByteString(payload),
    )]));
    secret.string_data = None;

    set_controller_reference(&mut secret, owner)?;

    let pp = post_params();
    if create {
        info!(
            "Creating pull secret {}/{} for registry {}",
            namespace, credentials.name, credentials.registry
        );
        Ok(secrets.create(&pp, &secret).await?)
    } else {
        debug!(
            "Updating pull secret {}/{} for registry {}",
            namespace, credentials.name, credentials.registry
        );
        Ok(secrets.replace(credentials.name, &pp, &secret).await?)
    }
}

/// Make the manager the controlling owner of the secret.
/// Fails if a different controller already owns it.
pub fn set_controller_reference(secret: &mut Secret, owner: &ImagePullSecretManager) -> Result<()> {
    let owner_ref = owner
        .controller_owner_ref(&())
        .ok_or_else(|| CheironError::MissingUid(owner.name_any()))?;
    let secret_name = secret.name_any();

    let refs = secret.metadata.owner_references.get_or_insert_with(Vec::new);
    if refs
        .iter()
        .any(|r| r.controller == Some(true) && r.uid != owner_ref.uid)
    {
        return Err(CheironError::AlreadyOwned(secret_name));
    }

    refs.retain(|r| r.uid != owner_ref.uid);
    refs.push(owner_ref);
    Ok(())
}
