// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Prints the ImagePullSecretManager CRD manifest as YAML.

use cheiron::types::ImagePullSecretManager;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&ImagePullSecretManager::crd())?);
    Ok(())
}
