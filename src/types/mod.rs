// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Custom resource and attachment target types.

pub mod manager;
pub mod target;

pub use manager::{
    CredentialSource, ImagePullSecretManager, ImagePullSecretManagerSpec, ImagePullSecretSpec,
    InlineCredentials, ReconciliationMode,
};
pub use target::AttachmentTarget;
