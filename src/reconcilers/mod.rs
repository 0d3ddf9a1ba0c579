// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod attachment;
pub mod backoff;
pub mod manager;

pub use attachment::AttachmentReconciler;
pub use manager::ManagerReconciler;
