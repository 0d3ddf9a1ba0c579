// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Selection of the objects the manager claims within a namespace.

use crate::config::Config;
use kube::api::ListParams;

/// Enumerates the candidate objects in scope of a declaration
pub trait CandidateSelector: Send + Sync {
    fn list_params(&self) -> ListParams;

    fn describe(&self) -> String;
}

/// Every object in the namespace
#[derive(Debug, Clone, Default)]
pub struct NamespaceWide;

impl CandidateSelector for NamespaceWide {
    fn list_params(&self) -> ListParams {
        ListParams::default()
    }

    fn describe(&self) -> String {
        "all objects in namespace".to_string()
    }
}

/// Only objects matching a label selector
#[derive(Debug, Clone)]
pub struct LabelSelected {
    selector: String,
}

impl LabelSelected {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl CandidateSelector for LabelSelected {
    fn list_params(&self) -> ListParams {
        ListParams::default().labels(&self.selector)
    }

    fn describe(&self) -> String {
        format!("objects matching '{}'", self.selector)
    }
}

pub fn from_config(config: &Config) -> Box<dyn CandidateSelector> {
    match &config.candidate_label_selector {
        Some(selector) => Box::new(LabelSelected::new(selector.clone())),
        None => Box::new(NamespaceWide),
    }
}
