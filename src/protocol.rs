// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Annotation protocol shared by the manager and the attachment reconcilers.
//!
//! The reconcilers never call each other. The manager claims objects and
//! writes the secret set to attach; an attachment reconciler reads it, applies
//! it and marks the object as handled. Watch events deliver the writes.

use crate::constants::annotations;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

const TRUE: &str = "true";
const FALSE: &str = "false";

/// Result of the manager's claim write on a single object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Object opted out, left untouched
    Ignored,
    /// Already claimed with the same secret set, nothing to write
    Unchanged,
    /// Claimed for the first time
    Claimed,
    /// Already claimed, secret set changed
    Retargeted,
}

pub fn annotation<'a>(meta: &'a ObjectMeta, key: &str) -> Option<&'a str> {
    meta.annotations
        .as_ref()
        .and_then(|a| a.get(key))
        .map(String::as_str)
}

fn is_true(meta: &ObjectMeta, key: &str) -> bool {
    annotation(meta, key) == Some(TRUE)
}

/// Claimed by the manager. Any value other than "true" counts as unclaimed.
pub fn is_claimed(meta: &ObjectMeta) -> bool {
    is_true(meta, annotations::RECONCILABLE)
}

/// Opted out by the object owner
pub fn is_ignored(meta: &ObjectMeta) -> bool {
    is_true(meta, annotations::IGNORE)
}

/// The current secret set has been applied by an attachment reconciler
pub fn is_handled(meta: &ObjectMeta) -> bool {
    is_true(meta, annotations::IS_RECONCILED)
}

/// Secret names to attach, trimmed, empty entries dropped
pub fn reconcile_with(meta: &ObjectMeta) -> Vec<String> {
    annotation(meta, annotations::RECONCILE_WITH)
        .map(parse_secret_names)
        .unwrap_or_default()
}

pub fn parse_secret_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_secret_names(names: &[String]) -> String {
    names.join(",")
}

/// Claim an object for the given secret set.
///
/// `reconcile-with` is always overwritten with the full set, never merged.
/// Any write resets the handled marker so the attachment reconciler picks the
/// object up again.
pub fn claim(meta: &mut ObjectMeta, secrets: &str) -> ClaimOutcome {
    if is_ignored(meta) {
        return ClaimOutcome::Ignored;
    }

    let first_claim = !is_claimed(meta);
    let retarget = annotation(meta, annotations::RECONCILE_WITH) != Some(secrets);

    if !first_claim && !retarget {
        return ClaimOutcome::Unchanged;
    }

    let values = meta.annotations.get_or_insert_with(BTreeMap::new);
    if first_claim {
        values.insert(annotations::RECONCILABLE.to_string(), TRUE.to_string());
        values.insert(annotations::IGNORE.to_string(), FALSE.to_string());
    }
    values.insert(annotations::RECONCILE_WITH.to_string(), secrets.to_string());
    values.insert(annotations::IS_RECONCILED.to_string(), FALSE.to_string());

    if first_claim {
        ClaimOutcome::Claimed
    } else {
        ClaimOutcome::Retargeted
    }
}

/// Record that the attachment reconciler applied the current secret set.
/// Returns whether the marker changed.
pub fn mark_handled(meta: &mut ObjectMeta) -> bool {
    if is_handled(meta) {
        return false;
    }
    meta.annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(annotations::IS_RECONCILED.to_string(), TRUE.to_string());
    true
}
