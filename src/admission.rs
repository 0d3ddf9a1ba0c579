// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

//! Watch-level admission filter for the attachment reconcilers.
//!
//! Pods and service accounts are watched cluster wide, so events for objects
//! that were already handled are dropped before they reach the work queue.

use crate::protocol;
use kube::runtime::{reflector::ObjectRef, watcher};
use kube::Resource;
use std::collections::HashMap;
use std::mem;
use tracing::trace;

/// Lifecycle event of a watched object, with the handled marker before and after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectEvent {
    Created,
    Updated { was_handled: bool, is_handled: bool },
    Deleted,
}

/// Decide whether an event should enqueue a reconcile.
///
/// Creations always pass, deletions never do. An update is dropped only when
/// the object was handled before and still is, so the manager resetting the
/// marker re-admits the object.
pub fn admit(event: ObjectEvent) -> bool {
    match event {
        ObjectEvent::Created => true,
        ObjectEvent::Updated {
            was_handled,
            is_handled,
        } => !(was_handled && is_handled),
        ObjectEvent::Deleted => false,
    }
}

/// Turns a raw watcher stream into admitted objects.
///
/// The watcher only reports the current state of an object, so the handled
/// marker of the previous state is remembered per object.
pub struct AdmissionTracker<K: Resource<DynamicType = ()>> {
    seen: HashMap<ObjectRef<K>, bool>,
    /// Objects known before the current relist started
    relisting: Option<HashMap<ObjectRef<K>, bool>>,
}

impl<K: Resource<DynamicType = ()>> Default for AdmissionTracker<K> {
    fn default() -> Self {
        Self {
            seen: HashMap::new(),
            relisting: None,
        }
    }
}

impl<K: Resource<DynamicType = ()>> AdmissionTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a watcher event and return the object if it is admitted
    pub fn observe(&mut self, event: watcher::Event<K>) -> Option<K> {
        match event {
            watcher::Event::Init => {
                self.relisting = Some(mem::take(&mut self.seen));
                None
            }
            watcher::Event::InitApply(obj) => {
                let key = ObjectRef::from_obj(&obj);
                let previous = self
                    .relisting
                    .as_mut()
                    .and_then(|known| known.remove(&key))
                    .or_else(|| self.seen.get(&key).copied());
                self.classify(obj, previous)
            }
            watcher::Event::InitDone => {
                self.relisting = None;
                None
            }
            watcher::Event::Apply(obj) => {
                let previous = self.seen.get(&ObjectRef::from_obj(&obj)).copied();
                self.classify(obj, previous)
            }
            watcher::Event::Delete(obj) => {
                let key = ObjectRef::from_obj(&obj);
                self.seen.remove(&key);
                if let Some(known) = self.relisting.as_mut() {
                    known.remove(&key);
                }
                admit(ObjectEvent::Deleted).then_some(obj)
            }
        }
    }

    fn classify(&mut self, obj: K, previous: Option<bool>) -> Option<K> {
        let is_handled = protocol::is_handled(obj.meta());
        self.seen.insert(ObjectRef::from_obj(&obj), is_handled);

        let event = match previous {
            None => ObjectEvent::Created,
            Some(was_handled) => ObjectEvent::Updated {
                was_handled,
                is_handled,
            },
        };

        if admit(event) {
            Some(obj)
        } else {
            trace!(
                "Dropping update for already reconciled {:?}",
                obj.meta().name
            );
            None
        }
    }

    /// Number of objects currently tracked
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::annotations;
    use k8s_openapi::api::core::v1::Pod;
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    fn make_pod(name: &str, handled: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                annotations: handled.map(|v| {
                    BTreeMap::from([(annotations::IS_RECONCILED.to_string(), v.to_string())])
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_admit_rules() {
        assert!(admit(ObjectEvent::Created));
        assert!(!admit(ObjectEvent::Deleted));
        assert!(admit(ObjectEvent::Updated {
            was_handled: false,
            is_handled: false
        }));
        assert!(admit(ObjectEvent::Updated {
            was_handled: false,
            is_handled: true
        }));
        assert!(admit(ObjectEvent::Updated {
            was_handled: true,
            is_handled: false
        }));
        assert!(!admit(ObjectEvent::Updated {
            was_handled: true,
            is_handled: true
        }));
    }

    #[test]
    fn test_creation_of_handled_object_is_admitted() {
        let mut tracker = AdmissionTracker::new();
        let admitted = tracker.observe(watcher::Event::Apply(make_pod("web", Some("true"))));
        assert!(admitted.is_some());
    }

    #[test]
    fn test_updates_of_handled_object_are_dropped() {
        let mut tracker = AdmissionTracker::new();
        tracker.observe(watcher::Event::Apply(make_pod("web", None)));
        assert!(tracker
            .observe(watcher::Event::Apply(make_pod("web", Some("true"))))
            .is_some());

        assert!(tracker
            .observe(watcher::Event::Apply(make_pod("web", Some("true"))))
            .is_none());
    }

    #[test]
    fn test_reset_marker_readmits_object() {
        let mut tracker = AdmissionTracker::new();
        tracker.observe(watcher::Event::Apply(make_pod("web", Some("true"))));

        let admitted = tracker.observe(watcher::Event::Apply(make_pod("web", Some("false"))));
        assert!(admitted.is_some());
    }

    #[test]
    fn test_delete_is_never_admitted_and_forgets_object() {
        let mut tracker = AdmissionTracker::new();
        tracker.observe(watcher::Event::Apply(make_pod("web", Some("true"))));

        assert!(tracker
            .observe(watcher::Event::Delete(make_pod("web", Some("true"))))
            .is_none());
        assert!(tracker.is_empty());

        // Recreated under the same name counts as a creation
        assert!(tracker
            .observe(watcher::Event::Apply(make_pod("web", Some("true"))))
            .is_some());
    }

    #[test]
    fn test_relist_keeps_known_state_and_drops_vanished_objects() {
        let mut tracker = AdmissionTracker::new();
        tracker.observe(watcher::Event::Apply(make_pod("web", Some("true"))));
        tracker.observe(watcher::Event::Apply(make_pod("gone", None)));

        tracker.observe(watcher::Event::Init);
        let web = tracker.observe(watcher::Event::InitApply(make_pod("web", Some("true"))));
        let fresh = tracker.observe(watcher::Event::InitApply(make_pod("fresh", None)));
        tracker.observe(watcher::Event::InitDone);

        assert!(web.is_none(), "handled object should stay suppressed");
        assert!(fresh.is_some());
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_objects_are_tracked_per_namespace() {
        let mut tracker = AdmissionTracker::new();
        tracker.observe(watcher::Event::Apply(make_pod("web", Some("true"))));

        let mut other = make_pod("web", Some("true"));
        other.metadata.namespace = Some("other".to_string());

        assert!(tracker.observe(watcher::Event::Apply(other)).is_some());
    }
}
