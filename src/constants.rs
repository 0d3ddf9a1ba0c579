// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0

/// Annotation keys shared by the manager and attachment reconcilers
pub mod annotations {
    /// Set to "true" by the manager once an object is claimed. Never cleared.
    pub const RECONCILABLE: &str = "cheiron.anny.co/reconcilable";
    /// Set to "true" by the object owner to opt out permanently
    pub const IGNORE: &str = "cheiron.anny.co/ignore";
    /// Comma separated names of the pull secrets to attach
    pub const RECONCILE_WITH: &str = "cheiron.anny.co/reconcile-with";
    /// Set to "true" by an attachment reconciler once the current secret set is applied
    pub const IS_RECONCILED: &str = "cheiron.anny.co/is-reconciled";
}

/// The operator name, used as field manager and in log output
pub const OPERATOR_NAME: &str = "cheiron";

/// Registry credential secret layout
pub mod secret {
    /// Secret type for docker config json payloads
    pub const DOCKER_CONFIG_JSON_TYPE: &str = "kubernetes.io/dockerconfigjson";
    /// Data key holding the serialized docker config
    pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
