// Copyright 2026, The Cheiron Authors
// SPDX-License-Identifier: Apache-2.0
pub mod admission;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod kubernetes;
pub mod protocol;
pub mod reconcilers;
pub mod selector;
pub mod types;

#[cfg(test)]
pub mod test_utils;
