// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the CNPJ registry lookup client.
//!
//! Defaults match the public CNPJ registry API limits (3 requests per
//! minute).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings fixed at client construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Registry base URL; the normalized CNPJ is appended (default: https://publica.cnpj.ws/cnpj/)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Server-declared requests per minute; 0 disables client throttling (default: 3)
    #[serde(default = "default_max_rate_rpm")]
    pub max_rate_rpm: u32,

    /// Default HTTP request timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Longest server-declared release wait honoured, in seconds (default: 900)
    #[serde(default = "default_max_release_wait_secs")]
    pub max_release_wait_secs: u64,

    /// Consecutive 429 responses tolerated for one lookup (default: 5)
    #[serde(default = "default_max_throttle_retries")]
    pub max_throttle_retries: u32,
}

// Default value functions
fn default_base_url() -> String {
    "https://publica.cnpj.ws/cnpj/".to_string()
}

fn default_max_rate_rpm() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_release_wait_secs() -> u64 {
    900 // 15 minutes
}

fn default_max_throttle_retries() -> u32 {
    5
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_rate_rpm: default_max_rate_rpm(),
            timeout_secs: default_timeout_secs(),
            max_release_wait_secs: default_max_release_wait_secs(),
            max_throttle_retries: default_max_throttle_retries(),
        }
    }
}

impl LookupConfig {
    /// Get the default request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the release wait cap
    pub fn max_release_wait(&self) -> Duration {
        Duration::from_secs(self.max_release_wait_secs)
    }
}
