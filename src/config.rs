// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Configuration parameters affecting the behaviour of this library.
//!

use dotenvy::var;
use std::sync::OnceLock;

/// Number of results per page when the caller does not say otherwise.
const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug)]
pub struct Config {
    result_limit: i64,
    trigram_extension: Option<String>,
}

static CONFIG: OnceLock<Config> = OnceLock::new();
/// This library configuration Singleton.
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

impl Default for Config {
    fn default() -> Self {
        let result_limit = var("RESULT_LIMIT")
            .ok()
            .and_then(|x| x.parse::<i64>().ok())
            .unwrap_or(DEFAULT_LIMIT);
        // absent means the deployment pre-loads the extension into every
        // connection; present means we load it ourselves on connect...
        let trigram_extension = var("TRIGRAM_EXTENSION").ok();

        Self {
            result_limit,
            trigram_extension,
        }
    }
}

impl Config {
    /// Return the configured default page size for search results.
    pub fn result_limit(&self) -> i64 {
        self.result_limit
    }

    /// Return the path of the loadable trigram/extent SQLite extension,
    /// if one was configured.
    pub fn trigram_extension(&self) -> Option<&str> {
        self.trigram_extension.as_deref()
    }
}
