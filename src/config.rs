// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use repeetcode_core::PolicyConfig;
use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

/// The file looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "repeetcode.toml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerSection,
    /// Path to the SQLite database file.
    pub database: PathBuf,
    pub policy: PolicyConfig,
    pub auth: AuthSection,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSection {
    /// Bearer token to user id.
    pub tokens: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            database: PathBuf::from("repeetcode.db"),
            policy: PolicyConfig::default(),
            auth: AuthSection::default(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(text)?;
        // Fail early on a bad policy table rather than on the first request.
        config.policy.build()?;
        Ok(config)
    }

    /// Loads the configuration from `path`. Without a path, the default file
    /// is read if it exists, and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Fallible<Self> {
        let path: PathBuf = match path {
            Some(path) => {
                if !path.exists() {
                    return fail(format!(
                        "configuration file '{}' does not exist.",
                        path.display()
                    ));
                }
                path.to_path_buf()
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    log::debug!("No configuration file found, using defaults");
                    return Ok(Config::default());
                }
                path
            }
        };
        log::debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(&path)?;
        Self::parse(&text)
    }
}
