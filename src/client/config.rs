// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::cache::DEFAULT_TYPE_CACHE_CAPACITY;
use crate::model::RootLocator;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8123;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue { key: String, value: String, reason: String },
}

fn invalid(key: &str, value: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_owned(), value: value.into(), reason: reason.into() }
}

/// Where a remote model lives and how the driver treats it.
///
/// Every field has a default, so a config file only names what differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Project to ensure open right after connecting.
    pub project_url: Option<String>,
    /// `mdel://` locator scoping every query and creation.
    pub root_element_hyperlink: Option<String>,
    pub close_on_disposal: bool,
    pub store_on_disposal: bool,
    pub type_cache_capacity: usize,
    pub shutdown_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            project_url: None,
            root_element_hyperlink: None,
            close_on_disposal: false,
            store_on_disposal: false,
            type_cache_capacity: DEFAULT_TYPE_CACHE_CAPACITY,
            shutdown_timeout_ms: 5_000,
        }
    }
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port, ..Self::default() }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Self::parse(Path::new("<inline>"), input)
    }

    /// Reads a TOML file, then applies `MODELWIRE_*` overrides from the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::parse(path, &input)?.with_env()
    }

    fn parse(path: &Path, input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(input).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("MODELWIRE_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("MODELWIRE_PORT") {
            self.port = port.trim().parse().map_err(|_| invalid("MODELWIRE_PORT", port.clone(), "not a port number"))?;
        }
        if let Some(url) = lookup("MODELWIRE_PROJECT_URL") {
            self.project_url = non_empty(url);
        }
        if let Some(root) = lookup("MODELWIRE_ROOT_ELEMENT") {
            self.root_element_hyperlink = non_empty(root);
        }
        if let Some(flag) = lookup("MODELWIRE_CLOSE_ON_DISPOSAL") {
            self.close_on_disposal = parse_flag("MODELWIRE_CLOSE_ON_DISPOSAL", &flag)?;
        }
        if let Some(flag) = lookup("MODELWIRE_STORE_ON_DISPOSAL") {
            self.store_on_disposal = parse_flag("MODELWIRE_STORE_ON_DISPOSAL", &flag)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(invalid("host", self.host.clone(), "must not be empty"));
        }
        if self.port == 0 {
            return Err(invalid("port", "0", "must be between 1 and 65535"));
        }
        if let Some(root) = &self.root_element_hyperlink {
            RootLocator::parse(root).map_err(|err| invalid("root_element_hyperlink", root.clone(), err.to_string()))?;
        }
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(key, raw, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = ConnectionConfig::from_toml_str("").expect("parse");
        assert_eq!(config, ConnectionConfig::default());
        assert_eq!(config.port, 8123);
        assert_eq!(config.type_cache_capacity, 100);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn toml_fields_override_defaults() {
        let config = ConnectionConfig::from_toml_str(
            r#"
            host = "modeler.local"
            port = 9000
            project_url = "file:///tmp/zoo.json"
            root_element_hyperlink = "mdel://_zoo_test"
            store_on_disposal = true
            "#,
        )
        .expect("parse");
        assert_eq!(config.host, "modeler.local");
        assert_eq!(config.port, 9000);
        assert_eq!(config.project_url.as_deref(), Some("file:///tmp/zoo.json"));
        assert!(config.store_on_disposal);
        assert!(!config.close_on_disposal);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ConnectionConfig::from_toml_str("hots = \"x\"").expect_err("typo");
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn environment_overrides_win() {
        let config = ConnectionConfig::default()
            .with_overrides(env(&[
                ("MODELWIRE_HOST", "10.0.0.7"),
                ("MODELWIRE_PORT", "7001"),
                ("MODELWIRE_PROJECT_URL", "  "),
                ("MODELWIRE_CLOSE_ON_DISPOSAL", "yes"),
            ]))
            .expect("overrides");
        assert_eq!(config.host, "10.0.0.7");
        assert_eq!(config.port, 7001);
        assert_eq!(config.project_url, None);
        assert!(config.close_on_disposal);
    }

    #[rstest]
    #[case("MODELWIRE_PORT", "eighty")]
    #[case("MODELWIRE_PORT", "0")]
    #[case("MODELWIRE_STORE_ON_DISPOSAL", "maybe")]
    #[case("MODELWIRE_ROOT_ELEMENT", "http://elsewhere")]
    #[case("MODELWIRE_HOST", " ")]
    fn invalid_overrides_are_reported(#[case] key: &str, #[case] value: &str) {
        let err = ConnectionConfig::default().with_overrides(env(&[(key, value)])).expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidValue { .. }), "{err}");
    }

    #[test]
    fn load_reports_missing_files() {
        let err = ConnectionConfig::load("/definitely/not/here/modelwire.toml").expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
