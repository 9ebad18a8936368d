//! Configuration file handling.
//!
//! Configuration can be loaded from a TOML or YAML file given on the command
//! line, and is then extended with values from command-line flags.
//!
//! # Supported Keys
//!
//! | Key | Type | Default |
//! |-----|------|---------|
//! | `ignore_ids` | list of vulnerability IDs | `[]` |
//! | `severities` | list of severity levels | `["critical"]` |
//!
//! Any other key is rejected.
//!
//! # Example Configuration
//!
//! ```toml
//! ignore_ids = ["GHSA-xxxx-xxxx-xxxx"]
//! severities = ["critical", "high"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::model::Severity;

/// Settings for a constraints run.
///
/// # Example
///
/// ```
/// use security_constraints::{Configuration, Severity};
///
/// let mut config = Configuration::default();
/// config.merge_cli(vec!["GHSA-1234".to_string()], vec![Severity::High]);
///
/// assert_eq!(config.ignore_ids, vec!["GHSA-1234"]);
/// assert_eq!(config.severities, vec![Severity::Critical, Severity::High]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    /// Vulnerability identifiers to leave out of the output.
    pub ignore_ids: Vec<String>,

    /// Severity levels to request from advisory sources.
    pub severities: Vec<Severity>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            ignore_ids: Vec::new(),
            severities: vec![Severity::Critical],
        }
    }
}

impl Configuration {
    /// Keys accepted in a configuration file.
    pub fn supported_keys() -> &'static [&'static str] {
        &["ignore_ids", "severities"]
    }

    /// Loads configuration from a file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not TOML or YAML,
    /// or contains unknown keys or invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content).map_err(|message| ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            }),
            Some("yaml") | Some("yml") => {
                Self::from_yaml_str(&content).map_err(|message| ConfigError::Parse {
                    path: path.to_path_buf(),
                    message,
                })
            }
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    fn from_yaml_str(content: &str) -> Result<Self, String> {
        // An empty YAML document deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Appends values given on the command line, each list sorted first.
    ///
    /// Duplicates are kept; ignore filtering is a membership test and
    /// [`requested_severities`](Self::requested_severities) deduplicates.
    pub fn merge_cli(&mut self, mut ignore_ids: Vec<String>, mut severities: Vec<Severity>) {
        ignore_ids.sort();
        severities.sort();
        self.ignore_ids.extend(ignore_ids);
        self.severities.extend(severities);
    }

    /// Returns the distinct severities to request, lowest first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSeverities`] if none are configured.
    pub fn requested_severities(&self) -> Result<Vec<Severity>, ConfigError> {
        let distinct: BTreeSet<Severity> = self.severities.iter().copied().collect();
        if distinct.is_empty() {
            return Err(ConfigError::NoSeverities);
        }
        Ok(distinct.into_iter().collect())
    }

    pub fn is_ignored(&self, identifier: &str) -> bool {
        self.ignore_ids.iter().any(|id| id == identifier)
    }

    /// Renders the configuration as a TOML document usable as a config file.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_default() {
        let config = Configuration::default();

        assert!(config.ignore_ids.is_empty());
        assert_eq!(config.severities, vec![Severity::Critical]);
    }

    #[test]
    fn test_load_toml() {
        let file = write_config(
            ".toml",
            "ignore_ids = [\"GHSA-aaaa\"]\nseverities = [\"high\", \"critical\"]\n",
        );

        let config = Configuration::load(file.path()).unwrap();

        assert_eq!(config.ignore_ids, vec!["GHSA-aaaa"]);
        assert_eq!(config.severities, vec![Severity::High, Severity::Critical]);
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(".yaml", "ignore_ids:\n  - GHSA-bbbb\nseverities:\n  - low\n");

        let config = Configuration::load(file.path()).unwrap();

        assert_eq!(config.ignore_ids, vec!["GHSA-bbbb"]);
        assert_eq!(config.severities, vec![Severity::Low]);
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let file = write_config(".toml", "ignore_ids = [\"GHSA-cccc\"]\n");

        let config = Configuration::load(file.path()).unwrap();

        assert_eq!(config.severities, vec![Severity::Critical]);
    }

    #[test]
    fn test_load_empty_yaml_is_default() {
        let file = write_config(".yml", "");

        let config = Configuration::load(file.path()).unwrap();

        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_load_rejects_unknown_key() {
        let file = write_config(".toml", "ignore_ids = []\ncolour = \"blue\"\n");

        let err = Configuration::load(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { ref message, .. } if message.contains("colour")));
    }

    #[test]
    fn test_load_rejects_unknown_key_yaml() {
        let file = write_config(".yaml", "verbose: true\n");

        let err = Configuration::load(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_rejects_invalid_severity() {
        let file = write_config(".toml", "severities = [\"urgent\"]\n");

        assert!(matches!(
            Configuration::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = write_config(".ini", "severities = critical\n");

        assert!(matches!(
            Configuration::load(file.path()),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let err = Configuration::load(dir.path().join("missing.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_merge_cli_appends_sorted_values() {
        let mut config = Configuration {
            ignore_ids: vec!["GHSA-zzzz".to_string()],
            severities: vec![Severity::High],
        };

        config.merge_cli(
            vec!["GHSA-bbbb".to_string(), "GHSA-aaaa".to_string()],
            vec![Severity::Critical, Severity::High],
        );

        assert_eq!(config.ignore_ids, vec!["GHSA-zzzz", "GHSA-aaaa", "GHSA-bbbb"]);
        assert_eq!(
            config.severities,
            vec![Severity::High, Severity::High, Severity::Critical]
        );
    }

    #[test]
    fn test_requested_severities_deduplicates() {
        let config = Configuration {
            ignore_ids: vec![],
            severities: vec![Severity::Critical, Severity::Low, Severity::Critical],
        };

        assert_eq!(
            config.requested_severities().unwrap(),
            vec![Severity::Low, Severity::Critical]
        );
    }

    #[test]
    fn test_requested_severities_requires_one() {
        let config = Configuration {
            ignore_ids: vec![],
            severities: vec![],
        };

        assert!(matches!(
            config.requested_severities(),
            Err(ConfigError::NoSeverities)
        ));
    }

    #[test]
    fn test_is_ignored() {
        let config = Configuration {
            ignore_ids: vec!["GHSA-aaaa".to_string()],
            severities: vec![Severity::Critical],
        };

        assert!(config.is_ignored("GHSA-aaaa"));
        assert!(!config.is_ignored("GHSA-bbbb"));
    }

    #[test]
    fn test_to_toml_loads_back() {
        let config = Configuration {
            ignore_ids: vec!["GHSA-aaaa".to_string()],
            severities: vec![Severity::Moderate],
        };
        let file = write_config(".toml", &config.to_toml().unwrap());

        assert_eq!(Configuration::load(file.path()).unwrap(), config);
    }

    #[test]
    fn test_supported_keys_match_fields() {
        let toml = Configuration::default().to_toml().unwrap();
        for key in Configuration::supported_keys() {
            assert!(toml.contains(key), "missing {} in {}", key, toml);
        }
    }

    #[test]
    fn test_display_is_compact_json() {
        assert_eq!(
            Configuration::default().to_string(),
            r#"{"ignore_ids":[],"severities":["critical"]}"#
        );
    }
}
