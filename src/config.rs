//! Application configuration
//!
//! Every component takes an [`AppConfig`] (or the pieces it needs) at
//! construction. Defaults reproduce the original fixed setup; a TOML or JSON
//! file can override any subset of fields.
//!
//! Lookup order for the config file:
//! 1. `MDR_LETTERS_CONFIG` (also read from a `.env` file)
//! 2. `<config dir>/mdr-letters/config.toml`, if it exists
//! 3. Built-in defaults

use crate::error::{OrganizerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Env var naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MDR_LETTERS_CONFIG";

/// Postal codes used by the default recipient table
pub const MARKER_W6_0XE: &str = "W6 0XE";
pub const MARKER_HA0_2NJ: &str = "HA0 2NJ";
pub const MARKER_M20_6RE: &str = "M20 6RE";
pub const MARKER_EC4A_1NL: &str = "EC4A 1NL";
pub const MARKER_EC2V_7HN: &str = "EC2V 7HN";

/// Output root names used by the default recipient table
pub const BHUPEN_ROOT: &str = "bhupen";
pub const KAMBIZ_ROOT: &str = "kambiz";

/// A named destination tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRoot {
    pub name: String,
    pub path: PathBuf,
}

/// One row of the recipient table
///
/// Matches when every marker is present in the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRule {
    pub markers: Vec<String>,
    pub recipient: String,
    /// Output root names; the first is the move target, the rest get copies
    pub destinations: Vec<String>,
}

/// Recipient used when no rule matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRecipient {
    pub recipient: String,
    pub destinations: Vec<String>,
}

/// What the sequencer does with files whose bracketed date does not parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndatedPolicy {
    /// Leave them temp-marked and report them as warnings
    #[default]
    Warn,
    /// Fail the folder pass after sequencing the dated files
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where new, unsorted PDFs are picked up from
    pub input_directory: PathBuf,

    /// Organization named at the start of every canonical filename
    pub organization: String,

    /// Destination trees, in the order they are validated and sequenced
    pub output_roots: Vec<OutputRoot>,

    /// Ordered recipient table, first match wins
    pub recipient_rules: Vec<RecipientRule>,

    pub default_recipient: DefaultRecipient,

    /// Extensions (with dot) checked by the lock validator
    pub supported_extensions: Vec<String>,

    /// Prefix marking a file mid-sequencing
    pub temp_prefix: String,

    /// PDF Info dictionary entries written by the metadata scrub
    pub metadata_overrides: BTreeMap<String, String>,

    pub undated_policy: UndatedPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        let rule = |markers: &[&str], recipient: &str, destinations: &[&str]| RecipientRule {
            markers: markers.iter().map(|m| m.to_string()).collect(),
            recipient: recipient.to_string(),
            destinations: destinations.iter().map(|d| d.to_string()).collect(),
        };

        let metadata_overrides = ["Title", "Author", "Subject", "Keywords", "Producer", "Creator"]
            .iter()
            .map(|key| (key.to_string(), String::new()))
            .collect();

        Self {
            input_directory: PathBuf::from(r"C:\Users\Bhupen Varsani\Downloads\PDF"),
            organization: "Mishcon de Reya".to_string(),
            output_roots: vec![
                OutputRoot {
                    name: BHUPEN_ROOT.to_string(),
                    path: PathBuf::from(
                        r"G:\Shared drives\Legal\One Unique LLC -v- Kambiz Babaee\Bhupen Varsani\Civil\Mishcon de Reya",
                    ),
                },
                OutputRoot {
                    name: KAMBIZ_ROOT.to_string(),
                    path: PathBuf::from(
                        r"G:\Shared drives\Legal\One Unique LLC -v- Kambiz Babaee\Kambiz Babaee\Civil\Mishcon de Reya",
                    ),
                },
            ],
            recipient_rules: vec![
                rule(
                    &[MARKER_W6_0XE, MARKER_HA0_2NJ, MARKER_M20_6RE],
                    "All Defendants",
                    &[BHUPEN_ROOT, KAMBIZ_ROOT],
                ),
                rule(
                    &[MARKER_W6_0XE, MARKER_HA0_2NJ],
                    "Kambiz Babaee & Bhupen Varsani",
                    &[BHUPEN_ROOT, KAMBIZ_ROOT],
                ),
                rule(&[MARKER_W6_0XE], "Kambiz Babaee", &[KAMBIZ_ROOT]),
                rule(&[MARKER_HA0_2NJ], "Bhupen Varsani", &[BHUPEN_ROOT]),
                rule(&[MARKER_M20_6RE], "Fortis Insolvency", &[KAMBIZ_ROOT]),
                rule(
                    &[MARKER_EC4A_1NL],
                    "London Circuit Commercial Court",
                    &[KAMBIZ_ROOT],
                ),
                rule(&[MARKER_EC2V_7HN], "Lloyds Banking Group", &[KAMBIZ_ROOT]),
            ],
            default_recipient: DefaultRecipient {
                recipient: "Kambiz Babaee".to_string(),
                destinations: vec![KAMBIZ_ROOT.to_string()],
            },
            supported_extensions: [".pdf", ".docx", ".xlsx", ".gdoc"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            temp_prefix: "temp_".to_string(),
            metadata_overrides,
            undated_policy: UndatedPolicy::Warn,
        }
    }
}

impl AppConfig {
    /// Resolve and load the configuration, falling back to defaults
    pub fn load() -> Result<Self> {
        // Load .env file - try the working directory only
        let _ = dotenvy::dotenv();

        let config = if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            tracing::info!("Loading configuration from {} ({})", path, CONFIG_ENV_VAR);
            Self::load_from(Path::new(&path))?
        } else if let Some(path) = Self::default_config_path().filter(|p| p.exists()) {
            tracing::info!("Loading configuration from {}", path.display());
            Self::load_from(&path)?
        } else {
            tracing::info!("No configuration file found, using built-in defaults");
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a config file; `.json` goes through serde_json, anything else through toml
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OrganizerError::io(path, e))?;

        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&contents).map_err(|e| {
                OrganizerError::config(format!("Failed to parse {}: {}", path.display(), e))
            })
        } else {
            toml::from_str(&contents).map_err(|e| {
                OrganizerError::config(format!("Failed to parse {}: {}", path.display(), e))
            })
        }
    }

    /// `<config dir>/mdr-letters/config.toml`
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mdr-letters").join("config.toml"))
    }

    /// Reject configurations the workflow cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.temp_prefix.is_empty() {
            return Err(OrganizerError::config("temp_prefix must not be empty"));
        }

        if self.output_roots.is_empty() {
            return Err(OrganizerError::config("at least one output root is required"));
        }

        let mut names = HashSet::new();
        for root in &self.output_roots {
            if !names.insert(root.name.as_str()) {
                return Err(OrganizerError::config(format!(
                    "duplicate output root name: {}",
                    root.name
                )));
            }
        }

        for rule in &self.recipient_rules {
            if rule.markers.is_empty() {
                return Err(OrganizerError::config(format!(
                    "rule for '{}' has no markers",
                    rule.recipient
                )));
            }
            self.check_destinations(&rule.recipient, &rule.destinations, &names)?;
        }

        self.check_destinations(
            &self.default_recipient.recipient,
            &self.default_recipient.destinations,
            &names,
        )
    }

    fn check_destinations(
        &self,
        recipient: &str,
        destinations: &[String],
        known: &HashSet<&str>,
    ) -> Result<()> {
        if destinations.is_empty() {
            return Err(OrganizerError::config(format!(
                "recipient '{}' has no destinations",
                recipient
            )));
        }

        match destinations.iter().find(|d| !known.contains(d.as_str())) {
            Some(unknown) => Err(OrganizerError::config(format!(
                "recipient '{}' names unknown output root '{}'",
                recipient, unknown
            ))),
            None => Ok(()),
        }
    }

    /// Look up an output root path by name
    pub fn root_path(&self, name: &str) -> Option<&Path> {
        self.output_roots
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.path.as_path())
    }

    /// Whether the lock validator should probe this file
    pub fn is_supported(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        self.supported_extensions
            .iter()
            .any(|ext| name.ends_with(&ext.to_lowercase()))
    }
}
