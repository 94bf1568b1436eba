//! Recipient classification.
//!
//! Evaluates the configured recipient table against document text. Rules
//! are checked in order and the first rule whose markers are all present
//! wins, so multi-marker rules must be listed before their subsets.

use crate::config::{AppConfig, DefaultRecipient, RecipientRule};
use std::path::PathBuf;

/// Who a letter is addressed to and where it gets filed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub recipient: String,
    /// First entry is the move target, the rest receive copies
    pub destinations: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RecipientClassifier {
    rules: Vec<RecipientRule>,
    default: DefaultRecipient,
    roots: Vec<(String, PathBuf)>,
}

impl RecipientClassifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            rules: config.recipient_rules.clone(),
            default: config.default_recipient.clone(),
            roots: config
                .output_roots
                .iter()
                .map(|r| (r.name.clone(), r.path.clone()))
                .collect(),
        }
    }

    /// Map document text to a recipient and its destination folders
    pub fn classify(&self, text: &str) -> Classification {
        let matched = self
            .rules
            .iter()
            .find(|rule| rule.markers.iter().all(|m| text.contains(m.as_str())));

        let (recipient, names) = match matched {
            Some(rule) => (&rule.recipient, &rule.destinations),
            None => (&self.default.recipient, &self.default.destinations),
        };

        tracing::debug!(
            "Classified as '{}' ({})",
            recipient,
            if matched.is_some() { "rule" } else { "default" }
        );

        Classification {
            recipient: recipient.clone(),
            destinations: self.resolve(names),
        }
    }

    /// Names unknown to the config are dropped (AppConfig::validate rejects them up front)
    fn resolve(&self, names: &[String]) -> Vec<PathBuf> {
        names
            .iter()
            .filter_map(|name| {
                let path = self
                    .roots
                    .iter()
                    .find(|(root, _)| root == name)
                    .map(|(_, path)| path.clone());
                if path.is_none() {
                    tracing::warn!("Unknown output root '{}' in recipient table", name);
                }
                path
            })
            .collect()
    }
}
