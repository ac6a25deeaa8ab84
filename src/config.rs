//! Application configuration stored as a text resource in the Drive root
//! folder.
//!
//! The configuration is serialized as pretty JSON. When no remote config file
//! exists yet, [`default_app_configuration`] supplies a fixed starter set of
//! categories which is uploaded as-is; a config file that exists but fails to
//! parse is an error that propagates to the caller rather than silently
//! falling back to the defaults.

use crate::model::TransactionType;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// The application configuration loaded at bootstrap.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    /// Gates features that are not ready for every user.
    #[serde(default)]
    pub experimental_features: bool,

    /// Settings for the bulk-import path.
    #[serde(default)]
    pub import: ImportConfig,

    /// The categories offered when entering a movement.
    pub categories: Vec<TransactionCategory>,
}

impl AppConfig {
    /// Serializes the configuration to the text form stored remotely.
    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Unable to serialize the configuration")
    }

    /// Parses a downloaded configuration document.
    pub fn from_text(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse the remote configuration file")
    }
}

/// Settings for the bulk-import path.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ImportConfig {
    /// Rules rewriting imported transactions, applied first-match-wins.
    #[serde(default)]
    pub rewrites: Vec<TransactionRewrite>,
}

/// A category a transaction can be filed under.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionCategory {
    pub name: String,
    pub group: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

/// Whether a category tracks money going out or coming in.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    #[default]
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(CategoryKind);
serde_plain::derive_fromstr_from_deserialize!(CategoryKind);

impl From<CategoryKind> for TransactionType {
    fn from(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Expense => TransactionType::Expense,
            CategoryKind::Income => TransactionType::Income,
        }
    }
}

/// A rewrite rule applied to imported transactions: when every pattern in
/// `query` matches, the fields set in `patch` replace the transaction's.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionRewrite {
    pub query: RewriteQuery,
    pub patch: RewritePatch,
}

/// Regular-expression patterns selecting the transactions to rewrite. An
/// absent pattern matches anything.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RewriteQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Replacement values for a matched transaction. Only the fields that are set
/// overwrite anything.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RewritePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
}

/// The configuration used until the user stores their own: eleven expense
/// categories split across the `Necessities` and `Extra` groups. This list is
/// a fixed value; it must serialize and parse back to an equal configuration.
pub fn default_app_configuration() -> AppConfig {
    let category = |name: &str, group: &str| TransactionCategory {
        name: name.to_string(),
        group: group.to_string(),
        kind: CategoryKind::Expense,
    };
    AppConfig {
        experimental_features: false,
        import: ImportConfig::default(),
        categories: vec![
            category("Home", "Necessities"),
            category("Shopping", "Necessities"),
            category("Health", "Necessities"),
            category("Transports", "Necessities"),
            category("Telephone", "Necessities"),
            category("Clothes", "Necessities"),
            category("Entertainment", "Extra"),
            category("Presents", "Extra"),
            category("Culture", "Extra"),
            category("Lunch out", "Extra"),
            category("Other", "Extra"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_default_configuration_is_stable() {
        let config = default_app_configuration();
        assert_eq!(config.categories.len(), 11);
        let groups: BTreeSet<&str> = config
            .categories
            .iter()
            .map(|c| c.group.as_str())
            .collect();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains("Necessities"));
        assert!(groups.contains("Extra"));
        assert!(config
            .categories
            .iter()
            .all(|c| c.kind == CategoryKind::Expense));
        assert!(!config.experimental_features);
        assert!(config.import.rewrites.is_empty());
        assert_eq!(config, default_app_configuration());
    }

    #[test]
    fn test_default_configuration_round_trips() {
        let config = default_app_configuration();
        let text = config.to_text().unwrap();
        let parsed = AppConfig::from_text(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_minimal_document_parses_with_defaults() {
        let text = r#"{
            "categories": [
                { "name": "Home", "group": "Necessities", "type": "expense" }
            ]
        }"#;
        let config = AppConfig::from_text(text).unwrap();
        assert!(!config.experimental_features);
        assert!(config.import.rewrites.is_empty());
        assert_eq!(config.categories.len(), 1);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(AppConfig::from_text("experimental = maybe").is_err());
        assert!(AppConfig::from_text("{}").is_err());
    }

    #[test]
    fn test_rewrite_rules_parse() {
        let text = r#"{
            "categories": [],
            "import": {
                "rewrites": [
                    {
                        "query": { "notes": "^AMAZON", "type": "expense" },
                        "patch": { "category": "Shopping", "group": "Necessities" }
                    }
                ]
            }
        }"#;
        let config = AppConfig::from_text(text).unwrap();
        let rewrite = &config.import.rewrites[0];
        assert_eq!(rewrite.query.notes.as_deref(), Some("^AMAZON"));
        assert_eq!(rewrite.patch.category.as_deref(), Some("Shopping"));
        assert_eq!(rewrite.patch.kind, None);
    }

    #[test]
    fn test_category_kind_maps_to_transaction_type() {
        assert_eq!(
            crate::model::TransactionType::from(CategoryKind::Income),
            crate::model::TransactionType::Income
        );
        assert_eq!(CategoryKind::Income.to_string(), "income");
    }
}
