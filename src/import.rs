//! Rewrite rules applied to transactions on their way into a bulk import.
//!
//! Each rule pairs a query of regular-expression patterns with a patch. The
//! first rule whose patterns all match a transaction rewrites it; later rules
//! are not consulted for that transaction.

use crate::config::{AppConfig, RewritePatch, TransactionRewrite};
use crate::model::Transaction;
use crate::Result;
use anyhow::Context;
use regex::Regex;
use tracing::debug;

/// Applies the configuration's rewrite rules to a batch of transactions.
/// Fails up front if any rule carries an invalid pattern, leaving the batch
/// untouched.
pub fn apply_rewrites(
    config: &AppConfig,
    transactions: Vec<Transaction>,
) -> Result<Vec<Transaction>> {
    let rules = config
        .import
        .rewrites
        .iter()
        .map(CompiledRule::new)
        .collect::<Result<Vec<_>>>()?;
    if rules.is_empty() {
        return Ok(transactions);
    }
    debug!(
        "applying {} rewrite rules to {} transactions",
        rules.len(),
        transactions.len()
    );
    Ok(transactions
        .into_iter()
        .map(|mut transaction| {
            if let Some(rule) = rules.iter().find(|r| r.matches(&transaction)) {
                rule.patch(&mut transaction);
            }
            transaction
        })
        .collect())
}

/// A rewrite rule with its query patterns compiled.
struct CompiledRule<'a> {
    category: Option<Regex>,
    notes: Option<Regex>,
    details: Option<Regex>,
    kind: Option<Regex>,
    patch: &'a RewritePatch,
}

impl<'a> CompiledRule<'a> {
    fn new(rewrite: &'a TransactionRewrite) -> Result<Self> {
        let compile = |pattern: &Option<String>| {
            pattern
                .as_deref()
                .map(|p| Regex::new(p).with_context(|| format!("Invalid rewrite pattern '{p}'")))
                .transpose()
        };
        Ok(Self {
            category: compile(&rewrite.query.category)?,
            notes: compile(&rewrite.query.notes)?,
            details: compile(&rewrite.query.details)?,
            kind: compile(&rewrite.query.kind)?,
            patch: &rewrite.patch,
        })
    }

    /// Every present pattern must match; an absent pattern matches anything.
    fn matches(&self, transaction: &Transaction) -> bool {
        let check = |regex: &Option<Regex>, value: &str| {
            regex.as_ref().map(|r| r.is_match(value)).unwrap_or(true)
        };
        check(&self.category, transaction.category())
            && check(&self.notes, transaction.notes())
            && check(&self.details, transaction.details())
            && check(&self.kind, &transaction.kind().to_string())
    }

    /// Overwrites the fields the patch sets, leaving the rest alone.
    fn patch(&self, transaction: &mut Transaction) {
        if let Some(notes) = &self.patch.notes {
            transaction.notes = notes.clone();
        }
        if let Some(details) = &self.patch.details {
            transaction.details = details.clone();
        }
        if let Some(account) = &self.patch.source_account {
            transaction.source_account = Some(account.clone());
        }
        if let Some(account) = &self.patch.dest_account {
            transaction.dest_account = Some(account.clone());
        }
        if let Some(group) = &self.patch.group {
            transaction.group = Some(group.clone());
        }
        if let Some(category) = &self.patch.category {
            transaction.category = category.clone();
        }
        if let Some(kind) = self.patch.kind {
            transaction.kind = kind;
        }
    }
}
