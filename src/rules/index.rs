//! Case-insensitive rule index.
//!
//! # Responsibilities
//! - Map standardized old URLs to rules (exact lookup)
//! - Keep the configured order of rules for administrative access
//! - Keep key registration order for the prefix fallback scan
//!
//! # Design Decisions
//! - Sequence and key map are updated together by every mutating call
//! - Duplicate keys stay in the sequence but are reachable only through
//!   the first registered rule, both for exact and prefix lookups
//! - O(n) prefix scan (acceptable for typical rule counts)

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::IndexError;
use crate::rules::rule::RedirectRule;
use crate::standardizer::UrlStandardizer;

/// Ordered, case-insensitive collection of redirect rules.
#[derive(Debug, Clone)]
pub struct RedirectIndex {
    standardizer: Arc<dyn UrlStandardizer>,
    /// Rules in configured order, duplicates included.
    rules: Vec<Arc<RedirectRule>>,
    /// Folded key -> first rule registered under it.
    lookup: HashMap<String, Arc<RedirectRule>>,
    /// Folded keys in registration order.
    keys: Vec<String>,
}

impl RedirectIndex {
    /// Create an empty index using the given standardizer for keys.
    pub fn new(standardizer: Arc<dyn UrlStandardizer>) -> Self {
        Self {
            standardizer,
            rules: Vec::new(),
            lookup: HashMap::new(),
            keys: Vec::new(),
        }
    }

    /// Build an index from rules in source order.
    pub fn from_rules<I>(standardizer: Arc<dyn UrlStandardizer>, rules: I) -> Self
    where
        I: IntoIterator<Item = RedirectRule>,
    {
        let mut index = Self::new(standardizer);
        for rule in rules {
            index.add(rule);
        }
        index
    }

    pub fn standardizer(&self) -> &Arc<dyn UrlStandardizer> {
        &self.standardizer
    }

    /// Standardize then fold, so lookups are case-insensitive whatever the strategy.
    pub fn lookup_key(&self, url: &str) -> String {
        self.standardizer.standardize(url).to_lowercase()
    }

    /// Register a rule and append it to the sequence. Returns its position.
    pub fn add(&mut self, rule: RedirectRule) -> usize {
        let rule = Arc::new(rule);
        self.register(&rule);
        self.rules.push(rule);
        self.rules.len() - 1
    }

    /// Register a rule and place it at `position` in the sequence.
    pub fn insert(&mut self, position: usize, rule: RedirectRule) -> Result<(), IndexError> {
        if position > self.rules.len() {
            return Err(IndexError::OutOfBounds {
                index: position,
                len: self.rules.len(),
            });
        }
        let rule = Arc::new(rule);
        self.register(&rule);
        self.rules.insert(position, rule);
        Ok(())
    }

    /// Remove the first rule equal to `rule`. Returns false if it was not present.
    pub fn remove(&mut self, rule: &RedirectRule) -> bool {
        let Some(position) = self.rules.iter().position(|r| r.as_ref() == rule) else {
            return false;
        };
        let removed = self.rules.remove(position);
        self.unregister(&removed);
        true
    }

    /// True if a rule is registered under the standardized form of `old_url`.
    pub fn contains(&self, old_url: &str) -> bool {
        self.lookup.contains_key(&self.lookup_key(old_url))
    }

    /// Positional access over the configured order.
    pub fn get(&self, position: usize) -> Option<&Arc<RedirectRule>> {
        self.rules.get(position)
    }

    /// Replace the rule at `position`, returning the previous one.
    pub fn set(
        &mut self,
        position: usize,
        rule: RedirectRule,
    ) -> Result<Arc<RedirectRule>, IndexError> {
        if position >= self.rules.len() {
            return Err(IndexError::OutOfBounds {
                index: position,
                len: self.rules.len(),
            });
        }
        // Unregister before the replacement is in the sequence, so it is not
        // mistaken for a shadowed duplicate of the old key.
        let previous = self.rules.remove(position);
        self.unregister(&previous);
        let rule = Arc::new(rule);
        self.register(&rule);
        self.rules.insert(position, rule);
        Ok(previous)
    }

    /// Exact lookup of an already-built candidate string.
    pub fn lookup(&self, url: &str) -> Option<&Arc<RedirectRule>> {
        self.lookup.get(&self.lookup_key(url))
    }

    /// First non-exact rule, in registration order, whose key is a
    /// case-insensitive prefix of `url`.
    pub fn prefix_match(&self, url: &str) -> Option<&Arc<RedirectRule>> {
        let folded = url.to_lowercase();
        self.keys
            .iter()
            .filter_map(|key| self.lookup.get(key).map(|rule| (key, rule)))
            .filter(|(_, rule)| !rule.exact_match())
            .find(|(key, _)| folded.starts_with(key.as_str()))
            .map(|(_, rule)| rule)
    }

    /// Rules in configured order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RedirectRule>> {
        self.rules.iter()
    }

    /// Number of rules that suppress redirects when matched.
    pub fn ignored_count(&self) -> usize {
        self.iter().filter(|rule| rule.is_ignored()).count()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules shadowed by an earlier rule with the same key.
    pub fn duplicate_count(&self) -> usize {
        self.rules.len() - self.lookup.len()
    }

    fn register(&mut self, rule: &Arc<RedirectRule>) {
        let key = self.lookup_key(rule.old_url());
        if self.lookup.contains_key(&key) {
            tracing::warn!(
                old_url = %rule.old_url(),
                "Two or more redirects set up for the same old URL, keeping the first"
            );
            return;
        }
        self.keys.push(key.clone());
        self.lookup.insert(key, rule.clone());
    }

    /// Drop `rule` from the key map if it owns its key, promoting the next
    /// rule in the sequence that shares the key.
    fn unregister(&mut self, rule: &Arc<RedirectRule>) {
        let key = self.lookup_key(rule.old_url());
        let owns_key = self
            .lookup
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, rule));
        if !owns_key {
            return;
        }

        let successor = self
            .rules
            .iter()
            .find(|r| self.lookup_key(r.old_url()) == key)
            .cloned();

        match successor {
            Some(next) => {
                self.lookup.insert(key, next);
            }
            None => {
                self.lookup.remove(&key);
                self.keys.retain(|k| k != &key);
            }
        }
    }
}
