//! Shared fixtures for integration tests.

use std::io::Write;
use std::sync::Arc;

use redirect_resolver::config::loader::parse_config;
use redirect_resolver::{MatchResolver, RedirectIndex, RedirectRule, StandardizerKind};

/// Resolver over `rules` with the default standardizer.
#[allow(dead_code)]
pub fn resolver(rules: Vec<RedirectRule>) -> MatchResolver {
    resolver_with(StandardizerKind::Default, rules)
}

#[allow(dead_code)]
pub fn resolver_with(kind: StandardizerKind, rules: Vec<RedirectRule>) -> MatchResolver {
    MatchResolver::new(Arc::new(RedirectIndex::from_rules(kind.build(), rules)))
}

/// Resolver built from TOML rules text.
#[allow(dead_code)]
pub fn resolver_from_toml(toml: &str) -> MatchResolver {
    let config = parse_config(toml).unwrap();
    MatchResolver::new(config.build_shared_index())
}

/// Write `content` to a fresh temporary rules file.
#[allow(dead_code)]
pub fn rules_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Resolve `raw`, panicking on invalid input.
#[allow(dead_code)]
pub fn resolve(resolver: &MatchResolver, raw: &str) -> Option<String> {
    resolver.resolve(Some(raw)).unwrap()
}
