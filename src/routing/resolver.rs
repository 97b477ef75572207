//! Rule lookup for not-found requests.
//!
//! # Responsibilities
//! - Walk the candidate cascade for a request
//! - Try exact lookup on all candidates before any prefix lookup
//! - Stop on ignored rules
//! - Hand the winning rule to the rewriter
//!
//! # Design Decisions
//! - Holds an `Arc` of an immutable index, so it is cheap to share across threads
//! - The legacy entry point reuses the same lookup with a different cascade

use std::sync::Arc;

use crate::error::ResolveError;
use crate::routing::candidates::{find_candidates, legacy_candidates};
use crate::routing::request::RequestUrl;
use crate::routing::rewriter::UrlRewriter;
use crate::rules::{RedirectIndex, RedirectRule};

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRedirect {
    new_url: String,
    rule: Arc<RedirectRule>,
}

impl ResolvedRedirect {
    /// The final redirect target.
    pub fn new_url(&self) -> &str {
        &self.new_url
    }

    /// The stored rule that matched.
    pub fn rule(&self) -> &Arc<RedirectRule> {
        &self.rule
    }

    pub fn into_new_url(self) -> String {
        self.new_url
    }
}

/// Finds the rule for a not-found URL and computes its target.
#[derive(Debug, Clone)]
pub struct MatchResolver {
    index: Arc<RedirectIndex>,
    rewriter: UrlRewriter,
}

impl MatchResolver {
    pub fn new(index: Arc<RedirectIndex>) -> Self {
        let rewriter = UrlRewriter::new(index.standardizer().clone());
        Self { index, rewriter }
    }

    pub fn index(&self) -> &Arc<RedirectIndex> {
        &self.index
    }

    /// Resolve a raw request URL.
    ///
    /// `None` input is an invalid argument. `Ok(None)` means no redirect.
    pub fn resolve(&self, requested: Option<&str>) -> Result<Option<String>, ResolveError> {
        let raw = requested.ok_or(ResolveError::InvalidArgument("requested_url"))?;
        let url = RequestUrl::parse(raw)?;
        Ok(self.find(&url).map(ResolvedRedirect::into_new_url))
    }

    /// Run the full candidate cascade for `url`.
    pub fn find(&self, url: &RequestUrl) -> Option<ResolvedRedirect> {
        let candidates = find_candidates(url);
        self.resolve_candidates(url, &candidates)
    }

    /// Legacy lookup: absolute URLs only, with a reduced cascade.
    pub fn find_old(&self, url: &RequestUrl) -> Option<ResolvedRedirect> {
        if !url.is_absolute() {
            return None;
        }
        let candidates = legacy_candidates(url);
        self.resolve_candidates(url, &candidates)
    }

    fn resolve_candidates(&self, url: &RequestUrl, candidates: &[String]) -> Option<ResolvedRedirect> {
        let rule = self.try_find(candidates)?;
        let new_url = self.rewriter.build(&rule, url);
        tracing::debug!(
            request = %url,
            old_url = %rule.old_url(),
            new_url = %new_url,
            "Redirect resolved"
        );
        Some(ResolvedRedirect { new_url, rule })
    }

    /// Exact pass over every candidate, then a prefix pass over every candidate.
    fn try_find(&self, candidates: &[String]) -> Option<Arc<RedirectRule>> {
        let (candidate, rule) = candidates
            .iter()
            .find_map(|c| self.index.lookup(c).map(|rule| (c, rule)))
            .or_else(|| {
                candidates
                    .iter()
                    .find_map(|c| self.index.prefix_match(c).map(|rule| (c, rule)))
            })?;

        if rule.is_ignored() {
            tracing::debug!(
                candidate = %candidate,
                old_url = %rule.old_url(),
                "Matched ignored rule, no redirect"
            );
            return None;
        }
        Some(rule.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleState;
    use crate::standardizer::DefaultStandardizer;

    fn resolver(rules: Vec<RedirectRule>) -> MatchResolver {
        let index = RedirectIndex::from_rules(Arc::new(DefaultStandardizer), rules);
        MatchResolver::new(Arc::new(index))
    }

    fn find(resolver: &MatchResolver, raw: &str) -> Option<String> {
        resolver.resolve(Some(raw)).unwrap()
    }

    #[test]
    fn test_exact_beats_prefix() {
        let r = resolver(vec![
            RedirectRule::new("/news", "/prefix"),
            RedirectRule::new("/news/latest", "/exact"),
        ]);
        assert_eq!(find(&r, "/news/latest").as_deref(), Some("/exact"));
        assert_eq!(find(&r, "/news/other").as_deref(), Some("/prefix"));
    }

    #[test]
    fn test_case_insensitive() {
        let r = resolver(vec![RedirectRule::new("/foo", "/bar")]);
        assert_eq!(find(&r, "/Foo"), find(&r, "/foo"));
        assert_eq!(find(&r, "/FOO").as_deref(), Some("/bar"));
    }

    #[test]
    fn test_ignored_prefix_short_circuits() {
        let r = resolver(vec![
            RedirectRule::new("//example.com/shop", "/ignored").with_state(RuleState::Ignored),
            RedirectRule::new("/shop/sale", "/sale"),
        ]);
        // "//example.com/shop/sale/x" hits the ignored prefix rule before the
        // path candidate gets a chance at the active prefix rule.
        assert_eq!(find(&r, "http://example.com/shop/sale/x"), None);
        assert_eq!(find(&r, "http://other.com/shop/sale/x").as_deref(), Some("/sale"));
    }

    #[test]
    fn test_exact_on_later_candidate_beats_earlier_prefix() {
        let r = resolver(vec![
            RedirectRule::new("http://example.com/", "/site-wide"),
            RedirectRule::new("/page", "/exact-page").with_exact_match(true),
        ]);
        assert_eq!(
            find(&r, "http://example.com/page").as_deref(),
            Some("/exact-page")
        );
        assert_eq!(
            find(&r, "http://example.com/other").as_deref(),
            Some("/site-wide")
        );
    }

    #[test]
    fn test_exact_ignored_on_later_candidate_suppresses_prefix() {
        let r = resolver(vec![
            RedirectRule::new("//example.com", "/site-wide"),
            RedirectRule::new("/private", "/x").with_state(RuleState::Ignored),
        ]);
        assert_eq!(find(&r, "http://example.com/private"), None);
    }

    #[test]
    fn test_ignored_exact_suppresses() {
        let r = resolver(vec![
            RedirectRule::new("/promo", "/x").with_state(RuleState::Ignored),
            RedirectRule::new("/pro", "/y"),
        ]);
        assert_eq!(find(&r, "/promo"), None);
    }

    #[test]
    fn test_earlier_candidate_wins() {
        let r = resolver(vec![
            RedirectRule::new("/page", "/by-path"),
            RedirectRule::new("http://example.com/page", "/by-absolute"),
        ]);
        assert_eq!(
            find(&r, "http://example.com/page").as_deref(),
            Some("/by-absolute")
        );
        assert_eq!(
            find(&r, "https://example.com/page").as_deref(),
            Some("/by-path")
        );
    }

    #[test]
    fn test_protocol_relative_rule() {
        let r = resolver(vec![RedirectRule::new("//example.com/old", "/new")]);
        assert_eq!(find(&r, "https://example.com/old").as_deref(), Some("/new"));
        assert_eq!(find(&r, "/old"), None);
    }

    #[test]
    fn test_query_stripped_candidate() {
        let r = resolver(vec![RedirectRule::new("/a", "/b").with_exact_match(true)]);
        assert_eq!(find(&r, "/a?utm=1").as_deref(), Some("/b"));
    }

    #[test]
    fn test_html_encoded_rule() {
        let r = resolver(vec![
            RedirectRule::new("/list?a=1&amp;b=2", "/legacy").with_exact_match(true),
        ]);
        assert_eq!(find(&r, "/list?a=1&b=2").as_deref(), Some("/legacy"));
    }

    #[test]
    fn test_no_match_and_invalid_argument() {
        let r = resolver(vec![RedirectRule::new("/a", "/b")]);
        assert_eq!(find(&r, "/z"), None);
        assert_eq!(
            r.resolve(None),
            Err(ResolveError::InvalidArgument("requested_url"))
        );
    }

    #[test]
    fn test_find_old_requires_absolute() {
        let r = resolver(vec![RedirectRule::new("/caf\u{e9}", "/coffee")]);
        let relative = RequestUrl::parse("/caf%C3%A9").unwrap();
        assert!(r.find_old(&relative).is_none());

        let absolute = RequestUrl::parse("http://example.com/caf%C3%A9").unwrap();
        let resolved = r.find_old(&absolute).unwrap();
        assert_eq!(resolved.new_url(), "/coffee");
        assert_eq!(resolved.rule().old_url(), "/caf\u{e9}");
    }

    #[test]
    fn test_resolution_leaves_index_untouched() {
        let r = resolver(vec![RedirectRule::new("/news", "/press").with_append_match(true)]);
        let resolved = r.find(&RequestUrl::parse("/news/x").unwrap()).unwrap();
        assert_eq!(resolved.new_url(), "/press/x");
        assert_eq!(r.index().lookup("/news").unwrap().new_url(), "/press");
    }
}
