//! Target URL composition.
//!
//! # Responsibilities
//! - Append the unmatched tail of the request to the rule's target
//! - Merge the request query string into the target
//! - Classify targets as absolute or relative
//!
//! # Design Decisions
//! - Absolute detection is a plain prefix check (`//`, `http://`, `https://`),
//!   so `ftp://host` is treated as relative
//! - Parse failures never reject a rule; the target is split on `?` instead
//! - Target parameters win over request parameters with the same key

use std::collections::HashSet;
use std::sync::Arc;

use url::{form_urlencoded, Url};

use crate::routing::candidates::{remove_protocol, remove_query};
use crate::routing::request::RequestUrl;
use crate::rules::RedirectRule;
use crate::standardizer::UrlStandardizer;

/// How a target URL is interpreted before composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Absolute,
    Relative,
}

impl UrlKind {
    pub fn of(url: &str) -> Self {
        if is_absolute_url(url) {
            UrlKind::Absolute
        } else {
            UrlKind::Relative
        }
    }
}

/// True for protocol-relative and http(s) URLs, case-insensitively.
pub fn is_absolute_url(url: &str) -> bool {
    url.starts_with("//") || has_http_scheme(url)
}

fn has_http_scheme(url: &str) -> bool {
    starts_with_ignore_case(url, "http://") || starts_with_ignore_case(url, "https://")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Target split into the part a tail is appended to and its query.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TargetUrl {
    path: String,
    query: Option<String>,
}

impl TargetUrl {
    fn parse(raw: &str) -> Self {
        match UrlKind::of(raw) {
            UrlKind::Absolute => Self::parse_absolute(raw).unwrap_or_else(|| Self::split(raw)),
            UrlKind::Relative => Self::split(raw),
        }
    }

    fn parse_absolute(raw: &str) -> Option<Self> {
        let protocol_relative = raw.starts_with("//");
        let parsed = if protocol_relative {
            Url::parse(&format!("http:{raw}"))
        } else {
            Url::parse(raw)
        };
        let url = match parsed {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(target_url = %raw, error = %e, "Target not parseable, splitting on '?'");
                return None;
            }
        };

        let query = url.query().map(str::to_string);
        let mut left = url;
        left.set_query(None);
        left.set_fragment(None);
        let path = if protocol_relative {
            remove_protocol(left.as_str()).to_string()
        } else {
            left.to_string()
        };
        Some(Self { path, query })
    }

    fn split(raw: &str) -> Self {
        match raw.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: Some(query.to_string()),
            },
            None => Self {
                path: raw.to_string(),
                query: None,
            },
        }
    }
}

/// Builds the final redirect target for a matched rule.
#[derive(Debug, Clone)]
pub struct UrlRewriter {
    standardizer: Arc<dyn UrlStandardizer>,
}

impl UrlRewriter {
    /// The standardizer must be the one the index keys were built with.
    pub fn new(standardizer: Arc<dyn UrlStandardizer>) -> Self {
        Self { standardizer }
    }

    /// Compute the redirect target for `request` matched by `rule`.
    pub fn build(&self, rule: &RedirectRule, request: &RequestUrl) -> String {
        let mut new_url = if rule.append_match_to_new_url() {
            self.append_match(rule, request)
        } else {
            rule.new_url().to_string()
        };

        if rule.include_query_string() {
            if let Some(query) = request.query().filter(|q| !q.is_empty()) {
                new_url = merge_query(&new_url, query);
            }
        }

        new_url
    }

    fn append_match(&self, rule: &RedirectRule, request: &RequestUrl) -> String {
        let tail = self.tail(rule, request);
        if tail.is_empty() || tail == "/" {
            return rule.new_url().to_string();
        }

        let target = TargetUrl::parse(rule.new_url());
        let combined = combine(&target.path, &tail);
        // The target's own query is reattached verbatim.
        match target.query.as_deref() {
            Some(query) if !query.is_empty() => format!("{}?{}", combined, query),
            _ => combined,
        }
    }

    /// The part of the request beyond the rule's old URL.
    ///
    /// The request is viewed in the same shape as the old URL (full URL,
    /// protocol-relative, or path) so the lengths line up.
    fn tail(&self, rule: &RedirectRule, request: &RequestUrl) -> String {
        let old_url = rule.old_url();
        let keep_query = old_url.contains('?');

        let subject = match request.absolute_uri() {
            Some(absolute) if has_http_scheme(old_url) || old_url.starts_with("//") => {
                let absolute = if keep_query {
                    absolute
                } else {
                    remove_query(absolute)
                };
                if old_url.starts_with("//") {
                    remove_protocol(absolute).to_string()
                } else {
                    absolute.to_string()
                }
            }
            _ if keep_query => request.path_and_query(),
            _ => request.path().to_string(),
        };

        let key = self.standardizer.standardize(old_url);
        if let Some(end) = matched_prefix_len(&subject, &key.to_lowercase()) {
            return subject[end..].to_string();
        }

        if subject.len() < key.len() {
            return subject;
        }
        match subject.get(key.len()..) {
            Some(tail) => tail.to_string(),
            None => subject,
        }
    }
}

/// Byte length of the shortest prefix of `subject` whose lowercase form is
/// `folded_key`. Case folding can change byte lengths (U+212A KELVIN SIGN
/// folds to ASCII `k`), so the key length cannot be used as a byte offset.
fn matched_prefix_len(subject: &str, folded_key: &str) -> Option<usize> {
    let mut folded = String::with_capacity(folded_key.len());
    for (offset, c) in subject.char_indices() {
        if folded.len() >= folded_key.len() {
            return (folded == folded_key).then_some(offset);
        }
        folded.extend(c.to_lowercase());
    }
    (folded == folded_key).then_some(subject.len())
}

/// Join with exactly one `/` between the two segments.
fn combine(path: &str, tail: &str) -> String {
    match (path.ends_with('/'), tail.starts_with('/')) {
        (true, true) => format!("{}{}", path, &tail[1..]),
        (false, false) => format!("{}/{}", path, tail),
        _ => format!("{}{}", path, tail),
    }
}

/// Append parameters from `query` whose keys are not already on `url`.
///
/// Keys compare case-insensitively. Appended pairs are re-encoded.
pub fn merge_query(url: &str, query: &str) -> String {
    let query = query.strip_prefix('?').unwrap_or(query);
    let existing: HashSet<String> = url
        .split_once('?')
        .map(|(_, q)| {
            form_urlencoded::parse(q.as_bytes())
                .map(|(k, _)| k.to_lowercase())
                .collect()
        })
        .unwrap_or_default();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut appended = 0;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key.is_empty() || existing.contains(&key.to_lowercase()) {
            continue;
        }
        serializer.append_pair(&key, &value);
        appended += 1;
    }
    if appended == 0 {
        return url.to_string();
    }

    let extra = serializer.finish();
    let separator = match url.find('?') {
        None => "?",
        Some(_) if url.ends_with('?') || url.ends_with('&') => "",
        Some(_) => "&",
    };
    format!("{}{}{}", url, separator, extra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standardizer::DefaultStandardizer;

    fn rewriter() -> UrlRewriter {
        UrlRewriter::new(Arc::new(DefaultStandardizer))
    }

    fn req(raw: &str) -> RequestUrl {
        RequestUrl::parse(raw).unwrap()
    }

    #[test]
    fn test_absolute_heuristic() {
        assert_eq!(UrlKind::of("//cdn.example.com/x"), UrlKind::Absolute);
        assert_eq!(UrlKind::of("HTTPS://example.com"), UrlKind::Absolute);
        assert_eq!(UrlKind::of("/local/x"), UrlKind::Relative);
        assert_eq!(UrlKind::of("ftp://x"), UrlKind::Relative);
        assert_eq!(UrlKind::of("mailto:a@b"), UrlKind::Relative);
    }

    #[test]
    fn test_tail_append() {
        let rule = RedirectRule::new("/news", "/press").with_append_match(true);
        assert_eq!(rewriter().build(&rule, &req("/news/story1")), "/press/story1");
        assert_eq!(rewriter().build(&rule, &req("/news")), "/press");
        assert_eq!(rewriter().build(&rule, &req("/news/")), "/press");
    }

    #[test]
    fn test_tail_append_single_separator() {
        let rule = RedirectRule::new("/news/", "/press/").with_append_match(true);
        assert_eq!(rewriter().build(&rule, &req("/news/story1")), "/press/story1");

        let rule = RedirectRule::new("/news/", "/press").with_append_match(true);
        assert_eq!(rewriter().build(&rule, &req("/news/a/b")), "/press/a/b");
    }

    #[test]
    fn test_tail_append_keeps_target_query() {
        let rule = RedirectRule::new("/news", "/press?lang=en").with_append_match(true);
        assert_eq!(
            rewriter().build(&rule, &req("/news/story1?ignored=1")),
            "/press/story1?lang=en"
        );
    }

    #[test]
    fn test_tail_append_target_query_verbatim() {
        let rule = RedirectRule::new("/news", "/press?ref&path=/a/b&q=a%20b").with_append_match(true);
        assert_eq!(
            rewriter().build(&rule, &req("/news/x")),
            "/press/x?ref&path=/a/b&q=a%20b"
        );
    }

    #[test]
    fn test_tail_after_case_folded_old_url() {
        // KELVIN SIGN is three bytes but lowercases to a one-byte `k`.
        let rule = RedirectRule::new("/\u{212A}elvin", "/target").with_append_match(true);
        assert_eq!(rewriter().build(&rule, &req("/\u{212A}elvin/page")), "/target/page");
        assert_eq!(rewriter().build(&rule, &req("/kelvin/page")), "/target/page");
    }

    #[test]
    fn test_matched_prefix_len() {
        assert_eq!(matched_prefix_len("/News/x", "/news"), Some(5));
        assert_eq!(matched_prefix_len("/\u{212A}/x", "/k"), Some(4));
        assert_eq!(matched_prefix_len("/new", "/news"), None);
        assert_eq!(matched_prefix_len("/other/x", "/news"), None);
    }

    #[test]
    fn test_tail_append_absolute_target() {
        let rule = RedirectRule::new("/news", "https://Example.com/press?a=1").with_append_match(true);
        assert_eq!(
            rewriter().build(&rule, &req("/news/x")),
            "https://example.com/press/x?a=1"
        );

        let rule = RedirectRule::new("/news", "//cdn.example.com").with_append_match(true);
        assert_eq!(rewriter().build(&rule, &req("/news/x")), "//cdn.example.com/x");
    }

    #[test]
    fn test_tail_for_absolute_old_url() {
        let rule = RedirectRule::new("http://example.com/news", "/press").with_append_match(true);
        assert_eq!(
            rewriter().build(&rule, &req("http://example.com/news/today?x=1")),
            "/press/today"
        );

        let rule = RedirectRule::new("//example.com/news", "/press").with_append_match(true);
        assert_eq!(
            rewriter().build(&rule, &req("https://example.com/news/today")),
            "/press/today"
        );
    }

    #[test]
    fn test_relative_target_with_unrecognized_scheme() {
        let rule = RedirectRule::new("/dl", "ftp://files/pub").with_append_match(true);
        assert_eq!(rewriter().build(&rule, &req("/dl/a.iso")), "ftp://files/pub/a.iso");
    }

    #[test]
    fn test_query_merge_target_wins() {
        let rule = RedirectRule::new("/news", "/press?lang=en").with_include_query_string(true);
        assert_eq!(
            rewriter().build(&rule, &req("/news?lang=fr&ref=x")),
            "/press?lang=en&ref=x"
        );
    }

    #[test]
    fn test_query_merge_without_target_query() {
        let rule = RedirectRule::new("/a", "/b").with_include_query_string(true);
        assert_eq!(rewriter().build(&rule, &req("/a?q=hello world")), "/b?q=hello+world");
        assert_eq!(rewriter().build(&rule, &req("/a?")), "/b");
        assert_eq!(rewriter().build(&rule, &req("/a")), "/b");
    }

    #[test]
    fn test_query_not_merged_when_flag_off() {
        let rule = RedirectRule::new("/a", "/b");
        assert_eq!(rewriter().build(&rule, &req("/a?q=1")), "/b");
    }

    #[test]
    fn test_merge_query_helper() {
        assert_eq!(merge_query("/p?", "a=1"), "/p?a=1");
        assert_eq!(merge_query("/p?A=2", "a=1"), "/p?A=2");
        assert_eq!(merge_query("/p", "?x=%2F"), "/p?x=%2F");
    }

    #[test]
    fn test_rule_is_not_mutated() {
        let rule = RedirectRule::new("/news", "/press")
            .with_append_match(true)
            .with_include_query_string(true);
        let before = rule.clone();
        let _ = rewriter().build(&rule, &req("/news/x?y=1"));
        assert_eq!(rule, before);
    }
}
