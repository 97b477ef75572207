//! Lookup candidate generation.
//!
//! Stored rules come in several historical formats (full URLs, protocol-less
//! URLs, paths, HTML-encoded paths), so a request is tried in each of them.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::routing::request::RequestUrl;

/// Ordered lookup strings for the main entry point.
///
/// Order: absolute, absolute without scheme, absolute without query,
/// both stripped, path and query, path, HTML-encoded path and query,
/// HTML-encoded path. Relative requests skip the absolute forms.
pub fn find_candidates(url: &RequestUrl) -> Vec<String> {
    let mut forms = Vec::with_capacity(8);

    if let Some(absolute) = url.absolute_uri() {
        forms.push(absolute.to_string());
        forms.push(remove_protocol(absolute).to_string());
        forms.push(remove_query(absolute).to_string());
        forms.push(remove_protocol(remove_query(absolute)).to_string());
    }

    let path_and_query = url.path_and_query();
    forms.push(path_and_query.clone());
    forms.push(remove_query(&path_and_query).to_string());
    forms.push(html_encode(&path_and_query));
    forms.push(html_encode(remove_query(&path_and_query)));

    dedup_ignore_case(forms)
}

/// Lookup strings for the legacy entry point: percent-decoded forms first,
/// then the raw path, with and without the query. Absolute requests only.
pub fn legacy_candidates(url: &RequestUrl) -> Vec<String> {
    let (Some(absolute), Some(absolute_without_query)) =
        (url.absolute_uri(), url.absolute_without_query())
    else {
        return Vec::new();
    };

    let path_and_query = url.path_and_query();
    let forms = vec![
        percent_decode(absolute),
        percent_decode(&path_and_query),
        url.path().to_string(),
        percent_decode(absolute_without_query),
        percent_decode(url.path()),
    ];

    dedup_ignore_case(forms)
}

/// Strip a leading `http:` or `https:`, leaving the `//authority` part.
pub fn remove_protocol(url: &str) -> &str {
    url.strip_prefix("http:")
        .or_else(|| url.strip_prefix("https:"))
        .unwrap_or(url)
}

/// Everything before the first `?`.
pub fn remove_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(head, _)| head)
}

/// HTML attribute encoding as older rule stores applied it to saved URLs.
pub fn html_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("&#{};", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

fn percent_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| input.to_string())
}

/// Case-insensitive de-duplication, first occurrence wins.
fn dedup_ignore_case(forms: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(forms.len());
    forms
        .into_iter()
        .filter(|form| seen.insert(form.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_candidate_order() {
        let url = RequestUrl::parse("https://example.com/News?a=1&b=2").unwrap();
        assert_eq!(
            find_candidates(&url),
            vec![
                "https://example.com/News?a=1&b=2",
                "//example.com/News?a=1&b=2",
                "https://example.com/News",
                "//example.com/News",
                "/News?a=1&b=2",
                "/News",
                "/News?a=1&amp;b=2",
            ]
        );
    }

    #[test]
    fn test_relative_candidates_dedup() {
        let url = RequestUrl::parse("/news").unwrap();
        assert_eq!(find_candidates(&url), vec!["/news"]);
    }

    #[test]
    fn test_dedup_keeps_first_casing() {
        let forms = vec!["/A".to_string(), "/a".to_string(), "/b".to_string()];
        assert_eq!(dedup_ignore_case(forms), vec!["/A", "/b"]);
    }

    #[test]
    fn test_legacy_candidates() {
        let url = RequestUrl::parse("http://example.com/caf%C3%A9?q=1").unwrap();
        assert_eq!(
            legacy_candidates(&url),
            vec![
                "http://example.com/café?q=1",
                "/café?q=1",
                "/caf%C3%A9",
                "http://example.com/café",
                "/café",
            ]
        );
        assert!(legacy_candidates(&RequestUrl::parse("/x").unwrap()).is_empty());
    }

    #[test]
    fn test_string_helpers() {
        assert_eq!(remove_protocol("http://a/b"), "//a/b");
        assert_eq!(remove_protocol("https://a/b"), "//a/b");
        assert_eq!(remove_protocol("ftp://a/b"), "ftp://a/b");
        assert_eq!(remove_query("/a?b?c"), "/a");
        assert_eq!(html_encode("/a?x=<1>&y='\u{e9}'"), "/a?x=&lt;1&gt;&amp;y=&#39;&#233;&#39;");
    }
}
