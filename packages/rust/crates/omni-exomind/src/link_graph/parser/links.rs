use regex::{CaptureMatches, Regex};
use std::sync::LazyLock;

pub(crate) fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(_compile_err) => match Regex::new(r"$^") {
            Ok(fallback) => fallback,
            Err(fallback_err) => panic!("hardcoded fallback regex must compile: {fallback_err}"),
        },
    }
}

// [[target]], [[target#fragment]], [[target|alias]], [[target#fragment|alias]]
static WIKILINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"\[\[([^\]|#]+)(?:#([^\]|]+))?(?:\|([^\]]+))?\]\]"));

/// One wikilink occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WikiLinkMatch<'a> {
    /// Trimmed reference text before any `#` or `|`.
    pub target: &'a str,
    /// Text after `#`, if present.
    pub fragment: Option<&'a str>,
    /// Display alias after `|`, if present.
    pub alias: Option<&'a str>,
}

/// Lazy iterator over wikilinks in textual order.
pub struct WikiLinks<'r, 'h> {
    inner: CaptureMatches<'r, 'h>,
}

impl<'h> Iterator for WikiLinks<'_, 'h> {
    type Item = WikiLinkMatch<'h>;

    fn next(&mut self) -> Option<Self::Item> {
        for caps in self.inner.by_ref() {
            let Some(target) = caps.get(1).map(|m| m.as_str().trim()) else {
                continue;
            };
            return Some(WikiLinkMatch {
                target,
                fragment: caps.get(2).map(|m| m.as_str()),
                alias: caps.get(3).map(|m| m.as_str()),
            });
        }
        None
    }
}

/// Scan `text` for wikilinks.
#[must_use]
pub fn wikilinks(text: &str) -> WikiLinks<'static, '_> {
    WikiLinks {
        inner: WIKILINK_REGEX.captures_iter(text),
    }
}

/// Raw link targets in textual order, duplicates kept.
#[must_use]
pub fn extract_link_targets(text: &str) -> Vec<String> {
    wikilinks(text)
        .map(|link| link.target.to_string())
        .collect()
}
