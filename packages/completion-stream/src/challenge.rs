//! Detection of interstitial challenge pages and stray HTML documents.
//!
//! Edge/CDN layers sometimes answer an API call with a bot-check page.
//! These helpers only look for a small, fixed set of signals; they are meant
//! to fail fast, not to scrub a body.

/// Literal substrings that identify a CDN bot-challenge page. Case-sensitive.
const CHALLENGE_MARKERS: &[&str] = &[
    "Just a moment...",
    "_cf_chl_opt",
    "/cdn-cgi/challenge-platform/",
];

/// Openings of a full HTML document. Compared ASCII case-insensitively.
const HTML_DOCUMENT_PREFIXES: &[&[u8]] = &[b"<!doctype", b"<html"];

/// What kind of non-API page a piece of text looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interstitial {
    /// A known bot-challenge page.
    Challenge,
    /// Some other full HTML document.
    HtmlDocument,
}

/// Inspect `text` for challenge markers first, then for an HTML document.
pub fn inspect(text: &str) -> Option<Interstitial> {
    if is_challenge_page(text) {
        Some(Interstitial::Challenge)
    } else if looks_like_html_document(text) {
        Some(Interstitial::HtmlDocument)
    } else {
        None
    }
}

/// True if `text` contains any known challenge marker.
pub fn is_challenge_page(text: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|marker| text.contains(marker))
}

/// True if `text`, after leading whitespace, starts with a doctype or `<html`.
pub fn looks_like_html_document(text: &str) -> bool {
    let rest = text.trim_start().as_bytes();
    HTML_DOCUMENT_PREFIXES
        .iter()
        .any(|prefix| starts_with_ignore_case(rest, prefix))
}

/// True if `text`, after leading whitespace, is a strict prefix of a doctype
/// or `<html` opening, so more input is needed to tell.
pub fn may_open_html_document(text: &str) -> bool {
    let rest = text.trim_start().as_bytes();
    !rest.is_empty()
        && HTML_DOCUMENT_PREFIXES
            .iter()
            .any(|prefix| rest.len() < prefix.len() && prefix[..rest.len()].eq_ignore_ascii_case(rest))
}

fn starts_with_ignore_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}
