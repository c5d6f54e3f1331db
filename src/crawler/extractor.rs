//! HTML extraction of outbound origins and salient text
//!
//! Links are reduced to origins before they reach the store, so every page
//! of an origin collapses onto one record. Content extraction collects the
//! meta descriptions first and the headline-like body elements after them.

use crate::url::{is_non_page, origin_of};
use crate::DriftnetError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Meta tags whose `content` attribute is collected, in document order
const META_SELECTOR: &str = r#"meta[name="description"], meta[property="og:title"], meta[property="og:description"]"#;

/// Elements whose text content is collected, in document order
const TEXT_SELECTOR: &str = "title, #main, .main, main, [class*=main], #title, [class*=title], \
     h1, h2, h3, h4, h5, h6, header, nav";

/// Extracts the distinct origins referenced by anchors in `document`
///
/// Anchors are resolved against `base_url`. Addresses that fail to resolve,
/// lack a host or whose origin matches the non-page filter are dropped.
/// Origins keep the order of their first appearance.
///
/// # Errors
///
/// Returns `DriftnetError::Parse` when `base_url` itself is not a valid URL.
///
/// # Example
///
/// ```
/// use driftnet::crawler::extract_links;
/// use scraper::Html;
///
/// let document = Html::parse_document(r#"<a href="http://b.example/x">b</a><a href="/y">y</a>"#);
/// let links = extract_links(&document, "http://a.example").unwrap();
/// assert_eq!(links, vec!["http://b.example", "http://a.example"]);
/// ```
pub fn extract_links(document: &Html, base_url: &str) -> Result<Vec<String>, DriftnetError> {
    let base = Url::parse(base_url).map_err(|e| DriftnetError::Parse {
        url: base_url.to_string(),
        message: e.to_string(),
    })?;

    let mut seen = HashSet::new();
    let mut origins = Vec::new();

    let Ok(anchor) = Selector::parse("a[href]") else {
        return Ok(origins);
    };

    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Ok(resolved) = base.join(href.trim()) else {
            continue;
        };

        let Some(origin) = origin_of(&resolved) else {
            continue;
        };

        if is_non_page(&origin) {
            continue;
        }

        if seen.insert(origin.clone()) {
            origins.push(origin);
        }
    }

    Ok(origins)
}

/// Collects the salient text of `document`, one fragment per line
pub fn extract_content(document: &Html) -> String {
    let mut parts = Vec::new();

    if let Ok(selector) = Selector::parse(META_SELECTOR) {
        parts.extend(
            document
                .select(&selector)
                .filter_map(|el| el.value().attr("content"))
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        );
    }

    if let Ok(selector) = Selector::parse(TEXT_SELECTOR) {
        for element in document.select(&selector) {
            let text = element.text().collect::<String>();
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(html: &str) -> Vec<String> {
        extract_links(&Html::parse_document(html), "http://a.example/page").unwrap()
    }

    #[test]
    fn test_links_reduced_to_origins() {
        let html = r#"
            <a href="http://b.example/x">b</a>
            <a href="http://a.example/y">a</a>
            <a href="https://c.example:8443/deep/path?q=1">c</a>
        "#;
        assert_eq!(
            links(html),
            vec![
                "http://b.example",
                "http://a.example",
                "https://c.example:8443"
            ]
        );
    }

    #[test]
    fn test_relative_links_resolve_against_base() {
        let html = r#"<a href="/other">o</a><a href="sibling">s</a>"#;
        assert_eq!(links(html), vec!["http://a.example"]);
    }

    #[test]
    fn test_duplicate_origins_collapse() {
        let html = r#"
            <a href="http://b.example/1">1</a>
            <a href="http://b.example/2">2</a>
            <a href="http://B.EXAMPLE:80/3">3</a>
        "#;
        assert_eq!(links(html), vec!["http://b.example"]);
    }

    #[test]
    fn test_non_http_links_dropped() {
        let html = r#"
            <a href="mailto:someone@example.com">mail</a>
            <a href="javascript:void(0)">js</a>
            <a href="tel:+123">tel</a>
            <a href="ftp://files.example/">ftp</a>
        "#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_non_page_origins_dropped() {
        let html = r#"
            <a href="http://cdn.example.png/logo">img</a>
            <a href="http://bundle.JS/app">script</a>
            <a href="http://d.example/">page</a>
        "#;
        assert_eq!(links(html), vec!["http://d.example"]);
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let html = r#"<a name="top">top</a><a href="http://e.example">e</a>"#;
        assert_eq!(links(html), vec!["http://e.example"]);
    }

    #[test]
    fn test_invalid_base_url() {
        let document = Html::parse_document("<a href='/x'>x</a>");
        let result = extract_links(&document, "not a url");
        assert!(matches!(result, Err(DriftnetError::Parse { .. })));
    }

    #[test]
    fn test_content_meta_before_body() {
        let html = r#"
            <html><head>
                <title>Page Title</title>
                <meta name="description" content="Rust systems programming">
            </head><body>
                <h1>Fast Networking</h1>
                <p>ignored paragraph</p>
            </body></html>
        "#;
        let content = extract_content(&Html::parse_document(html));
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(
            lines,
            vec!["Rust systems programming", "Page Title", "Fast Networking"]
        );
        assert!(!content.contains("ignored"));
    }

    #[test]
    fn test_content_open_graph_tags() {
        let html = r#"
            <head>
                <meta property="og:title" content="Graph Title">
                <meta property="og:description" content="Graph description">
            </head>
        "#;
        let content = extract_content(&Html::parse_document(html));
        assert_eq!(content, "Graph Title\nGraph description");
    }

    #[test]
    fn test_content_meta_in_document_order() {
        let html = r#"
            <head>
                <meta property="og:title" content="Alpha">
                <meta name="description" content="Beta">
            </head>
        "#;
        let content = extract_content(&Html::parse_document(html));
        assert_eq!(content, "Alpha\nBeta");
    }

    #[test]
    fn test_content_inline_markup_not_split() {
        let html = r#"<h1>Rust<span>acean</span> <em>guide</em></h1>"#;
        let content = extract_content(&Html::parse_document(html));
        assert_eq!(content, "Rustacean guide");
    }

    #[test]
    fn test_content_class_selectors() {
        let html = r#"
            <div class="main-content">Main body</div>
            <span class="subtitle">Sub heading</span>
            <nav>Menu</nav>
            <footer>footer text</footer>
        "#;
        let content = extract_content(&Html::parse_document(html));

        assert!(content.contains("Main body"));
        assert!(content.contains("Sub heading"));
        assert!(content.contains("Menu"));
        assert!(!content.contains("footer text"));
    }

    #[test]
    fn test_content_empty_document() {
        assert_eq!(extract_content(&Html::parse_document("")), "");
    }
}
