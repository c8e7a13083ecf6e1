//! Anchor-href extraction and URL canonicalization, shared by the link extractor and
//! the crawler.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::LinkError;

// Matches `href` attributes on any tag, case-insensitively, quoted or bare — matching
// the documented intent ("href attributes on anchor tags") rather than the source's
// loose `[hrefHREF]{4}` character-class trick (see SPEC_FULL.md open questions).
static HREF_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)href\s*=\s*("([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap());

/// Canonicalize a URL: keep scheme, user-info, host, port, path, query; drop the
/// fragment; percent-encode reserved characters via `url`'s own normalization. Case and
/// trailing slashes are preserved.
pub fn canonicalize(url: &str) -> Result<String, LinkError> {
    let mut parsed = Url::parse(url).map_err(|_| LinkError::MalformedUrl(url.to_string()))?;
    parsed.set_fragment(None);
    Ok(parsed.to_string())
}

/// Extract every `href` reference from `html`, resolve each relative to `base`, strip
/// fragments, and return them in document order. Malformed references are skipped.
pub fn extract_links(base: &str, html: &str) -> Vec<String> {
    let base_url = match Url::parse(base) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();
    for caps in HREF_ATTR.captures_iter(html) {
        let raw = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') || raw.starts_with("javascript:") {
            continue;
        }
        let resolved = match base_url.join(raw) {
            Ok(u) => u,
            Err(_) => continue,
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        let mut resolved = resolved;
        resolved.set_fragment(None);
        links.push(resolved.to_string());
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_strips_fragment_keeps_query() {
        let c = canonicalize("https://example.com/page?x=1#section").unwrap();
        assert_eq!(c, "https://example.com/page?x=1");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize("https://example.com/a?x=1").unwrap();
        let twice = canonicalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn canonicalize_rejects_malformed_url() {
        assert!(canonicalize("not a url").is_err());
    }

    #[test]
    fn extract_links_resolves_relative_and_strips_fragments() {
        let html = r#"<a href="/foo#bar">Foo</a> <a href='https://other.com/x'>X</a>
                       <a href="mailto:a@b.com">Mail</a> <a href="#top">Top</a>"#;
        let links = extract_links("https://example.com/base/", html);
        assert_eq!(
            links,
            vec!["https://example.com/foo".to_string(), "https://other.com/x".to_string()]
        );
    }

    #[test]
    fn extract_links_preserves_document_order() {
        let html = r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a>"#;
        let links = extract_links("https://example.com/", html);
        assert_eq!(
            links,
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string(),
                "https://example.com/c".to_string(),
            ]
        );
    }
}
