//! Turns raw HTML into plain text suitable for tokenization. Regex-level, not a full
//! parser — matching this crate's existing preference for targeted regex transforms
//! over pulling in a full HTML parsing dependency for a pass this narrow.

use regex::Regex;
use std::sync::LazyLock;

static BLOCK_ELEMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|head|noscript)\b[^>]*>.*?</\1\s*>").unwrap()
});

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static NUMERIC_ENTITY_DEC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());
static NUMERIC_ENTITY_HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&#x([0-9a-f]+);").unwrap());

/// Remove the content of block elements (`script`, `style`, `head`, `noscript`),
/// case-insensitively, attributes allowed. Used standalone by the crawler's
/// anchor-extraction pass, which wants tags (for href extraction) but not script/style
/// noise.
pub fn strip_block_elements(html: &str) -> String {
    BLOCK_ELEMENTS.replace_all(html, "").into_owned()
}

/// Remove all remaining `<...>` tags.
pub fn strip_tags(html: &str) -> String {
    ANY_TAG.replace_all(html, " ").into_owned()
}

/// Decode named and numeric HTML entities.
pub fn decode_entities(text: &str) -> String {
    let text = NUMERIC_ENTITY_DEC.replace_all(text, |caps: &regex::Captures| {
        caps[1].parse::<u32>().ok().and_then(char::from_u32).map(String::from).unwrap_or_default()
    });
    let text = NUMERIC_ENTITY_HEX.replace_all(&text, |caps: &regex::Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let mut text = text.into_owned();
    for (entity, replacement) in NAMED_ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }
    text
}

/// Named entities covering the common set that appears in ordinary web pages.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&copy;", "\u{A9}"),
    ("&reg;", "\u{AE}"),
    ("&mdash;", "\u{2014}"),
    ("&ndash;", "\u{2013}"),
    ("&hellip;", "\u{2026}"),
    ("&rsquo;", "\u{2019}"),
    ("&lsquo;", "\u{2018}"),
    ("&rdquo;", "\u{201D}"),
    ("&ldquo;", "\u{201C}"),
];

/// Full cleaning pass: strip block elements, strip remaining tags, decode entities.
pub fn clean(html: &str) -> String {
    let no_blocks = strip_block_elements(html);
    let no_tags = strip_tags(&no_blocks);
    decode_entities(&no_tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_and_style_content() {
        let html = "<html><head><title>t</title></head><body><script>alert(1)</script>\
                     <style>.a{color:red}</style>Hello <b>World</b></body></html>";
        let cleaned = clean(html);
        assert!(!cleaned.contains("alert"));
        assert!(!cleaned.contains("color:red"));
        assert!(cleaned.contains("Hello"));
        assert!(cleaned.contains("World"));
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&#72;&#101;&#121;"), "Hey");
        assert_eq!(decode_entities("&#x48;&#x69;"), "Hi");
    }

    #[test]
    fn block_strip_leaves_anchors_intact() {
        let html = "<head><title>x</title></head><body><a href=\"/a\">A</a></body>";
        let stripped = strip_block_elements(html);
        assert!(stripped.contains("<a href=\"/a\">A</a>"));
        assert!(!stripped.contains("<title>"));
    }
}
