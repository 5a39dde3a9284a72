//! Regex-driven HTML extraction.
//!
//! Job detail pages only need two things pulled out of them: a title and a
//! flattened text body the free-text extractors can scan line by line. A
//! full DOM is overkill for that, so this stays regex-based.

/// Extract a page title: the first `<h1>` element, falling back to the
/// `<title>` element. Inner markup is stripped and entities decoded.
pub fn extract_title(html: &str) -> Option<String> {
    let h1_pattern = regex::Regex::new(r"(?si)<h1[^>]*>(.*?)</h1>").unwrap();
    let title_pattern = regex::Regex::new(r"(?si)<title[^>]*>(.*?)</title>").unwrap();

    for pattern in [&h1_pattern, &title_pattern] {
        if let Some(cap) = pattern.captures(html) {
            let text = strip_tags(cap.get(1).map_or("", |m| m.as_str()));
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    None
}

/// Flatten a page to newline-separated text: scripts and styles removed,
/// block boundaries turned into newlines, remaining tags stripped, entities
/// decoded, blank lines dropped. Line structure is preserved so rest-of-line
/// extractors (`Location: …`) see one field per line.
pub fn extract_text(html: &str) -> String {
    let script_pattern = regex::Regex::new(r"(?si)<script[^>]*>.*?</script>").unwrap();
    let style_pattern = regex::Regex::new(r"(?si)<style[^>]*>.*?</style>").unwrap();
    let break_pattern =
        regex::Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|h[1-6]|tr|section|article)>").unwrap();
    let tag_pattern = regex::Regex::new(r"<[^>]+>").unwrap();

    let text = script_pattern.replace_all(html, "");
    let text = style_pattern.replace_all(&text, "");
    let text = break_pattern.replace_all(&text, "\n");
    let text = tag_pattern.replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_tags(fragment: &str) -> String {
    let tag_pattern = regex::Regex::new(r"<[^>]+>").unwrap();
    decode_entities(&tag_pattern.replace_all(fragment, ""))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
