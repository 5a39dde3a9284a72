//! Sitemap and RSS parsing on top of `quick-xml`.
//!
//! Tag matching is namespace-agnostic throughout: sitemaps in the wild mix
//! prefixed and unprefixed schemas, and feeds bolt on source-specific
//! namespaces for structured fields, so everything here compares local
//! names only.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

/// List every `<loc>` value in a sitemap document, in document order.
///
/// Works for both `<urlset>` and `<sitemapindex>` roots; the caller
/// classifies each entry as a nested sitemap or a content URL.
///
/// Parsing is strict: a document truncated mid-element is an error, not a
/// shorter list. A cut-off sitemap download must read as a bad node to
/// skip, never as a good node with fewer entries. The reader itself does
/// not flag unclosed tags at end of input, so open elements are tracked
/// here and reported when the document ends inside one.
pub fn sitemap_locs(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut locs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                if e.local_name().as_ref() == b"loc" {
                    in_loc = true;
                    current.clear();
                }
            }
            Event::Text(t) if in_loc => {
                current.push_str(&t.unescape()?);
            }
            Event::CData(t) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&t));
            }
            Event::End(e) => {
                open.pop();
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                }
            }
            Event::Eof => {
                if let Some(unclosed) = open.pop() {
                    return Err(quick_xml::Error::IllFormed(
                        quick_xml::errors::IllFormedError::MissingEndTag(unclosed),
                    ));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(locs)
}

/// Parse an RSS document into entries, one field map per `<item>`.
///
/// Field names are lowercased local tag names, so `<dc:locationName>`
/// becomes `locationname` and entries read the same regardless of source
/// namespacing. Parsing is best-effort: a malformed tail yields the entries
/// collected up to that point rather than an error, matching how feed
/// tokenizers behave in practice.
pub fn feed_entries(xml: &str) -> Vec<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current_entry: Option<HashMap<String, String>> = None;
    let mut current_field: Option<String> = None;
    let mut current_value = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                if name == "item" || name == "entry" {
                    current_entry = Some(HashMap::new());
                } else if current_entry.is_some() {
                    current_field = Some(name);
                    current_value.clear();
                }
            }
            Ok(Event::Text(t)) if current_field.is_some() => {
                if let Ok(text) = t.unescape() {
                    current_value.push_str(&text);
                }
            }
            Ok(Event::CData(t)) if current_field.is_some() => {
                current_value.push_str(&String::from_utf8_lossy(&t));
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                if name == "item" || name == "entry" {
                    if let Some(entry) = current_entry.take() {
                        entries.push(entry);
                    }
                    current_field = None;
                } else if let Some(field) = current_field.take() {
                    if field == name {
                        if let Some(entry) = current_entry.as_mut() {
                            entry.insert(field, current_value.trim().to_string());
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            Ok(_) => {}
        }
    }

    entries
}
