//! Canonical location keys.
//!
//! Every source describes locations differently: structured city/state/country
//! fields, pre-formatted strings, or a free-text line scraped out of a detail
//! page. The one shape they all converge on is the canonical key
//! `COUNTRY-STATE-CITY`, which is sortable, comparable across sources, and
//! reversible by [`display`].
//!
//! The key format is knowingly lossy when a component itself contains a
//! hyphen (a hyphenated city ends up absorbed into the CITY part on display,
//! a hyphenated state would shift the split). We preserve that ambiguity
//! rather than escaping: [`display`] splits with at most two cuts, so the
//! third part keeps any extra hyphens verbatim, and callers who need exact
//! round-trips must keep hyphens out of country and state.

/// Uppercase country/state vocabulary is *not* enforced here; `normalize`
/// only uppercases whatever text it is given. Connectors that see free-text
/// country names map the common United States spellings through this table
/// before calling [`normalize`], so "United States", "USA" and "US" land on
/// one key instead of three.
pub fn canonical_country(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "united states" | "united states of america" | "usa" | "us" => "US".to_string(),
        _ => trimmed.to_string(),
    }
}

/// Build the canonical `COUNTRY-STATE-CITY` key.
///
/// All three inputs are trimmed. Country and state are uppercased verbatim,
/// city is whitespace-collapsed, title-cased per word, then spaces become
/// underscores. Returns `None` only when all three components are empty
/// after trimming; otherwise the key always has all three positions, so an
/// empty state or city produces adjacent hyphens (e.g. `"FR--Paris"` style).
pub fn normalize(country: &str, state: &str, city: &str) -> Option<String> {
    let country = country.trim().to_uppercase();
    let state = state.trim().to_uppercase();
    let city = clean_city(city);

    if country.is_empty() && state.is_empty() && city.is_empty() {
        return None;
    }

    Some(format!("{country}-{state}-{city}"))
}

/// Format a canonical key back into a human string: `"City, State, Country"`,
/// omitting the state when empty, with city underscores converted back to
/// spaces. Keys that do not split into exactly three parts are returned
/// unchanged.
pub fn display(key: &str) -> String {
    let parts: Vec<&str> = key.splitn(3, '-').collect();
    let [country, state, city] = parts.as_slice() else {
        return key.to_string();
    };

    let city = city.replace('_', " ");
    if state.is_empty() {
        format!("{city}, {country}")
    } else {
        format!("{city}, {state}, {country}")
    }
}

/// Title-case per word, collapse internal whitespace, replace spaces with
/// underscores for key stability. Hyphenated city names keep their hyphens.
fn clean_city(city: &str) -> String {
    city.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join("_")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
