//! Stable job identity across heterogeneous sources.
//!
//! Sources disagree about identifiers: some APIs carry a numeric job id,
//! detail pages may expose a "Ref ID" token or a numeric URL suffix, and
//! feeds carry nothing reusable at all. Identity resolution walks the
//! upstream candidates in priority order and, when every one of them is
//! missing, falls back to a deterministic digest of the canonical job URL.
//! Identical `(company, url)` inputs therefore always produce the same
//! `job_id`, across runs and across processes, which is what makes the
//! aggregator's map-based dedup idempotent.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the URL digest.
const HASH_ID_LEN: usize = 16;

/// Pick the stable portion of a job id: the first non-empty candidate in
/// priority order, else the truncated SHA-256 of the canonical URL.
pub fn stable_id(preferred: &[Option<&str>], canonical_url: &str) -> String {
    for candidate in preferred {
        if let Some(id) = candidate {
            let id = id.trim();
            if !id.is_empty() {
                return id.to_string();
            }
        }
    }
    url_hash(canonical_url)
}

/// Full job id: `"{company}:{stable_id}"`.
pub fn resolve_id(company: &str, preferred: &[Option<&str>], canonical_url: &str) -> String {
    format!("{company}:{}", stable_id(preferred, canonical_url))
}

fn url_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..HASH_ID_LEN].to_string()
}
