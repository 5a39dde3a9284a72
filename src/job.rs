//! The canonical job record.

use serde::{Deserialize, Serialize};

/// One job posting in canonical shape, as emitted by every connector.
///
/// Immutable by convention: records are built once during a traversal pass
/// and never mutated afterwards. `job_id` has the form
/// `"<Company>:<stable-id>"` and is globally unique within an aggregated set
/// by construction (source-namespaced, see [`crate::identity`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Source display name (e.g. "Acme Corp")
    pub company: String,

    /// `"<Company>:<stable-id>"`
    pub job_id: String,

    /// Non-empty posting title
    pub title: String,

    /// Absolute URL of the canonical detail page
    pub url: String,

    /// Canonical `COUNTRY-STATE-CITY` key, absent when no location data
    /// could be derived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Full description, populated only by sources that fetch detail pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Job {
    /// Create a job record with the required fields.
    pub fn new(
        company: impl Into<String>,
        job_id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            job_id: job_id.into(),
            title: title.into(),
            url: url.into(),
            location: None,
            description: None,
        }
    }

    /// Set the canonical location key.
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    /// Set the description text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
