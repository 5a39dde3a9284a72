//! Parsing collaborators for the connectors.
//!
//! These are deliberately small: connectors need a title, a flattened text
//! body, sitemap `loc` entries, and feed entries as field maps. Anything
//! richer than that belongs to the source-specific extraction code, not
//! here.

pub mod html;
pub mod xml;
