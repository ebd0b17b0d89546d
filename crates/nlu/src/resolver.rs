// crates/nlu/src/resolver.rs

use barista_core::{BaristaError, BaristaResult, MenuItem};

/// Canonicalizes a raw slot capture against catalog items.
pub struct SlotResolver;

impl SlotResolver {
    /// Returns the first candidate whose name contains the first token of
    /// `raw`, compared case-insensitively. Only the first token is used, so
    /// word order in the capture matters.
    pub fn resolve<'a>(raw: &str, candidates: &'a [MenuItem]) -> BaristaResult<&'a MenuItem> {
        let token = raw
            .split_whitespace()
            .next()
            .map(str::to_lowercase)
            .ok_or_else(|| BaristaError::NoMatch {
                raw: raw.to_string(),
            })?;

        candidates
            .iter()
            .find(|item| item.name.to_lowercase().contains(&token))
            .ok_or_else(|| BaristaError::NoMatch {
                raw: raw.to_string(),
            })
    }
}
