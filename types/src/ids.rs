//! Post identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::target::GenerationTarget;

/// Stable, never-reused identifier for a post.
///
/// The id embeds a zero-padded millisecond creation timestamp followed by
/// a monotonic sequence number, so under a monotonic clock lexicographic
/// *descending* order over ids equals newest-first. The tail carries the
/// target descriptor for human inspection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Mint an id for a claimed target.
    ///
    /// `seq` disambiguates ids minted within the same millisecond; the
    /// caller guarantees it is strictly increasing across mints.
    #[must_use]
    pub fn mint(timestamp_millis: i64, seq: u64, target: GenerationTarget) -> Self {
        let persona = target
            .persona_index
            .map_or_else(|| "mixed".to_string(), |index| format!("p{index}"));
        Self(format!(
            "{timestamp_millis:013}-{seq:06}-{}-c{}-{persona}",
            target.platform.id_tag(),
            target.count_index,
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
