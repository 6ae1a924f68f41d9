//! Generation targets: the identity of one planned-but-not-yet-produced post.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// One planned unit of work: a `(platform, count index, persona index)`
/// triple. `persona_index` is `Some` only in non-mix mode, where it
/// indexes into the *active* persona subsequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTarget {
    pub platform: Platform,
    pub count_index: u32,
    pub persona_index: Option<usize>,
}

impl GenerationTarget {
    #[must_use]
    pub const fn mixed(platform: Platform, count_index: u32) -> Self {
        Self {
            platform,
            count_index,
            persona_index: None,
        }
    }

    #[must_use]
    pub const fn per_persona(platform: Platform, count_index: u32, persona_index: usize) -> Self {
        Self {
            platform,
            count_index,
            persona_index: Some(persona_index),
        }
    }
}

/// The originating target of an existing post, preserved for planner
/// matching and export.
///
/// The planner decides whether a target is already satisfied by comparing
/// against this key, never against the post id, so a placeholder inserted
/// the instant a target is claimed already counts as satisfying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetKey {
    pub platform: Platform,
    pub count_index: u32,
    pub persona_index: Option<usize>,
    /// The persona text used, when a specific persona was targeted.
    pub persona_text: Option<String>,
}

impl TargetKey {
    #[must_use]
    pub fn new(target: GenerationTarget, persona_text: Option<String>) -> Self {
        Self {
            platform: target.platform,
            count_index: target.count_index,
            persona_index: target.persona_index,
            persona_text,
        }
    }

    /// True when this key satisfies the given target triple.
    #[must_use]
    pub fn matches(&self, target: GenerationTarget) -> bool {
        self.platform == target.platform
            && self.count_index == target.count_index
            && self.persona_index == target.persona_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_matches_full_triple() {
        let target = GenerationTarget::per_persona(Platform::Instagram, 1, 0);
        let key = TargetKey::new(target, Some("devs".into()));
        assert!(key.matches(target));
        assert!(!key.matches(GenerationTarget::per_persona(Platform::Instagram, 1, 1)));
        assert!(!key.matches(GenerationTarget::per_persona(Platform::Facebook, 1, 0)));
        assert!(!key.matches(GenerationTarget::mixed(Platform::Instagram, 1)));
    }

    #[test]
    fn mixed_key_does_not_match_per_persona_target() {
        let key = TargetKey::new(GenerationTarget::mixed(Platform::TikTok, 0), None);
        assert!(key.matches(GenerationTarget::mixed(Platform::TikTok, 0)));
        assert!(!key.matches(GenerationTarget::per_persona(Platform::TikTok, 0, 0)));
    }
}
