//! Generation target planning.
//!
//! Planning is a pure function over an immutable snapshot: the platform
//! configuration, the active personas, the mix flag, and the existing
//! posts. The orchestrator alone commits results back to the store.
//!
//! A target counts as satisfied by *any* post whose target key matches,
//! including still-pending placeholders and failed posts. Failed posts
//! therefore permanently satisfy their triple and are never re-offered;
//! regeneration is a manual concern.

use genie_types::{GenerationTarget, PlatformConfig, Post};

/// Compute the next outstanding target, or `None` when every
/// platform/count/persona combination implied by the configuration
/// already has a matching post (or no valid target can be formed).
///
/// Ordering is deterministic: platform enumeration order, then count
/// index ascending, then persona index ascending.
#[must_use]
pub fn next_target(
    configs: &[PlatformConfig],
    active_personas: &[String],
    mix_mode: bool,
    posts: &[Post],
) -> Option<GenerationTarget> {
    if active_personas.is_empty() {
        return None;
    }

    let satisfied = |target: GenerationTarget| posts.iter().any(|post| post.target.matches(target));

    for config in configs.iter().filter(|config| config.contributes()) {
        for count_index in 0..config.count {
            if mix_mode {
                let target = GenerationTarget::mixed(config.platform, count_index);
                if !satisfied(target) {
                    return Some(target);
                }
            } else {
                for persona_index in 0..active_personas.len() {
                    let target =
                        GenerationTarget::per_persona(config.platform, count_index, persona_index);
                    if !satisfied(target) {
                        return Some(target);
                    }
                }
            }
        }
    }

    None
}

/// Total number of posts the current configuration implies. Display
/// only; control flow always goes through [`next_target`].
#[must_use]
pub fn total_planned(configs: &[PlatformConfig], active_personas: &[String], mix_mode: bool) -> u32 {
    let personas = active_personas.len().max(1) as u32;
    configs
        .iter()
        .filter(|config| config.contributes())
        .map(|config| {
            if mix_mode {
                config.count
            } else {
                config.count * personas
            }
        })
        .sum()
}
