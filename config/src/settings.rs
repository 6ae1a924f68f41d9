//! The user-facing generation settings snapshot.

use serde::{Deserialize, Serialize};

use genie_types::{OutputLength, PersonaList, Platform, PlatformConfig, default_platform_configs};

/// Default seeded persona, matching the product's starting state.
pub const DEFAULT_PERSONA: &str =
    "Tech-savvy young professionals interested in innovative solutions and lifestyle improvements.";
/// Default campaign objective.
pub const DEFAULT_OBJECTIVE: &str =
    "Increase brand awareness and engagement for a new productivity app.";
/// Default creativity temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default output language.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Everything the planner and orchestrator need to know about what the
/// user wants generated.
///
/// The orchestrator owns one of these and hands immutable snapshots to
/// the planner; nothing else mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub personas: PersonaList,
    pub objective: String,
    pub language: String,
    pub platforms: Vec<PlatformConfig>,
    /// Mix mode: all active personas are combined into a single target
    /// per platform/count slot instead of one target per persona.
    pub mix_personas: bool,
    pub output_length: OutputLength,
    temperature: f32,
    pub custom_instructions: Option<String>,
    pub avoidance_instructions: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            personas: PersonaList::new(vec![DEFAULT_PERSONA.to_string()]),
            objective: DEFAULT_OBJECTIVE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            platforms: default_platform_configs(),
            mix_personas: false,
            output_length: OutputLength::default(),
            temperature: DEFAULT_TEMPERATURE,
            custom_instructions: None,
            avoidance_instructions: None,
        }
    }
}

impl GenerationSettings {
    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Set the creativity temperature, clamped to `0.0..=1.0`.
    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature.clamp(0.0, 1.0);
    }

    pub fn select_platform(&mut self, platform: Platform, selected: bool) {
        if let Some(config) = self
            .platforms
            .iter_mut()
            .find(|config| config.platform == platform)
        {
            config.select(selected);
        }
    }

    pub fn set_platform_count(&mut self, platform: Platform, count: u32) {
        if let Some(config) = self
            .platforms
            .iter_mut()
            .find(|config| config.platform == platform)
        {
            config.set_count(count);
        }
    }
}
