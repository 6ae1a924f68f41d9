//! Core domain types for Genie.
//!
//! This crate holds the pure data model shared by the planner, the post
//! store, the orchestrator, and the provider client: platforms and their
//! per-platform configuration, personas, generation targets, and the
//! per-post lifecycle states. No IO, no async.

pub mod ids;
pub mod persona;
pub mod platform;
pub mod post;
pub mod target;

pub use ids::PostId;
pub use persona::{MAX_PERSONAS, PersonaError, PersonaList};
pub use platform::{Platform, PlatformConfig, default_platform_configs};
pub use post::{Hashtags, ImageRef, ImageState, MAX_HASHTAGS, Post, PostContent, TextState};
pub use target::{GenerationTarget, TargetKey};

use std::fmt;

// ============================================================================
// API Key
// ============================================================================

/// Gemini API key.
///
/// `Debug` is manually implemented to redact the key value, preventing
/// accidental credential disclosure in logs or error messages.
#[derive(Clone)]
pub struct ApiKey(String);

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

impl ApiKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Output Length
// ============================================================================

/// Requested length of the generated post message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum OutputLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl OutputLength {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "short" => Some(Self::Short),
            "medium" => Some(Self::Medium),
            "long" => Some(Self::Long),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for OutputLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
