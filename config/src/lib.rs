//! Configuration for Genie: provider credentials and the generation
//! settings snapshot.
//!
//! Credentials are read from the process environment exactly once at
//! startup; their absence is a persistent status that disables all
//! generation operations, not a per-call error.

pub mod settings;

pub use settings::GenerationSettings;

use genie_types::ApiKey;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Legacy fallback variable name.
pub const API_KEY_ENV_FALLBACK: &str = "API_KEY";

/// Default text generation model.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash-preview-04-17";
/// Default image generation model.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";

/// Persistent credential status, resolved once at startup.
#[derive(Debug, Clone)]
pub enum Credentials {
    Configured(ApiKey),
    Missing,
}

impl Credentials {
    /// Read the API key from the environment ([`API_KEY_ENV`], falling
    /// back to [`API_KEY_ENV_FALLBACK`]). Blank values count as missing.
    #[must_use]
    pub fn from_env() -> Self {
        let raw = std::env::var(API_KEY_ENV)
            .or_else(|_| std::env::var(API_KEY_ENV_FALLBACK))
            .ok()
            .filter(|value| !value.trim().is_empty());

        match raw {
            Some(key) => {
                tracing::debug!("API key detected");
                Credentials::Configured(ApiKey::new(key))
            }
            None => {
                tracing::warn!(
                    env = API_KEY_ENV,
                    "API key not set; generation operations are disabled"
                );
                Credentials::Missing
            }
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        matches!(self, Credentials::Configured(_))
    }

    #[must_use]
    pub const fn api_key(&self) -> Option<&ApiKey> {
        match self {
            Credentials::Configured(key) => Some(key),
            Credentials::Missing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_exposes_key() {
        let creds = Credentials::Configured(ApiKey::new("k"));
        assert!(creds.is_configured());
        assert_eq!(creds.api_key().unwrap().expose_secret(), "k");
    }

    #[test]
    fn missing_has_no_key() {
        let creds = Credentials::Missing;
        assert!(!creds.is_configured());
        assert!(creds.api_key().is_none());
    }
}
