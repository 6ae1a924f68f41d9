//! Post records and their per-axis lifecycle states.
//!
//! The text and image axes progress independently. Each axis is an
//! explicit tagged variant rather than a busy flag plus nullable fields,
//! so states like "image loading with no request" are unrepresentable.

use serde::{Deserialize, Serialize};

use crate::ids::PostId;
use crate::platform::Platform;
use crate::target::TargetKey;

/// Maximum number of hashtags kept on a post.
pub const MAX_HASHTAGS: usize = 5;

/// Hashtag list capped at [`MAX_HASHTAGS`] entries.
///
/// Construction truncates; the cap can never be exceeded after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hashtags(Vec<String>);

impl Hashtags {
    #[must_use]
    pub fn from_raw(mut tags: Vec<String>) -> Self {
        tags.truncate(MAX_HASHTAGS);
        Self(tags)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hashtags joined by single spaces, the export wire form.
    #[must_use]
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

/// Parsed text content of a generated post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub message: String,
    pub hashtags: Hashtags,
    pub visual_suggestion: String,
}

/// Text axis of the post lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextState {
    /// Placeholder inserted the instant the target was claimed; the text
    /// call is still outstanding.
    Pending { interim: String },
    Ready(PostContent),
    Failed { message: String },
}

impl TextState {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, TextState::Pending { .. })
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, TextState::Ready(_))
    }
}

/// A produced image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageRef {
    /// Inline image bytes as a data URI.
    Data(String),
    /// Deterministic fallback URL, seeded by the prompt so repeated
    /// failures for the same prompt stay stable but distinguishable.
    Placeholder(String),
}

impl ImageRef {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            ImageRef::Data(url) | ImageRef::Placeholder(url) => url,
        }
    }
}

/// Image axis of the post lifecycle. Starts at `NotRequested`; moves only
/// on explicit user action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageState {
    #[default]
    NotRequested,
    Loading,
    Ready(ImageRef),
    Failed,
}

impl ImageState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, ImageState::Loading)
    }
}

/// One produced or in-flight post.
///
/// Owned exclusively by the store; in-flight operations hold only the id
/// and apply their results by id against the latest snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub platform: Platform,
    pub text: TextState,
    pub image: ImageState,
    /// Prompt to use for on-demand image generation; derived from the
    /// visual suggestion when the text call resolves.
    pub image_prompt: String,
    pub target: TargetKey,
}

impl Post {
    /// Build the placeholder record for a freshly-claimed target.
    #[must_use]
    pub fn placeholder(id: PostId, target: TargetKey, interim: String) -> Self {
        Self {
            id,
            platform: target.platform,
            text: TextState::Pending { interim },
            image: ImageState::NotRequested,
            image_prompt: String::new(),
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::target::{GenerationTarget, TargetKey};

    fn tags(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn hashtags_truncate_to_cap() {
        let tags = Hashtags::from_raw(tags(&["#a", "#b", "#c", "#d", "#e", "#f", "#g"]));
        assert_eq!(tags.as_slice().len(), MAX_HASHTAGS);
        assert_eq!(tags.as_slice()[4], "#e");
    }

    #[test]
    fn hashtags_joined_by_spaces() {
        let tags = Hashtags::from_raw(tags(&["#one", "#two"]));
        assert_eq!(tags.joined(), "#one #two");
    }

    #[test]
    fn placeholder_starts_pending_with_no_image() {
        let target = GenerationTarget::mixed(Platform::Facebook, 0);
        let id = PostId::mint(1, 1, target);
        let post = Post::placeholder(
            id,
            TargetKey::new(target, None),
            "Generating...".into(),
        );
        assert!(post.text.is_pending());
        assert_eq!(post.image, ImageState::NotRequested);
        assert!(post.image_prompt.is_empty());
    }
}
