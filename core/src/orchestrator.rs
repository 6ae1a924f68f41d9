//! Generation orchestrator.
//!
//! The orchestrator owns the settings, the post store, and the provider
//! client, and sequences the two generation flows:
//!
//! * text generation is strictly serialized. A single in-flight flag
//!   rejects overlapping requests with [`TextFlowOutcome::Busy`] instead
//!   of queueing them, and the claimed target's placeholder is inserted
//!   under the store lock so a concurrent re-plan cannot hand the same
//!   triple out twice.
//! * image generation runs per post with no global flag; any number of
//!   posts can be loading images concurrently.
//!
//! In-flight operations hold only a [`PostId`] and commit through
//! [`PostStore::update`], so a reset that races a pending result simply
//! drops that result.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::Mutex;

use genie_config::{Credentials, GenerationSettings};
use genie_providers::{GeminiClient, TextRequest};
use genie_types::{
    GenerationTarget, ImageRef, ImageState, Platform, Post, PostId, TextState,
};

use crate::planner;
use crate::store::PostStore;

/// Why a generation request was refused before any provider call.
///
/// Checked in a fixed order: credentials, personas, objective, language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("no API key configured")]
    CredentialsMissing,
    #[error("at least one non-empty persona is required")]
    NoActivePersona,
    #[error("a campaign objective is required")]
    ObjectiveRequired,
    #[error("an output language is required")]
    LanguageRequired,
}

/// Result of one text-generation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextFlowOutcome {
    /// Refused by a precondition; nothing was inserted.
    Rejected(RejectReason),
    /// Another text generation is already in flight.
    Busy,
    /// Every planned target already has a post.
    Exhausted,
    /// A fully-parsed post was produced.
    Completed(PostId),
    /// The provider responded but the content could not be validated;
    /// a synthesized inspectable record was stored instead.
    Degraded(PostId),
    /// The provider call failed; the post is marked failed and its
    /// target stays satisfied.
    Failed(PostId),
}

/// Result of one image-generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFlowOutcome {
    Rejected(RejectReason),
    /// The post no longer exists, so the request (or its result) was
    /// dropped.
    StalePost,
    /// A real image was attached.
    Completed(PostId),
    /// A deterministic placeholder was attached instead of a real image.
    Placeholder(PostId),
    /// The request was rejected by the provider; the image axis is
    /// marked failed.
    Failed(PostId),
}

pub struct Orchestrator {
    store: Mutex<PostStore>,
    settings: Mutex<GenerationSettings>,
    client: Option<GeminiClient>,
    last_error: Mutex<Option<String>>,
    text_in_flight: AtomicBool,
}

/// Clears the in-flight flag when the text flow returns, including on
/// early returns and cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Orchestrator {
    /// Build from startup credentials with default settings. Missing
    /// credentials yield a working orchestrator whose generation flows
    /// reject with [`RejectReason::CredentialsMissing`].
    #[must_use]
    pub fn new(credentials: &Credentials) -> Self {
        let client = credentials.api_key().cloned().map(GeminiClient::new);
        Self::from_client(client, GenerationSettings::default())
    }

    #[must_use]
    pub fn from_client(client: Option<GeminiClient>, settings: GenerationSettings) -> Self {
        Self {
            store: Mutex::new(PostStore::new()),
            settings: Mutex::new(settings),
            client,
            last_error: Mutex::new(None),
            text_in_flight: AtomicBool::new(false),
        }
    }

    /// Claim the next planned target, insert its placeholder, and drive
    /// the text call to a terminal state.
    pub async fn generate_next_text(&self) -> TextFlowOutcome {
        self.clear_error().await;

        let Some(client) = &self.client else {
            return TextFlowOutcome::Rejected(RejectReason::CredentialsMissing);
        };
        if self.text_in_flight.swap(true, Ordering::SeqCst) {
            return TextFlowOutcome::Busy;
        }
        let _guard = InFlightGuard(&self.text_in_flight);

        let settings = self.settings.lock().await.clone();
        let active = settings.personas.active();
        if active.is_empty() {
            return TextFlowOutcome::Rejected(RejectReason::NoActivePersona);
        }
        if settings.objective.trim().is_empty() {
            return TextFlowOutcome::Rejected(RejectReason::ObjectiveRequired);
        }
        if settings.language.trim().is_empty() {
            return TextFlowOutcome::Rejected(RejectReason::LanguageRequired);
        }

        // Plan and claim under one store lock so the placeholder lands
        // before anyone else can plan against the same snapshot.
        let (id, target, persona) = {
            let mut store = self.store.lock().await;
            let Some(target) = planner::next_target(
                &settings.platforms,
                &active,
                settings.mix_personas,
                store.posts(),
            ) else {
                return TextFlowOutcome::Exhausted;
            };
            let persona = persona_for_target(target, &active);
            let interim = interim_message(target, &settings.language);
            let persona_text = target.persona_index.map(|_| persona.clone());
            let id = store.insert_placeholder(target, persona_text, interim);
            (id, target, persona)
        };

        tracing::info!(post_id = %id, platform = %target.platform, "Generating post text");

        let request = TextRequest {
            persona,
            objective: settings.objective.clone(),
            platform: target.platform,
            language: settings.language.clone(),
            temperature: settings.temperature(),
            output_length: settings.output_length,
            custom_instructions: settings.custom_instructions.clone(),
            avoidance_instructions: settings.avoidance_instructions.clone(),
        };

        match client.generate_post_text(&request).await {
            Ok(outcome) => {
                let degraded = outcome.is_degraded();
                let content = outcome.into_content();
                let image_prompt = derive_image_prompt(
                    &content.visual_suggestion,
                    target.platform,
                    &settings.objective,
                );
                let applied = self.store.lock().await.update(&id, |post| {
                    post.image_prompt = image_prompt;
                    post.text = TextState::Ready(content);
                });
                if !applied {
                    tracing::debug!(post_id = %id, "Dropping text result for removed post");
                }
                if degraded {
                    TextFlowOutcome::Degraded(id)
                } else {
                    TextFlowOutcome::Completed(id)
                }
            }
            Err(e) => {
                tracing::warn!(post_id = %id, error = %e, "Text generation failed");
                self.record_error(&e.to_string()).await;
                let applied = self.store.lock().await.update(&id, |post| {
                    post.text = TextState::Failed {
                        message: format!("Error: {e}"),
                    };
                });
                if !applied {
                    tracing::debug!(post_id = %id, "Dropping text failure for removed post");
                }
                TextFlowOutcome::Failed(id)
            }
        }
    }

    /// Drive generation until the plan is exhausted or a request is
    /// refused, returning every terminal step outcome in order.
    pub async fn generate_all_text(&self) -> Vec<TextFlowOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let outcome = self.generate_next_text().await;
            match outcome {
                TextFlowOutcome::Exhausted => break,
                TextFlowOutcome::Rejected(_) | TextFlowOutcome::Busy => {
                    outcomes.push(outcome);
                    break;
                }
                _ => outcomes.push(outcome),
            }
        }
        outcomes
    }

    /// Request an image for an existing post, using its stored prompt.
    pub async fn generate_image(&self, post_id: &PostId) -> ImageFlowOutcome {
        self.clear_error().await;

        let Some(client) = &self.client else {
            return ImageFlowOutcome::Rejected(RejectReason::CredentialsMissing);
        };

        let (image_prompt, platform) = {
            let mut store = self.store.lock().await;
            let Some(post) = store.get(post_id) else {
                return ImageFlowOutcome::StalePost;
            };
            let prompt = post.image_prompt.clone();
            let platform = post.platform;
            store.update(post_id, |post| {
                post.image = ImageState::Loading;
            });
            (prompt, platform)
        };

        tracing::info!(post_id = %post_id, %platform, "Generating post image");

        match client.generate_post_image(&image_prompt, platform).await {
            Ok(image) => {
                let placeholder = matches!(image, ImageRef::Placeholder(_));
                let applied = self.store.lock().await.update(post_id, |post| {
                    post.image = ImageState::Ready(image);
                });
                if !applied {
                    tracing::debug!(post_id = %post_id, "Dropping image result for removed post");
                    return ImageFlowOutcome::StalePost;
                }
                if placeholder {
                    ImageFlowOutcome::Placeholder(post_id.clone())
                } else {
                    ImageFlowOutcome::Completed(post_id.clone())
                }
            }
            Err(e) => {
                tracing::warn!(post_id = %post_id, error = %e, "Image generation failed");
                self.record_error(&e.to_string()).await;
                let applied = self.store.lock().await.update(post_id, |post| {
                    post.image = ImageState::Failed;
                });
                if !applied {
                    return ImageFlowOutcome::StalePost;
                }
                ImageFlowOutcome::Failed(post_id.clone())
            }
        }
    }

    /// The next target the planner would claim, without claiming it.
    pub async fn plan_next_target(&self) -> Option<GenerationTarget> {
        let settings = self.settings.lock().await.clone();
        let active = settings.personas.active();
        let store = self.store.lock().await;
        planner::next_target(
            &settings.platforms,
            &active,
            settings.mix_personas,
            store.posts(),
        )
    }

    /// Total number of posts the current settings imply.
    pub async fn total_planned(&self) -> u32 {
        let settings = self.settings.lock().await;
        planner::total_planned(
            &settings.platforms,
            &settings.personas.active(),
            settings.mix_personas,
        )
    }

    pub async fn generated_text_count(&self) -> usize {
        self.store.lock().await.generated_text_count()
    }

    /// Snapshot of all posts, newest first.
    pub async fn posts(&self) -> Vec<Post> {
        self.store.lock().await.posts().to_vec()
    }

    pub async fn get_post(&self, id: &PostId) -> Option<Post> {
        self.store.lock().await.get(id).cloned()
    }

    /// Clear all posts, restore default settings, and clear the error.
    /// Minted ids are never reused, so results of operations still in
    /// flight across the reset are dropped as stale.
    pub async fn reset_all(&self) {
        self.store.lock().await.reset();
        self.settings.lock().await.reset();
        self.clear_error().await;
        tracing::info!("Workspace reset");
    }

    /// The most recent operation error, cleared at the start of every
    /// generation request.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    #[must_use]
    pub fn is_generating_text(&self) -> bool {
        self.text_in_flight.load(Ordering::SeqCst)
    }

    pub async fn settings(&self) -> GenerationSettings {
        self.settings.lock().await.clone()
    }

    pub async fn update_settings(&self, apply: impl FnOnce(&mut GenerationSettings)) {
        apply(&mut *self.settings.lock().await);
    }

    async fn clear_error(&self) {
        *self.last_error.lock().await = None;
    }

    async fn record_error(&self, message: &str) {
        *self.last_error.lock().await = Some(message.to_string());
    }
}

/// The persona text sent to the provider: the targeted persona in
/// per-persona mode, or every active persona joined in mix mode.
fn persona_for_target(target: GenerationTarget, active: &[String]) -> String {
    match target.persona_index {
        Some(index) => active
            .get(index)
            .cloned()
            .unwrap_or_else(|| active.join("\n---\n")),
        None => active.join("\n---\n"),
    }
}

fn interim_message(target: GenerationTarget, language: &str) -> String {
    match target.persona_index {
        Some(index) => format!(
            "Generating {language} text for {} (persona {})...",
            target.platform,
            index + 1
        ),
        None => format!(
            "Generating {language} text for {} (mixed personas)...",
            target.platform
        ),
    }
}

/// Prompt used for later image generation. Falls back to a synthesized
/// description when the provider returned no usable visual suggestion.
fn derive_image_prompt(visual_suggestion: &str, platform: Platform, objective: &str) -> String {
    let trimmed = visual_suggestion.trim();
    if trimmed.is_empty() {
        format!("A social media visual for a {platform} post about: {objective}")
    } else {
        trimmed.to_string()
    }
}
