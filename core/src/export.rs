//! Plain-text export of a single post.

use std::fmt::Write;

use genie_types::{Post, TextState};

/// Render a post as shareable plain text.
///
/// Pure over the post record: the same post always renders to the same
/// string, whatever its lifecycle state. Pending and failed posts export
/// their interim or failure message in place of the body so an export is
/// never empty.
#[must_use]
pub fn export_post_as_text(post: &Post) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Platform: {}", post.platform);
    if let Some(index) = post.target.persona_index {
        let persona = post
            .target
            .persona_text
            .clone()
            .unwrap_or_else(|| format!("Persona {}", index + 1));
        let _ = writeln!(out, "Target persona: {persona}");
    }
    out.push('\n');

    match &post.text {
        TextState::Pending { interim } => {
            let _ = writeln!(out, "Message:\n{interim}");
        }
        TextState::Ready(content) => {
            let _ = writeln!(out, "Message:\n{}", content.message);
            if !content.hashtags.is_empty() {
                let _ = writeln!(out, "\nHashtags:\n{}", content.hashtags.joined());
            }
            let _ = writeln!(
                out,
                "\nVisual suggestion ({}):\n{}",
                post.platform, content.visual_suggestion
            );
        }
        TextState::Failed { message } => {
            let _ = writeln!(out, "Message:\n{message}");
        }
    }

    if !post.image_prompt.is_empty() {
        let _ = writeln!(out, "\nImage prompt (if generated):\n{}", post.image_prompt);
    }

    out
}
