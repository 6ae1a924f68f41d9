//! Prompt construction for the text and image operations.
//!
//! Every platform gets distinct stylistic guidance (tone, length
//! convention, visual-medium expectation) and every output length gets
//! distinct instruction text; the response-shape contract pins the
//! structured-JSON keys the parser expects.

use std::fmt::Write;

use genie_types::{OutputLength, Platform};

/// Platform-specific stylistic guidance embedded in every text request.
const PLATFORM_GUIDELINES: &str = "\
PLATFORM-SPECIFIC GUIDELINES:
- Instagram: Visually driven. Message can be longer (up to 2,200 characters), storytelling. Use a mix of popular and niche hashtags. Visuals: high-quality photos, carousels, reels.
- Facebook: Versatile. Message length flexible (can be long). Visuals: engaging images, videos, links. Hashtags are useful but less critical than Instagram.
- Twitter (X): Concise messages (ideally under 280 characters). Use relevant, trending hashtags. Visuals: impactful images, GIFs, short videos, memes.
- LinkedIn: Professional tone. Longer messages, articles, industry insights (up to 3,000 characters for posts). Visuals: infographics, professional photos, charts, document shares. Hashtags: industry-specific.
- TikTok: Short-form video. For 'visualSuggestion', describe a compelling 15-60 second video concept. Message is minimal (caption up to 300 characters), often includes a call to action. Use trending sounds/challenges and relevant hashtags for discoverability.";

#[must_use]
pub const fn length_guidance(length: OutputLength) -> &'static str {
    match length {
        OutputLength::Short => {
            "Keep the post message concise and to the point (e.g., 1-2 sentences for platforms like Twitter, a short paragraph for others)."
        }
        OutputLength::Medium => {
            "Aim for a message of moderate length, balancing detail with readability."
        }
        OutputLength::Long => {
            "Feel free to elaborate and provide a more detailed and comprehensive message, within the platform's typical limits."
        }
    }
}

/// Build the system instruction for a text request.
#[must_use]
pub fn system_instruction(
    language: &str,
    length: OutputLength,
    custom_instructions: Option<&str>,
    avoidance_instructions: Option<&str>,
) -> String {
    let mut instruction = format!(
        "You are an expert social media content creator.\n\
         Your task is to generate content for a social media post in {language}, adapting it specifically for the TARGET PLATFORM.\n\
         Respond strictly in JSON format. The JSON object MUST have the following keys:\n\
         - \"message\": A string containing the post message in {language}.\n\
         - \"hashtags\": An array of exactly 5 strings, each being a relevant hashtag in {language} or universally applicable.\n\
         - \"visualSuggestion\": A string describing a high-performing visual concept for this post, described in {language}.\n\n\
         {PLATFORM_GUIDELINES}\n\n\
         Ensure the message, hashtags, and visual suggestion are engaging, in {language}, and perfectly tailored to the specified platform, respecting typical character limits and content styles.",
    );

    let _ = write!(instruction, "\n{}", length_guidance(length));

    if let Some(custom) = custom_instructions.map(str::trim).filter(|s| !s.is_empty()) {
        let _ = write!(instruction, "\nADDITIONAL INSTRUCTIONS TO FOLLOW: {custom}");
    }
    if let Some(avoid) = avoidance_instructions
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let _ = write!(instruction, "\nIMPORTANT: AVOID THE FOLLOWING: {avoid}");
    }

    instruction
}

/// Build the user turn for a text request.
#[must_use]
pub fn user_prompt(persona: &str, objective: &str, platform: Platform, language: &str) -> String {
    format!(
        "Generate content for one social media post in {language} with the following details:\n\
         Target Persona(s): {persona}\n\
         Post Objective: {objective}\n\
         Target Platform: {platform}\n\
         Output Language: {language}\n\n\
         Remember to strictly follow the PLATFORM-SPECIFIC GUIDELINES and any output length, custom, or avoidance instructions provided. Generate all text in {language}.\n\
         For 'visualSuggestion':\n\
         - If TikTok: describe a short video concept (e.g., \"A 15-second fast-paced video showcasing the product's top 3 features with upbeat trending music and on-screen text overlays.\")\n\
         - For other platforms: describe a suitable image or graphic. Provide specific and creative ideas. The message should be ready to publish.",
    )
}

/// Wrap an image concept in the platform-annotated framing sent to the
/// image model.
#[must_use]
pub fn image_prompt(concept: &str, platform: Platform) -> String {
    let video_hint = if platform == Platform::TikTok {
        " If possible, depict a key frame or concept for a short video."
    } else {
        ""
    };
    format!(
        "Generate an eye-catching, high-quality social media visual for {platform} based on this concept: \"{concept}\". \
         Ensure it's engaging and suitable for {platform}. Modern and clean aesthetic.{video_hint}",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_names_every_platform() {
        let instruction = system_instruction("English", OutputLength::Medium, None, None);
        for platform in genie_types::Platform::ALL {
            assert!(
                instruction.contains(platform.as_str()),
                "missing guidance for {platform}"
            );
        }
    }

    #[test]
    fn length_guidance_is_distinct_per_mode() {
        let short = length_guidance(OutputLength::Short);
        let medium = length_guidance(OutputLength::Medium);
        let long = length_guidance(OutputLength::Long);
        assert_ne!(short, medium);
        assert_ne!(medium, long);
        assert_ne!(short, long);
    }

    #[test]
    fn custom_and_avoidance_instructions_are_appended() {
        let instruction = system_instruction(
            "English",
            OutputLength::Short,
            Some("  use humor  "),
            Some("no superlatives"),
        );
        assert!(instruction.contains("ADDITIONAL INSTRUCTIONS TO FOLLOW: use humor"));
        assert!(instruction.contains("AVOID THE FOLLOWING: no superlatives"));
    }

    #[test]
    fn blank_optional_instructions_are_dropped() {
        let instruction =
            system_instruction("English", OutputLength::Short, Some("   "), Some(""));
        assert!(!instruction.contains("ADDITIONAL INSTRUCTIONS"));
        assert!(!instruction.contains("AVOID THE FOLLOWING"));
    }

    #[test]
    fn user_prompt_carries_request_fields() {
        let prompt = user_prompt(
            "indie developers",
            "launch the beta",
            Platform::LinkedIn,
            "English",
        );
        assert!(prompt.contains("indie developers"));
        assert!(prompt.contains("launch the beta"));
        assert!(prompt.contains("LinkedIn"));
    }

    #[test]
    fn image_prompt_adds_video_hint_only_for_tiktok() {
        let tiktok = image_prompt("a sunrise", Platform::TikTok);
        let insta = image_prompt("a sunrise", Platform::Instagram);
        assert!(tiktok.contains("key frame"));
        assert!(!insta.contains("key frame"));
        assert!(insta.contains("a sunrise"));
    }
}
