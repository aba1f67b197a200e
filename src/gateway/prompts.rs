//! Prompt templates sent to the model.

use super::ContentRequest;
use crate::models::ProjectType;

/// Prompt attached to every image analysis.
pub const VISION_PROMPT: &str = r#"Analyze this image in detail and provide:
1. A comprehensive description of what you see
2. Key objects, people, or elements identified
3. The setting or context
4. Any notable features, colors, or composition elements
5. Any text visible in the image
6. The overall mood or atmosphere

Please be thorough and descriptive in your analysis."#;

/// Minimal prompt used to probe connectivity.
pub const HEALTH_PROMPT: &str = "Hello, respond with 'API working' to confirm connectivity.";

pub const CHAT_FALLBACK: &str =
    "I apologize, but I couldn't generate a response. Please try again.";
pub const VISION_FALLBACK: &str =
    "Unable to analyze the image. Please try uploading a different image.";
pub const CONTENT_FALLBACK: &str =
    "Unable to generate content. Please try again with different parameters.";

/// Build the content-generation prompt for a request.
pub fn content_prompt(request: &ContentRequest) -> String {
    let topic = &request.topic;
    let tone = &request.tone;
    let words = request.length.word_range();

    let mut prompt = match request.content_type {
        ProjectType::Blog => format!(
            "Write a comprehensive blog post about \"{topic}\".\n\n\
             Requirements:\n\
             - Tone: {tone}\n\
             - Length: {words} words\n\
             - Include an engaging title\n\
             - Structure with clear headings and subheadings\n\
             - Provide valuable insights and information\n\
             - Include a compelling introduction and conclusion\n\
             - Make it SEO-friendly and engaging for readers"
        ),
        ProjectType::Social => format!(
            "Create engaging social media content about \"{topic}\".\n\n\
             Requirements:\n\
             - Tone: {tone}\n\
             - Generate 3-5 different posts for various platforms\n\
             - Include relevant hashtags\n\
             - Keep posts concise and engaging\n\
             - Optimize for social media engagement\n\
             - Consider platform-specific formats (Twitter, LinkedIn, Instagram, etc.)"
        ),
        ProjectType::Email => format!(
            "Write an effective email campaign about \"{topic}\".\n\n\
             Requirements:\n\
             - Tone: {tone}\n\
             - Length: {words} words\n\
             - Include compelling subject line\n\
             - Clear call-to-action\n\
             - Engaging opening and closing\n\
             - Personalized and conversion-focused\n\
             - Professional email structure"
        ),
        ProjectType::Other => format!(
            "Create content about \"{topic}\" with a {tone} tone, approximately {words} words."
        ),
    };

    if let Some(instructions) = request
        .instructions
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        prompt.push_str("\n\nAdditional instructions: ");
        prompt.push_str(instructions);
    }

    prompt
}
