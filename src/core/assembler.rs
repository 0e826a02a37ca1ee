use crate::core::turn::{InlineImage, Role, Turn};
use crate::providers::gemini::types::{
    Content, GenerateContentRequest, GenerationConfig, Part, SystemInstruction, ThinkingConfig,
};
use crate::providers::gemini::{MODEL_ROLE, USER_ROLE};

/// Fixed sampling settings sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f64,
    /// Must be non-zero: the pro tier rejects requests with thinking disabled.
    pub thinking_budget: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            thinking_budget: 32768,
        }
    }
}

const SYSTEM_PROMPT: &str = "You are Gemigroq Ultimate, a world-class AI assistant powered by {model}.
Current User Location: {location}.
Capabilities: High-intelligence reasoning, vision-based analysis, and professional communication.
Guidelines:
- Provide dense, high-value information.
- Be concise unless the user asks for detail.
- If images are provided, analyze them deeply in the context of the conversation.
- Maintain a helpful, sophisticated, and expert persona.";

pub fn system_instruction(model: &str, location: &str) -> String {
    SYSTEM_PROMPT
        .replace("{model}", model)
        .replace("{location}", location)
}

pub fn provider_role(role: Role) -> &'static str {
    match role {
        Role::User => USER_ROLE,
        Role::Assistant => MODEL_ROLE,
    }
}

fn turn_content(turn: &Turn) -> Content {
    let mut parts = vec![Part::text(turn.content.clone())];
    if let Some(image) = &turn.image {
        parts.push(Part::inline_data(image.data.clone(), image.mime_type.clone()));
    }
    Content {
        role: Some(provider_role(turn.role).to_string()),
        parts,
    }
}

/// Build the provider request for `history`.
///
/// `image` is a fresh attachment for the newest message. It is only added
/// when the trailing turn is a user turn that does not already carry one.
pub fn assemble(
    history: &[Turn],
    location: &str,
    image: Option<&InlineImage>,
    model: &str,
    settings: GenerationSettings,
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history.iter().map(turn_content).collect();

    if let (Some(image), Some(last)) = (image, history.last()) {
        if last.role == Role::User && last.image.is_none() {
            if let Some(content) = contents.last_mut() {
                content
                    .parts
                    .push(Part::inline_data(image.data.clone(), image.mime_type.clone()));
            }
        }
    }

    GenerateContentRequest {
        contents,
        system_instruction: SystemInstruction {
            parts: vec![Part::text(system_instruction(model, location))],
        },
        generation_config: GenerationConfig {
            temperature: settings.temperature,
            thinking_config: ThinkingConfig {
                thinking_budget: settings.thinking_budget,
            },
        },
    }
}
