mod client;
pub mod types;

pub use client::GeminiClient;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Provider role name for assistant turns.
pub const MODEL_ROLE: &str = "model";
pub const USER_ROLE: &str = "user";
