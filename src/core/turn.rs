use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Image carried inline with a turn: base64 payload plus its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub image: Option<InlineImage>,
    pub timestamp: DateTime<Local>,
    pub error: bool,
}

impl Turn {
    pub fn user(content: impl Into<String>, image: Option<InlineImage>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            image,
            timestamp: Local::now(),
            error: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            image: None,
            timestamp: Local::now(),
            error: false,
        }
    }

    /// A failed reply, shown inline where the assistant's answer would be.
    pub fn failed(message: &str) -> Self {
        Self {
            error: true,
            ..Self::assistant(format!("🚨 {}", message))
        }
    }
}

/// Append-only transcript plus the location that parameterizes the persona.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
    pub location: String,
}

impl Conversation {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            turns: Vec::new(),
            location: location.into(),
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_turn_is_flagged_assistant_turn() {
        let turn = Turn::failed("Rate limit exceeded.");
        assert_eq!(turn.role, Role::Assistant);
        assert!(turn.error);
        assert_eq!(turn.content, "🚨 Rate limit exceeded.");
    }

    #[test]
    fn conversation_keeps_insertion_order() {
        let mut conversation = Conversation::new("Belfair, WA");
        conversation.push(Turn::user("first", None));
        conversation.push(Turn::assistant("second"));
        conversation.push(Turn::user("third", None));

        let contents: Vec<&str> = conversation
            .turns()
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);

        conversation.clear();
        assert!(conversation.is_empty());
        assert_eq!(conversation.location, "Belfair, WA");
    }
}
