pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::core::retriever::Retriever;
use crate::core::turn::{Conversation, InlineImage};
pub use dispatcher::create_command_registry;

/// Everything a slash command may inspect or change between requests.
pub struct ChatState {
    pub conversation: Conversation,
    pub retriever: Retriever,
    /// Image staged with `/image`, sent with the next message.
    pub pending_image: Option<InlineImage>,
    /// Set by `/key`; the chat loop opens the credential selector.
    pub key_requested: bool,
    pub should_continue: bool,
}

impl ChatState {
    pub fn new(retriever: Retriever, location: &str) -> Self {
        Self {
            conversation: Conversation::new(location),
            retriever,
            pending_image: None,
            key_requested: false,
            should_continue: true,
        }
    }
}
