use super::{
    ChatState,
    handler::{
        ClearCommand, ExportCommand, HelpCommand, ImageCommand, KeyCommand, LocationCommand,
        ModelCommand, QuitCommand,
    },
    registry::CommandRegistry,
};
use crate::core::error::GemchatError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        command: &str,
        raw_args: &str,
        state: &mut ChatState,
    ) -> Result<Option<String>, GemchatError> {
        self.registry.execute(command, raw_args, state)
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("quit", QuitCommand);
    registry.register("help", HelpCommand);
    registry.register("clear", ClearCommand);
    registry.register("location", LocationCommand);
    registry.register("image", ImageCommand);
    registry.register("export", ExportCommand);
    registry.register("key", KeyCommand);
    registry.register("model", ModelCommand);

    registry.alias("exit", "quit");
    registry.alias("q", "quit");
    registry.alias("?", "help");

    CommandDispatcher::new(Arc::new(registry))
}
