use super::ChatState;
use crate::commands::handler::CommandHandler;
use crate::core::error::GemchatError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Slash commands by name. Lookups accept aliases and any unambiguous prefix.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: BTreeMap<String, Arc<dyn CommandHandler>>,
    aliases: BTreeMap<String, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: CommandHandler + 'static>(&mut self, name: &str, command: C) {
        self.handlers.insert(name.to_string(), Arc::new(command));
    }

    pub fn alias(&mut self, alias: &str, name: &str) {
        self.aliases.insert(alias.to_string(), name.to_string());
    }

    fn resolve(&self, name: &str) -> Result<&Arc<dyn CommandHandler>, GemchatError> {
        let name = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        if let Some(handler) = self.handlers.get(name) {
            return Ok(handler);
        }

        let mut matches = self
            .handlers
            .iter()
            .filter(|(candidate, _)| !name.is_empty() && candidate.starts_with(name));
        match (matches.next(), matches.next()) {
            (Some((_, handler)), None) => Ok(handler),
            (Some(_), Some(_)) => Err(GemchatError::Input(format!(
                "Ambiguous command: /{}",
                name
            ))),
            _ => Err(GemchatError::Input(format!("Unknown command: /{}", name))),
        }
    }

    pub fn execute(
        &self,
        name: &str,
        raw_args: &str,
        state: &mut ChatState,
    ) -> Result<Option<String>, GemchatError> {
        self.resolve(name)?.execute_raw(state, raw_args)
    }

    /// Canonical names in sorted order; aliases are not listed.
    pub fn get_command_names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}
