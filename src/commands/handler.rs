use super::ChatState;
use crate::core::attachment::load_image;
use crate::core::error::GemchatError;
use crate::core::export::{DEFAULT_EXPORT_FILE, export_transcript};

use console::style;
use std::path::Path;

pub trait CommandHandler {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, GemchatError>;

    /// Entry point from the prompt. `raw_args` is everything after the command name.
    fn execute_raw(
        &self,
        state: &mut ChatState,
        raw_args: &str,
    ) -> Result<Option<String>, GemchatError> {
        let args: Vec<&str> = raw_args.split_whitespace().collect();
        self.execute(state, &args)
    }

    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct LocationCommand;
pub struct ImageCommand;
pub struct ExportCommand;
pub struct KeyCommand;
pub struct ModelCommand;

impl CommandHandler for QuitCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, GemchatError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit (/exit, /q) - Exit the chat session"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, GemchatError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = vec![
            title.to_string(),
            QuitCommand.help().to_string(),
            HelpCommand.help().to_string(),
            ClearCommand.help().to_string(),
            LocationCommand.help().to_string(),
            ImageCommand.help().to_string(),
            ExportCommand.help().to_string(),
            KeyCommand.help().to_string(),
            ModelCommand.help().to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, GemchatError> {
        state.conversation.clear();
        state.pending_image = None;
        Ok(Some("Memory wiped.".to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Wipe the conversation from memory"
    }
}

impl CommandHandler for LocationCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, GemchatError> {
        if args.is_empty() {
            return Ok(Some(format!(
                "Current location: {}",
                state.conversation.location
            )));
        }
        state.conversation.location = args.join(" ");
        Ok(Some(format!(
            "Location set to: {}",
            state.conversation.location
        )))
    }

    fn help(&self) -> &'static str {
        "/location [place] - Show or change your location"
    }
}

impl CommandHandler for ImageCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, GemchatError> {
        self.execute_raw(state, &args.join(" "))
    }

    /// The path is taken verbatim so runs of spaces or tabs inside it survive.
    fn execute_raw(
        &self,
        state: &mut ChatState,
        raw_args: &str,
    ) -> Result<Option<String>, GemchatError> {
        let path = raw_args.trim();
        if path.is_empty() {
            return Ok(Some(match state.pending_image.take() {
                Some(_) => "Attachment removed.".to_string(),
                None => "Usage: /image <path>".to_string(),
            }));
        }

        let image = load_image(Path::new(path))?;
        let message = format!(
            "Attached {} ({}); it will be sent with your next message.",
            path, image.mime_type
        );
        state.pending_image = Some(image);
        Ok(Some(message))
    }

    fn help(&self) -> &'static str {
        "/image [path] - Attach an image to the next message (no path removes it)"
    }
}

impl CommandHandler for ExportCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, GemchatError> {
        let filename = args.first().copied().unwrap_or(DEFAULT_EXPORT_FILE);
        let path = Path::new(filename);

        if export_transcript(state.conversation.turns(), path)? {
            Ok(Some(format!("Conversation exported to: {}", path.display())))
        } else {
            Ok(Some("Nothing to export yet.".to_string()))
        }
    }

    fn help(&self) -> &'static str {
        "/export [file] - Save the conversation as plain text"
    }
}

impl CommandHandler for KeyCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, GemchatError> {
        state.key_requested = true;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/key - Select a different API key (an empty entry keeps the current one)"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, GemchatError> {
        if args.is_empty() {
            Ok(Some(format!("Current model: {}", state.retriever.model())))
        } else {
            state.retriever.set_model(args[0]);
            Ok(Some(format!("Model changed to: {}", state.retriever.model())))
        }
    }

    fn help(&self) -> &'static str {
        "/model [name] - Show or change the current model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_command_registry;
    use crate::core::assembler::GenerationSettings;
    use crate::core::retriever::{Retriever, RetryPolicy};
    use crate::core::turn::Turn;
    use crate::providers::gemini::types::GenerateContentRequest;
    use crate::providers::{GenerationProvider, ProviderError};
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl GenerationProvider for Unreachable {
        async fn generate_content(
            &self,
            _model: &str,
            _request: &GenerateContentRequest,
        ) -> Result<Option<String>, ProviderError> {
            Err(ProviderError::new(None, "offline"))
        }
    }

    fn state() -> ChatState {
        let retriever = Retriever::new(
            Arc::new(Unreachable),
            None,
            "gemini-3-pro-preview".to_string(),
            GenerationSettings::default(),
            RetryPolicy::default(),
        );
        ChatState::new(retriever, "Belfair, WA")
    }

    #[test]
    fn clear_wipes_turns_and_attachment() {
        let mut state = state();
        state.conversation.push(Turn::user("hi", None));
        state.pending_image = Some(crate::core::turn::InlineImage {
            data: "AA==".to_string(),
            mime_type: "image/png".to_string(),
        });

        ClearCommand.execute(&mut state, &[]).unwrap();
        assert!(state.conversation.is_empty());
        assert!(state.pending_image.is_none());
    }

    #[test]
    fn location_joins_arguments() {
        let mut state = state();
        LocationCommand
            .execute(&mut state, &["Oslo,", "Norway"])
            .unwrap();
        assert_eq!(state.conversation.location, "Oslo, Norway");
    }

    #[test]
    fn image_stages_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        let path = path.to_string_lossy().to_string();

        let mut state = state();
        ImageCommand.execute(&mut state, &[path.as_str()]).unwrap();
        assert_eq!(
            state.pending_image.as_ref().map(|i| i.mime_type.as_str()),
            Some("image/png")
        );

        ImageCommand.execute(&mut state, &[]).unwrap();
        assert!(state.pending_image.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn image_path_keeps_inner_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen  shot\tfinal.gif");
        fs::write(&path, b"GIF89a").unwrap();
        let raw = format!("  {}  ", path.to_string_lossy());

        let dispatcher = create_command_registry();
        let mut state = state();
        dispatcher.execute("image", &raw, &mut state).unwrap();
        assert_eq!(
            state.pending_image.as_ref().map(|i| i.data.as_str()),
            Some("R0lGODlh")
        );
    }

    #[test]
    fn export_reports_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        let path = path.to_string_lossy().to_string();

        let mut state = state();
        let output = ExportCommand.execute(&mut state, &[path.as_str()]).unwrap();
        assert_eq!(output.as_deref(), Some("Nothing to export yet."));

        state.conversation.push(Turn::user("hello", None));
        ExportCommand.execute(&mut state, &[path.as_str()]).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("USER:\nhello"));
    }

    #[test]
    fn model_and_key_commands_update_state() {
        let mut state = state();
        ModelCommand.execute(&mut state, &["gemini-2.5-pro"]).unwrap();
        assert_eq!(state.retriever.model(), "gemini-2.5-pro");

        KeyCommand.execute(&mut state, &[]).unwrap();
        assert!(state.key_requested);
        assert!(KeyCommand.help().contains("empty entry keeps"));
    }

    #[test]
    fn dispatcher_routes_and_rejects_unknown() {
        let dispatcher = create_command_registry();
        let mut state = state();

        dispatcher.execute("quit", "", &mut state).unwrap();
        assert!(!state.should_continue);

        let err = dispatcher.execute("teleport", "", &mut state).unwrap_err();
        assert!(matches!(err, GemchatError::Input(msg) if msg.contains("teleport")));

        let output = dispatcher.execute("ex", "", &mut state).unwrap();
        assert_eq!(output.as_deref(), Some("Nothing to export yet."));

        dispatcher.execute("loc", "Oslo", &mut state).unwrap();
        assert_eq!(state.conversation.location, "Oslo");

        state.should_continue = true;
        dispatcher.execute("exit", "", &mut state).unwrap();
        assert!(!state.should_continue);

        assert_eq!(
            dispatcher.get_command_names(),
            vec!["clear", "export", "help", "image", "key", "location", "model", "quit"]
        );
    }
}
