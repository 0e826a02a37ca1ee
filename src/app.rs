use crate::cli::Args;
use crate::commands::{ChatState, dispatcher::CommandDispatcher};
use crate::config::{API_KEY_ENV, Config};
use crate::core::attachment::load_image;
use crate::core::error::{CREDENTIAL_MISSING_MESSAGE, GemchatError, ReplyError};
use crate::core::retriever::Retriever;
use crate::core::turn::{InlineImage, Turn};
use crate::credentials::{
    CommandCredentialHost, CredentialHost, CredentialStore, TerminalCredentialHost,
};
use crate::display;
use crate::input;
use crate::providers::GenerationProvider;
use crate::providers::gemini::GeminiClient;
use is_terminal::IsTerminal;
use std::io::{self, Read};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct Application {
    pub args: Args,
    pub config: Config,
    pub credentials: CredentialStore,
    pub credential_host: Arc<dyn CredentialHost>,
    pub command_dispatcher: CommandDispatcher,
}

impl Application {
    pub fn new(
        args: Args,
        config: Config,
        command_dispatcher: CommandDispatcher,
    ) -> Result<Self, GemchatError> {
        let credentials =
            CredentialStore::new(config.resolve_api_key(std::env::var(API_KEY_ENV).ok()));

        let credential_host: Arc<dyn CredentialHost> = match &config.credential_command {
            Some(command) => Arc::new(CommandCredentialHost::new(
                command.clone(),
                credentials.clone(),
            )),
            None => Arc::new(TerminalCredentialHost::new(credentials.clone())),
        };

        Ok(Self {
            args,
            config,
            credentials,
            credential_host,
            command_dispatcher,
        })
    }

    fn build_retriever(&self) -> Result<Retriever, GemchatError> {
        let provider: Arc<dyn GenerationProvider> = Arc::new(GeminiClient::new(
            self.config.base_url.clone(),
            self.credentials.clone(),
            self.config.request_timeout(),
        )?);

        let model = self
            .args
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());

        Ok(Retriever::new(
            provider,
            Some(self.credential_host.clone()),
            model,
            self.config.generation_settings(),
            self.config.retry_policy(),
        ))
    }

    fn location(&self) -> String {
        self.args
            .location
            .clone()
            .unwrap_or_else(|| self.config.location.clone())
    }

    pub async fn run(&mut self) -> Result<(), GemchatError> {
        let retriever = self.build_retriever()?;

        if self.args.chat {
            self.handle_continuous_chat_mode(retriever).await
        } else {
            let context = if !io::stdin().is_terminal() {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|e| GemchatError::Input(format!("Failed to read from stdin: {}", e)))?;
                Some(buffer)
            } else {
                None
            };
            self.handle_chat_mode(retriever, context).await
        }
    }

    /// Make sure a key is selected before the first request goes out.
    async fn ensure_credential(&self) -> bool {
        if self.credentials.is_set() {
            return true;
        }

        info!("no API key configured, opening credential selector");
        if let Err(e) = self.credential_host.open_credential_selector().await {
            warn!(error = %e, "credential selector failed");
            display::display_error(&e.to_string());
        }
        self.credential_host.has_selected_credential().await
    }

    async fn handle_chat_mode(
        &self,
        retriever: Retriever,
        context: Option<String>,
    ) -> Result<(), GemchatError> {
        let final_query = match (self.args.query.as_deref(), context) {
            (Some(arg_q), Some(stdin_ctx)) => format!("<pipe>{}</pipe>\n\n{}", stdin_ctx, arg_q),
            (None, Some(stdin_ctx)) => format!("<pipe>{}</pipe>", stdin_ctx),
            (Some(arg_q), None) => arg_q.to_string(),
            (None, None) => {
                return Err(GemchatError::Input(
                    "No query provided (use --chat for an interactive session)".to_string(),
                ));
            }
        };

        let image = match &self.args.image {
            Some(path) => Some(load_image(path)?),
            None => None,
        };

        if !self.ensure_credential().await {
            return Err(ReplyError::credential_missing().into());
        }

        let history = [Turn::user(final_query, None)];
        display::display_waiting(retriever.model(), image.is_some());
        let reply = request_reply(&retriever, &history, &self.location(), image.as_ref()).await;

        match reply {
            Ok(text) => {
                display::display_response(&text);
                Ok(())
            }
            Err(e) => {
                error!(kind = %e.kind, "request failed: {}", e.message);
                Err(e.into())
            }
        }
    }

    async fn handle_continuous_chat_mode(&self, retriever: Retriever) -> Result<(), GemchatError> {
        let location = self.location();
        let mut state = ChatState::new(retriever, &location);

        if let Some(path) = &self.args.image {
            state.pending_image = Some(load_image(path)?);
        }

        display::display_banner(state.retriever.model(), &state.conversation.location);
        if !self.ensure_credential().await {
            display::display_error(CREDENTIAL_MISSING_MESSAGE);
        }

        let mut editor = input::create_editor(self.command_dispatcher.clone())?;

        loop {
            let input = match input::read_input(&mut editor)? {
                Some(input) => input.trim().to_string(),
                None => break,
            };

            if input.is_empty() {
                continue;
            }

            if let Some(command_line) = input.strip_prefix('/') {
                let (command, raw_args) = command_line
                    .split_once(char::is_whitespace)
                    .unwrap_or((command_line, ""));
                if !command.is_empty() {
                    match self.command_dispatcher.execute(command, raw_args, &mut state) {
                        Ok(Some(output)) => println!("{}", output),
                        Ok(None) => {}
                        Err(e) => display::display_error(&e.to_string()),
                    }
                }

                if state.key_requested {
                    state.key_requested = false;
                    self.reselect_credential().await;
                }
                if !state.should_continue {
                    break;
                }
                continue;
            }

            if !self.ensure_credential().await {
                display::display_error(CREDENTIAL_MISSING_MESSAGE);
                continue;
            }

            self.send_turn(&mut state, input).await;
        }

        input::save_history(&mut editor)?;

        Ok(())
    }

    async fn reselect_credential(&self) {
        match self.credential_host.open_credential_selector().await {
            Ok(()) if self.credential_host.has_selected_credential().await => {
                display::display_info("API key updated.");
            }
            Ok(()) => display::display_error(CREDENTIAL_MISSING_MESSAGE),
            Err(e) => display::display_error(&e.to_string()),
        }
    }

    /// Append the user turn, wait for the reply and append its outcome.
    async fn send_turn(&self, state: &mut ChatState, input: String) {
        let image = state.pending_image.take();
        display::display_waiting(state.retriever.model(), image.is_some());
        state.conversation.push(Turn::user(input, image));
        debug!(turns = state.conversation.len(), "sending conversation");

        let reply = request_reply(
            &state.retriever,
            state.conversation.turns(),
            &state.conversation.location,
            None,
        )
        .await;

        match reply {
            Ok(text) => {
                display::display_response(&text);
                state.conversation.push(Turn::assistant(text));
            }
            Err(e) => {
                error!(kind = %e.kind, "request failed: {}", e.message);
                display::display_error(&e.message);
                state.conversation.push(Turn::failed(&e.message));
            }
        }
    }
}

/// Resolve one reply; Ctrl-C while it is pending cancels it.
async fn request_reply(
    retriever: &Retriever,
    history: &[Turn],
    location: &str,
    image: Option<&InlineImage>,
) -> Result<String, ReplyError> {
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });

    let reply = retriever
        .resolve_reply(history, location, image, &cancel)
        .await;
    interrupt.abort();
    reply
}
