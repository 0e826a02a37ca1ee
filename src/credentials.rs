use crate::core::error::GemchatError;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::{Arc, RwLock};
use tokio::process::Command;
use tracing::{debug, info};

/// The currently selected API key, shared between the provider and the
/// credential host that replaces it.
#[derive(Clone, Default)]
pub struct CredentialStore {
    key: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    pub fn new(key: Option<String>) -> Self {
        let store = Self::default();
        if let Some(key) = key {
            store.set(key);
        }
        store
    }

    pub fn get(&self) -> Option<String> {
        self.key.read().ok().and_then(|k| k.clone())
    }

    /// Replace the key. Blank input clears it.
    pub fn set(&self, key: String) {
        let key = key.trim().to_string();
        if let Ok(mut slot) = self.key.write() {
            *slot = if key.is_empty() { None } else { Some(key) };
        }
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

/// Host-provided flow for choosing (or re-choosing) the API key.
#[async_trait]
pub trait CredentialHost: Send + Sync {
    async fn has_selected_credential(&self) -> bool;

    /// Run the selector. Resolving `Ok` does not prove the new key is valid.
    async fn open_credential_selector(&self) -> Result<(), GemchatError>;
}

/// Prompts for a key on the terminal with echo disabled.
pub struct TerminalCredentialHost {
    store: CredentialStore,
}

impl TerminalCredentialHost {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialHost for TerminalCredentialHost {
    async fn has_selected_credential(&self) -> bool {
        self.store.is_set()
    }

    /// Blocks until a line is entered; Ctrl-C does not interrupt the prompt.
    async fn open_credential_selector(&self) -> Result<(), GemchatError> {
        let line = tokio::task::spawn_blocking(|| {
            let term = console::Term::stderr();
            term.write_line(&format!(
                "{} {}",
                console::style("Enter a Gemini API key from a paid project").bold().yellow(),
                console::style("(empty line keeps the current key):").dim()
            ))?;
            term.read_secure_line()
        })
        .await
        .map_err(|e| GemchatError::Credential(format!("Key prompt aborted: {}", e)))??;

        accept_entered_key(&self.store, &line)?;
        info!("API key replaced from terminal prompt");
        Ok(())
    }
}

/// Store a key typed at the prompt. A blank entry leaves the current key alone.
fn accept_entered_key(store: &CredentialStore, line: &str) -> Result<(), GemchatError> {
    if line.trim().is_empty() {
        return Err(GemchatError::Credential(
            "No key entered; keeping the current key".to_string(),
        ));
    }
    store.set(line.to_string());
    Ok(())
}

/// Runs a shell command (e.g. a password-manager lookup) and uses its stdout as the key.
pub struct CommandCredentialHost {
    command: String,
    store: CredentialStore,
}

impl CommandCredentialHost {
    pub fn new(command: String, store: CredentialStore) -> Self {
        Self { command, store }
    }

    fn shell_command(&self) -> Command {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C");
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c");
            cmd
        };
        cmd.arg(&self.command);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl CredentialHost for CommandCredentialHost {
    async fn has_selected_credential(&self) -> bool {
        self.store.is_set()
    }

    async fn open_credential_selector(&self) -> Result<(), GemchatError> {
        debug!(command = %self.command, "running credential command");
        let output = self.shell_command().output().await?;

        if !output.status.success() {
            return Err(GemchatError::Credential(format!(
                "Credential command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if key.is_empty() {
            return Err(GemchatError::Credential(
                "Credential command printed no key".to_string(),
            ));
        }

        self.store.set(key);
        info!("API key replaced from credential command");
        Ok(())
    }
}
