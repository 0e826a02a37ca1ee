use crate::core::error::GemchatError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides `level`; output goes to
/// stderr, or is appended to `file` when one is configured.
pub fn init(level: &str, file: Option<&Path>) -> Result<(), GemchatError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("gemchat={}", level)))
        .map_err(|e| GemchatError::Config(format!("Invalid log level '{}': {}", level, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| GemchatError::Config(format!("Logging already initialized: {}", e)))
}
