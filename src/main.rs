use clap::Parser;

mod app;
mod cli;
mod commands;
mod config;
mod core;
mod credentials;
mod display;
mod input;
mod logging;
mod providers;

use crate::app::Application;
use crate::cli::Args;
use crate::commands::create_command_registry;
use crate::config::Config;
use crate::core::error::GemchatError;

#[tokio::main]
async fn main() -> Result<(), GemchatError> {
    let args = Args::parse();
    let config = Config::load()?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    logging::init(&level, config.log_file.as_deref())?;

    let mut app = Application::new(args, config, create_command_registry())?;
    if let Err(e) = app.run().await {
        display::display_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
