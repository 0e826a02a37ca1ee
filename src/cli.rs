use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal chat client for Gemini models", long_about = None)]
pub struct Args {
    /// Message to send (omit with --chat to start an interactive session)
    pub query: Option<String>,

    /// Start an interactive chat session
    #[arg(short, long)]
    pub chat: bool,

    /// Attach an image to the first message
    #[arg(short, long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Location passed to the assistant persona
    #[arg(short, long)]
    pub location: Option<String>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_query_with_image() {
        let args = Args::try_parse_from(["gemchat", "-i", "cat.png", "what is this?"]).unwrap();
        assert_eq!(args.query.as_deref(), Some("what is this?"));
        assert_eq!(args.image, Some(PathBuf::from("cat.png")));
        assert!(!args.chat);
    }

    #[test]
    fn chat_mode_without_query() {
        let args =
            Args::try_parse_from(["gemchat", "--chat", "--location", "Oslo", "--log-level", "debug"])
                .unwrap();
        assert!(args.chat);
        assert_eq!(args.query, None);
        assert_eq!(args.location.as_deref(), Some("Oslo"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
