use crate::core::error::GemchatError;
use crate::core::turn::Turn;
use std::fs;
use std::path::Path;

pub const DEFAULT_EXPORT_FILE: &str = "gemchat-export.txt";

const SEPARATOR: &str = "------------------";

/// Plain-text transcript, one block per turn.
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| {
            format!(
                "[{}] {}:\n{}\n{}\n{}\n",
                turn.timestamp.format("%Y-%m-%d %H:%M:%S"),
                turn.role.as_str().to_uppercase(),
                turn.content,
                if turn.image.is_some() { "[Image Attached]" } else { "" },
                SEPARATOR
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the transcript to `path`. Returns `false` when there was nothing to write.
pub fn export_transcript(turns: &[Turn], path: &Path) -> Result<bool, GemchatError> {
    if turns.is_empty() {
        return Ok(false);
    }
    fs::write(path, render_transcript(turns))?;
    Ok(true)
}
