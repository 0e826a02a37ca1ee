use console::style;

fn box_width(max: usize) -> usize {
    let term = console::Term::stdout();
    let terminal_width = term.size().1 as usize;
    std::cmp::min(terminal_width.saturating_sub(4), max).max(40)
}

/// Render an assistant reply; markdown-looking text goes through termimad.
pub fn display_response(response: &str) {
    println!("\n{}", style("🤖 GEMINI").bold().blue());
    if looks_like_markdown(response) {
        termimad::print_text(response);
    } else {
        println!("{}", response);
    }
    println!("{}", style("═".repeat(box_width(120))).dim());
}

pub fn looks_like_markdown(text: &str) -> bool {
    text.contains("```")
        || text.contains('*')
        || text.contains('`')
        || text.contains('#')
        || text.lines().any(|l| l.trim_start().starts_with("- "))
}

/// Show a failed reply the way it is recorded in the transcript.
pub fn display_error(message: &str) {
    println!(
        "\n{} {}",
        style("🚨").bold().red(),
        style(message).bold().red()
    );
}

pub fn display_info(message: &str) {
    println!("{}", style(message).cyan());
}

/// Dim status line shown while a request is in flight.
pub fn display_waiting(model: &str, image_attached: bool) {
    let attachment = if image_attached { " with image" } else { "" };
    eprintln!(
        "{}",
        style(format!("… asking {}{} (Ctrl-C to cancel)", model, attachment)).dim()
    );
}

pub fn display_banner(model: &str, location: &str) {
    println!(
        "{} {}",
        style("Gemchat").bold().magenta(),
        style(format!("· {} · {}", model, location)).dim()
    );
    println!(
        "{}",
        style("Type '/help' for available commands. Press Ctrl+D or type /quit to exit.").dim()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_detection() {
        assert!(looks_like_markdown("# Title"));
        assert!(looks_like_markdown("use `cargo`"));
        assert!(looks_like_markdown("items:\n- one\n- two"));
        assert!(!looks_like_markdown("Plain answer, nothing fancy."));
    }
}
