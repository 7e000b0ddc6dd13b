use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let msg = err.to_string().to_lowercase();

    if msg.contains("api key") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Export OPENAI_API_KEY or ANTHROPIC_API_KEY, or add it to");
        eprintln!("  {} ~/.config/sprintflow/config.toml [api_keys]", "$".dimmed());
    }

    if msg.contains("unknown agent") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  List available agents with:");
        eprintln!("  {} sprintflow agents", "$".dimmed());
    }

    if msg.contains("session not found") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  List stored sessions with:");
        eprintln!("  {} sprintflow session list", "$".dimmed());
    }

    if msg.contains("connection refused") || msg.contains("network") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Check your internet connection and try again.");
    }

    std::process::exit(1);
}
