use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use sprintflow_ai::{InteractiveOutput, TurnOptions};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn preview_text(text: &str, max_chars: usize) -> String {
    let text = text.trim().replace('\n', " ");
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut preview: String = text.chars().take(max_chars).collect();
    preview.push_str("...");
    preview
}

/// Turn bounds cancelled by Ctrl-C. The listener stops when the guard drops.
pub struct InterruptibleTurn {
    pub options: TurnOptions,
    listener: JoinHandle<()>,
}

impl InterruptibleTurn {
    pub fn new(timeout_secs: Option<u64>) -> Self {
        let cancel = CancellationToken::new();
        let mut options = TurnOptions::new().with_cancel(cancel.clone());
        if let Some(secs) = timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        let listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
        Self { options, listener }
    }
}

impl Drop for InterruptibleTurn {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Human-readable rendering of one interactive turn.
pub fn print_turn(result: &InteractiveOutput) {
    if result.needs_interaction {
        let prompt = result.interaction_prompt.as_deref().unwrap_or("");
        let kind = result
            .interaction_type
            .map(|kind| kind.to_string())
            .unwrap_or_default();
        println!("{} {}", format!("[{kind}]").yellow().bold(), prompt);
        if let Some(options) = &result.interaction_options {
            for (index, option) in options.iter().enumerate() {
                println!("  {}. {}", index + 1, option);
            }
        }
    } else {
        println!("{}", result.output.response);
        if !result.output.next_actions.is_empty() {
            println!("\n{}", "Next:".cyan().bold());
            for action in &result.output.next_actions {
                println!("  - {action}");
            }
        }
    }

    let status = result
        .status()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "\n{} {}  {} {}  {} {:.2}",
        "Session:".dimmed(),
        result.session_id,
        "Status:".dimmed(),
        status,
        "Confidence:".dimmed(),
        result.output.confidence
    );
}

/// Numbered replies pick an offered option; anything else passes through.
pub fn resolve_reply(reply: &str, options: Option<&[String]>) -> String {
    let trimmed = reply.trim();
    match (trimmed.parse::<usize>(), options) {
        (Ok(n), Some(options)) if n >= 1 && n <= options.len() => options[n - 1].clone(),
        _ => trimmed.to_string(),
    }
}
