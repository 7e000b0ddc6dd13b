use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Table};
use serde_json::json;

use sprintflow_ai::{AgentService, ReActSessionState, SessionStore};

use crate::cli::SessionCommands;
use crate::commands::utils::{format_time, preview_text, short_id};
use crate::output::{OutputFormat, json::print_json, table::print_table};

pub async fn run(
    service: &AgentService,
    store: &dyn SessionStore,
    command: SessionCommands,
    format: OutputFormat,
) -> Result<()> {
    match command {
        SessionCommands::List { agent } => {
            list_sessions(service, store, agent.as_deref(), format).await
        }
        SessionCommands::Show { id } => show_session(store, &id, format).await,
        SessionCommands::Delete { id } => delete_session(store, &id, format).await,
    }
}

async fn list_sessions(
    service: &AgentService,
    store: &dyn SessionStore,
    agent: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let agent_names: Vec<String> = match agent {
        Some(name) => vec![service.find(name)?.name().to_string()],
        None => service.names().into_iter().map(str::to_string).collect(),
    };

    let mut sessions = Vec::new();
    for name in &agent_names {
        sessions.extend(store.list(name).await?);
    }
    sessions.sort_by_key(|s| s.start_time);

    if format.is_json() {
        let rows: Vec<_> = sessions.iter().map(session_summary).collect();
        return print_json(&rows);
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Agent", "Status", "Steps", "Query", "Updated"]);
    for session in &sessions {
        table.add_row(vec![
            Cell::new(short_id(&session.session_id)),
            Cell::new(&session.agent_name),
            Cell::new(session.status.as_str()),
            Cell::new(session.completed_steps.len()),
            Cell::new(preview_text(&session.original_input.query, 40)),
            Cell::new(format_time(session.last_update_time)),
        ]);
    }
    print_table(table)
}

fn session_summary(session: &ReActSessionState) -> serde_json::Value {
    json!({
        "session_id": session.session_id,
        "agent_name": session.agent_name,
        "status": session.status,
        "current_iteration": session.current_iteration,
        "max_iterations": session.max_iterations,
        "steps": session.completed_steps.len(),
        "query": session.original_input.query,
        "start_time": session.start_time,
        "last_update_time": session.last_update_time,
    })
}

async fn show_session(store: &dyn SessionStore, id: &str, format: OutputFormat) -> Result<()> {
    let session = store.load(id).await?;

    if format.is_json() {
        return print_json(&session);
    }

    println!("Session: {}", session.session_id);
    println!("Agent: {}", session.agent_name);
    println!("Status: {}", session.status);
    println!(
        "Iterations: {}/{}",
        session.current_iteration, session.max_iterations
    );
    println!("Started: {}", format_time(session.start_time));
    println!("Updated: {}", format_time(session.last_update_time));
    println!("Query: {}", session.original_input.query);
    if let Some(error) = &session.error {
        println!("{} {}", "Error:".red(), error);
    }
    println!();

    for step in &session.completed_steps {
        println!("{}", format!("Step {}", step.step_number).bold());
        println!("  Thought: {}", step.thought);
        if !step.action.is_empty() {
            println!("  Action: {} {}", step.action, step.action_input.dimmed());
        }
        if !step.observation.is_empty() {
            println!("  Observation: {}", preview_text(&step.observation, 160));
        }
        if !step.reflection.is_empty() {
            println!("  Reflection: {}", step.reflection);
        }
    }

    if let Some(pending) = &session.pending_action {
        println!();
        println!(
            "{} {} ({})",
            "Waiting for:".yellow().bold(),
            pending.waiting_for,
            pending.action
        );
    }

    for interaction in &session.interactions {
        println!(
            "{} {} -> {}",
            "User:".cyan(),
            interaction.prompt,
            interaction.user_response
        );
    }

    Ok(())
}

async fn delete_session(store: &dyn SessionStore, id: &str, format: OutputFormat) -> Result<()> {
    store.delete(id).await?;

    if format.is_json() {
        return print_json(&json!({ "id": id, "deleted": true }));
    }

    println!("Deleted session: {id}");
    Ok(())
}
