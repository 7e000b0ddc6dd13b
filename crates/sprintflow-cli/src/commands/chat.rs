use anyhow::Result;
use colored::Colorize;
use sprintflow_ai::{AgentInput, AgentService, is_interruption};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::ChatArgs;
use crate::commands::utils::{InterruptibleTurn, print_turn, resolve_reply};
use crate::config::CliConfig;
use crate::output::{OutputFormat, json::print_json};
use crate::setup::agent_name;

const EXIT_COMMANDS: &[&str] = &["/exit", "/quit"];
const NEW_SESSION_COMMAND: &str = "/new";

pub async fn run(
    service: &AgentService,
    config: &CliConfig,
    args: ChatArgs,
    format: OutputFormat,
) -> Result<()> {
    let agent = service.find(&agent_name(args.agent, config))?;

    if !format.is_json() {
        println!(
            "Chatting with {} ({}). {} starts over, {} leaves.",
            agent.name().bold(),
            agent.profile().role,
            NEW_SESSION_COMMAND,
            EXIT_COMMANDS[0]
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session_id: Option<String> = None;
    let mut options: Option<Vec<String>> = None;

    loop {
        if !format.is_json() {
            print!("{} ", ">".green().bold());
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line) {
            break;
        }
        if line == NEW_SESSION_COMMAND {
            session_id = None;
            options = None;
            println!("Started a new session.");
            continue;
        }

        let mut input = AgentInput::new(resolve_reply(line, options.as_deref()));
        if let Some(phase) = args.phase {
            input = input.with_phase(phase);
        }

        let turn = InterruptibleTurn::new(args.timeout);
        let result = match agent
            .process_interactive(&input, session_id.as_deref(), &turn.options)
            .await
        {
            Ok(result) => result,
            Err(err) if is_interruption(&err) => {
                debug!(error = %err, "Chat turn interrupted");
                println!("{} {}", "Interrupted:".yellow().bold(), err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        if format.is_json() {
            print_json(&result)?;
        } else {
            print_turn(&result);
            println!();
        }

        options = result.interaction_options.clone();
        session_id = result.can_continue.then(|| result.session_id.clone());
        if session_id.is_none() && !format.is_json() {
            println!("{}", "Session finished. Ask something new to start over.".dimmed());
        }
    }

    Ok(())
}
