use anyhow::Result;
use sprintflow_ai::{AgentInput, AgentService};

use crate::cli::AskArgs;
use crate::commands::utils::{InterruptibleTurn, print_turn};
use crate::config::CliConfig;
use crate::output::{OutputFormat, json::print_json};
use crate::setup::agent_name;

pub fn build_input(args: &AskArgs) -> AgentInput {
    let mut input = AgentInput::new(args.query.clone());
    if let Some(context) = &args.context {
        input = input.with_context(context.clone());
    }
    if let Some(room) = &args.room {
        input = input.with_room(room.clone());
    }
    if let Some(phase) = args.phase {
        input = input.with_phase(phase);
    }
    input
}

pub async fn run(
    service: &AgentService,
    config: &CliConfig,
    args: AskArgs,
    format: OutputFormat,
) -> Result<()> {
    let agent = service.find(&agent_name(args.agent.clone(), config))?;
    let input = build_input(&args);
    let turn = InterruptibleTurn::new(args.timeout);

    let result = agent
        .process_interactive(&input, args.session.as_deref(), &turn.options)
        .await?;

    if format.is_json() {
        return print_json(&result);
    }

    print_turn(&result);
    if result.needs_interaction {
        println!(
            "\nReply with: sprintflow ask \"<answer>\" --agent {} --session {}",
            agent.name(),
            result.session_id
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprintflow_ai::Phase;

    #[test]
    fn test_build_input_carries_options() {
        let args = AskArgs {
            query: "Who buys this?".to_string(),
            agent: None,
            phase: Some(Phase::Foundation),
            context: Some("B2B invoicing".to_string()),
            room: Some("room-7".to_string()),
            session: None,
            timeout: None,
        };

        let input = build_input(&args);
        assert_eq!(input.query, "Who buys this?");
        assert_eq!(input.context, "B2B invoicing");
        assert_eq!(input.room_id, "room-7");
        assert_eq!(input.phase, Some(Phase::Foundation));
    }
}
