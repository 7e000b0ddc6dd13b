use clap::{Args, Parser, Subcommand};
use sprintflow_ai::Phase;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "sprintflow")]
#[command(version, about = "SprintFlow - Foundation Sprint workshop agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (defaults to ~/.sprintflow/sprintflow.db)
    #[arg(long, global = true, env = "SPRINTFLOW_DB_PATH")]
    pub db_path: Option<String>,

    /// Mirror logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one interactive agent turn
    Ask(AskArgs),

    /// Converse with an agent, resuming the same session
    Chat(ChatArgs),

    /// Stored session management
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// List built-in agents and their tools
    Agents,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question or reply to send
    pub query: String,

    /// Agent name (defaults to the configured agent, then ThinkAgent)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Workshop phase: foundation, differentiation or approach
    #[arg(short, long)]
    pub phase: Option<Phase>,

    /// Extra context passed to the agent
    #[arg(short, long)]
    pub context: Option<String>,

    /// Workshop room id
    #[arg(long)]
    pub room: Option<String>,

    /// Session to resume
    #[arg(short, long)]
    pub session: Option<String>,

    /// Abort the turn after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Agent name (defaults to the configured agent, then ThinkAgent)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Workshop phase: foundation, differentiation or approach
    #[arg(short, long)]
    pub phase: Option<Phase>,

    /// Abort each turn after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// List sessions, optionally for one agent
    List {
        #[arg(short, long)]
        agent: Option<String>,
    },

    /// Show a session's reasoning trace
    Show { id: String },

    /// Delete a session
    Delete { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_options() {
        let cli = Cli::try_parse_from([
            "sprintflow",
            "--format",
            "json",
            "ask",
            "Who is our customer?",
            "--agent",
            "ResearchAgent",
            "--phase",
            "approach",
            "--session",
            "abc",
        ])
        .unwrap();

        assert!(cli.format.is_json());
        let Commands::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.query, "Who is our customer?");
        assert_eq!(args.agent.as_deref(), Some("ResearchAgent"));
        assert_eq!(args.phase, Some(Phase::Approach));
        assert_eq!(args.session.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_rejects_unknown_phase() {
        assert!(Cli::try_parse_from(["sprintflow", "ask", "q", "--phase", "launch"]).is_err());
    }

    #[test]
    fn test_parse_session_list() {
        let cli = Cli::try_parse_from(["sprintflow", "session", "list", "--agent", "ThinkAgent"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Session {
                command: SessionCommands::List { agent: Some(_) }
            }
        ));
    }
}
