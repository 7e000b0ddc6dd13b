use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use sprintflow_ai::AgentService;

use crate::output::{OutputFormat, json::print_json, table::print_table};

#[derive(Debug, Serialize)]
struct AgentSummary<'a> {
    name: &'a str,
    role: &'a str,
    responsibility: &'a str,
    tools: Vec<&'a str>,
}

pub fn run(service: &AgentService, format: OutputFormat) -> Result<()> {
    let summaries: Vec<AgentSummary<'_>> = service
        .agents()
        .map(|agent| {
            let profile = agent.profile();
            AgentSummary {
                name: &profile.name,
                role: &profile.role,
                responsibility: &profile.responsibility,
                tools: agent.processor().processor().tools().list(),
            }
        })
        .collect();

    if format.is_json() {
        return print_json(&summaries);
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Role", "Tools"]);
    for summary in summaries {
        table.add_row(vec![
            Cell::new(summary.name),
            Cell::new(summary.role),
            Cell::new(summary.tools.join(", ")),
        ]);
    }
    print_table(table)
}
