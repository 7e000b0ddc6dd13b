//! Prompt templates for the ReAct loop.
//!
//! The reply format requested here is exactly what
//! [`ParsedStep::from_text`](crate::agent::react::ParsedStep::from_text) reads back.

use sprintflow_traits::ToolRegistry;

use super::input::{AgentInput, ConversationTurn, render_transcript};
use super::output::ReasoningStep;
use super::profile::AgentProfile;

/// Identity, method and tool list for an agent.
pub fn system_prompt(profile: &AgentProfile, tools: &ToolRegistry) -> String {
    let tool_lines: Vec<String> = tools
        .iter()
        .map(|tool| format!("- {}: {}", tool.name(), tool.description()))
        .collect();

    format!(
        "You are {name}, an AI agent with the following characteristics:\n\n\
         Role: {role}\n\
         Background Knowledge: {background}\n\
         Responsibility: {responsibility}\n\n\
         You operate using the ReAct (Reasoning + Acting) framework. For each query:\n\
         1. THINK about what you need to do\n\
         2. Decide on an ACTION (use a tool or provide final answer)\n\
         3. OBSERVE the result\n\
         4. REFLECT on what you learned\n\
         5. Repeat until you have enough information\n\n\
         Available Tools:\n\
         {tools}\n\n\
         Response Format:\n\
         Thought: [Your reasoning about the current situation]\n\
         Action: [Tool name or \"Final Answer\"]\n\
         Action Input: [Input for the tool or your final answer]\n\n\
         When you have sufficient information, use:\n\
         Action: Final Answer\n\
         Action Input: [Your complete response to the user]\n\n\
         Be thorough but concise. Focus on providing actionable insights.",
        name = profile.name,
        role = profile.role,
        background = profile.background,
        responsibility = profile.responsibility,
        tools = tool_lines.join("\n"),
    )
}

pub fn user_prompt(input: &AgentInput) -> String {
    let mut prompt = format!("Query: {}", input.query);
    if !input.context.is_empty() {
        prompt.push_str("\nContext: ");
        prompt.push_str(&input.context);
    }
    if let Some(phase) = input.phase {
        prompt.push_str("\nCurrent Phase: ");
        prompt.push_str(phase.as_str());
    }
    prompt.push_str("\n\nPlease help with this request using your expertise and available tools.");
    prompt
}

/// Next-step request for the single-shot loop.
pub fn thought_prompt(transcript: &[ConversationTurn], step_number: usize) -> String {
    format!(
        "{}\n\nStep {step_number}: What should I think about and do next? Please respond with:\n\
         Thought: [Your reasoning]\n\
         Action: [Tool name or \"Final Answer\"]\n\
         Action Input: [Input for the tool or final answer]",
        render_transcript(transcript)
    )
}

/// Next-step request for the interactive loop, which may ask the user.
pub fn interactive_thought_prompt(transcript: &[ConversationTurn], step_number: usize) -> String {
    format!(
        "{}\n\nStep {step_number}: Based on the conversation so far, what should I think about and do next?\n\n\
         If you need user input, you can use:\n\
         - \"I need to ask the user for...\" to request information\n\
         - \"I need confirmation about...\" to confirm something\n\
         - \"The user should choose between...\" for choices\n\n\
         Please respond with:\n\
         Thought: [Your reasoning]\n\
         Action: [Tool name, \"ask_user\", or \"Final Answer\"]\n\
         Action Input: [Input for the tool, question for user, or final answer]",
        render_transcript(transcript)
    )
}

pub fn reflection_prompt(step: &ReasoningStep) -> String {
    format!(
        "Based on this ReAct step:\n\
         Thought: {}\n\
         Action: {}\n\
         Action Input: {}\n\
         Observation: {}\n\n\
         Provide a brief reflection (1-2 sentences) on what was learned and how it helps answer the query.",
        step.thought, step.action, step.action_input, step.observation
    )
}

/// Synthesis request built from every step that was both observed and reflected on.
pub fn final_answer_prompt(input: &AgentInput, steps: &[ReasoningStep]) -> String {
    let findings: Vec<String> = steps
        .iter()
        .filter(|s| !s.observation.is_empty() && !s.reflection.is_empty())
        .map(|s| format!("- {}", s.reflection))
        .collect();

    format!(
        "Based on the following query and findings, provide a comprehensive answer:\n\n\
         Query: {}\n\
         Context: {}\n\n\
         Key Findings:\n\
         {}\n\n\
         Provide a clear, actionable response that directly addresses the query.",
        input.query,
        input.context,
        findings.join("\n")
    )
}
