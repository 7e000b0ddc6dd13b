//! Detecting when the loop needs a human, and what to ask them.
//!
//! [`classify_interaction`] is the only place that decides whether a step
//! pauses. It is a best-effort phrase match over the model's thought and will
//! both miss requests and fire on incidental wording.

use super::session::{InteractionType, PendingAction};

/// Phrase table checked in order; the first matching row wins.
pub const INTERACTION_PHRASES: &[(InteractionType, &[&str])] = &[
    (
        InteractionType::Clarification,
        &["need to ask", "需要询问", "require clarification", "需要澄清"],
    ),
    (
        InteractionType::Confirmation,
        &["need confirmation", "需要确认", "should confirm"],
    ),
    (
        InteractionType::NeedInput,
        &["need more information", "需要更多信息", "missing details"],
    ),
    (
        InteractionType::Choice,
        &["multiple options", "user should choose", "用户选择"],
    ),
];

/// Actions that always mean "ask the user".
pub const USER_INPUT_ACTIONS: &[&str] = &["ask_user", "request_input"];

pub const CONFIRMATION_OPTIONS: [&str; 3] = ["Yes", "No", "Needs changes"];

/// Decide whether a thought/action pair needs human input.
pub fn classify_interaction(thought: &str, action: &str) -> InteractionType {
    let thought = thought.to_lowercase();
    for (kind, phrases) in INTERACTION_PHRASES {
        if phrases.iter().any(|phrase| thought.contains(phrase)) {
            return *kind;
        }
    }

    let action = action.to_lowercase();
    if USER_INPUT_ACTIONS.contains(&action.as_str()) {
        return InteractionType::NeedInput;
    }

    InteractionType::None
}

/// Text shown to the user for a pending action.
pub fn interaction_prompt(pending: &PendingAction) -> String {
    let input = &pending.action_input;
    match pending.waiting_for {
        InteractionType::Clarification => format!("To help you better, I need to know: {input}"),
        InteractionType::Confirmation => format!("Please confirm: {input} (yes/no)"),
        InteractionType::Choice => format!("Please choose: {input}"),
        InteractionType::NeedInput => {
            format!("Please provide the following information: {input}")
        }
        InteractionType::None => input.clone(),
    }
}

/// Fixed options for confirmations; a JSON string array for choices.
pub fn interaction_options(pending: &PendingAction) -> Option<Vec<String>> {
    match pending.waiting_for {
        InteractionType::Confirmation => Some(
            CONFIRMATION_OPTIONS
                .iter()
                .map(|option| option.to_string())
                .collect(),
        ),
        InteractionType::Choice => serde_json::from_str::<Vec<String>>(&pending.action_input).ok(),
        _ => None,
    }
}
