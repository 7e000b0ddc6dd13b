//! Interactive ReAct: sessions that pause for human input and resume later.

mod interaction;
mod processor;
mod session;

pub use interaction::{
    CONFIRMATION_OPTIONS, INTERACTION_PHRASES, USER_INPUT_ACTIONS, classify_interaction,
    interaction_options, interaction_prompt,
};
pub use processor::{InteractiveOutput, InteractiveReActProcessor, SESSION_ENDED_RESPONSE};
pub use session::{
    InteractionRecord, InteractionType, PendingAction, ReActSessionState, SessionStatus,
};
