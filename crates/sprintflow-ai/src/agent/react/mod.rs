//! ReAct (Reasoning + Acting) loop implementation.

mod heuristics;
mod parser;
mod processor;

pub use heuristics::{
    READY_PHRASES, SUGGESTION_MARKERS, extract_suggestions, score_confidence,
    should_provide_answer,
};
pub use parser::ParsedStep;
pub use processor::{ReActProcessor, synthesize_response};

pub(crate) use processor::step_from;
