pub mod agents;
pub mod ask;
pub mod chat;
pub mod session;
pub mod utils;
