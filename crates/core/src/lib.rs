pub mod completion;
pub mod conversation;
pub mod orchestrator;
