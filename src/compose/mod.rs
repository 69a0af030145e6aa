pub mod orchestrator;
pub mod output;
