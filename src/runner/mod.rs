pub mod orchestrator;
pub mod plan;
pub mod run_state;
