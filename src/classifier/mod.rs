pub mod classifier;
pub mod heuristics;
pub mod outcome;
