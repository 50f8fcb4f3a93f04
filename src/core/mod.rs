//! Core mutation logic
//!
//! Follows the "functional core, imperative shell" pattern:
//! - `reducer` computes the desired group from an action (pure)
//! - `planner` decides which store calls realize it (pure)
//! - `executor` performs those calls in order (the only I/O here)

pub mod executor;
pub mod planner;
pub mod reducer;

pub use executor::{execute, MutationOutcome};
pub use planner::{plan, validate_action, MutationPlan, StoreOperation};
pub use reducer::reduce;
