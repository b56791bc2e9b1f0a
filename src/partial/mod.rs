//! Partial execution: grouping of inbound connections and re-execution plans.

mod group;
mod plan;
mod planner;

pub use group::{Group, by_input_then_source, group, group_connections};
pub use plan::{Plan, PlanStep};
pub use planner::{Planner, plan};
