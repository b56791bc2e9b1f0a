//! # Partflow
//!
//! Partflow plans partial executions of node-based workflows. When only part
//! of a previously executed workflow has to run again, for example after one
//! node was edited, it decides which nodes must run and which combinations
//! of upstream outputs each of them is fed with.
//!
//! ## Core Features
//!
//! - **Graph Model**: Immutable workflow topology with indexed, fan-in capable connections
//! - **Data Availability**: Reuse of historical run data and user-pinned test data
//! - **Source Data Grouping**: Deterministic grouping of inbound connections into execution attempts
//! - **Re-execution Plans**: Topologically ordered plans with explicit incomplete attempts
//!
//! The planner never executes nodes and never mutates the data it is given.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use partflow::{DataOracle, Graph, WorkflowModel, plan};
//!
//! let workflow = WorkflowModel::from_json(json_str)?;
//! let graph = Graph::try_from(&workflow)?;
//! let oracle = DataOracle::new(&run_data, &pin_data);
//!
//! let target = graph.node("Merge").cloned().unwrap();
//! let plan = plan(&target, &graph, &oracle)?;
//! println!("{}", plan.schema());
//! ```

mod config;
mod data;
mod error;
mod graph;
mod model;
mod partial;

pub use config::PlannerConfig;
pub use data::*;
pub use error::PartflowError;
pub use graph::*;
pub use model::*;
pub use partial::*;

/// Result type alias for Partflow operations.
pub type Result<T> = std::result::Result<T, PartflowError>;
