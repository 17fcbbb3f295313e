//! Critical Path Method (CPM) scheduling engine.
//!
//! Builds a validated task dependency graph anchored by synthetic Start/End
//! nodes, computes early/late times, total and free float and the full set of
//! critical edges, and renders the result as an annotated network diagram.
//!
//! Data flows one way: [`table`] (input records) → [`graph::build`] →
//! [`schedule::schedule`] → [`diagram`].

pub mod config;
pub mod diagram;
pub mod graph;
pub mod logging;
mod models;
#[cfg(feature = "python")]
mod python;
mod registry;
pub mod schedule;
pub mod table;

pub use config::{DiagramConfig, SchedulerConfig, TableFormat};
pub use diagram::{render_dot, render_table};
pub use graph::{build, Graph, GraphError, Node, NodeKind};
pub use models::{RawTask, TaskTiming};
pub use registry::{NodeId, TaskRegistry};
pub use schedule::{
    plan, schedule, schedule_with_config, PlanError, ScheduleResult, SchedulingError,
};
pub use table::{parse_table, ParseError};
