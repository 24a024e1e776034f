//! Runtime core: orchestration and lifecycle.
//!
//! Internal modules:
//! - [`runner`]: executes one handler invocation with its cutoff;
//! - [`engine`]: runs one worker's slots with the restart policy;
//! - [`dispatcher`]: failure sink and its single consumer;
//! - [`supervisor`]: orchestrates engines, graceful stop, introspection;
//! - [`health`]: AND-aggregation of health predicates;
//! - [`builder`]: registration surface;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod dispatcher;
mod engine;
mod health;
mod info;
mod runner;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::{MonitorConfig, SupervisorConfig};
pub use dispatcher::ErrorHandler;
pub use health::{HealthAggregator, HealthCheck};
pub use info::{SupervisorInfo, WorkerInfo};
pub use supervisor::{Supervisor, run_all};
