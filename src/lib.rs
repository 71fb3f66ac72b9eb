//! Core of a traffic-junction monitoring dashboard: signal phase cycling with manual
//! override and emergency preemption, an incident feed, a single AI recommendation,
//! and polling of an external telemetry backend. Every mutation publishes an
//! immutable [`monitoring::DashboardSnapshot`] for renderers to draw.

pub mod communication;
pub mod config;
pub mod control_system;
pub mod errors;
pub mod global_variables;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;

pub use errors::{DashboardError, DashboardResult};
