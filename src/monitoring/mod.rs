pub mod admin_cli;
pub mod dashboard_controller;
pub mod incidents;
pub mod renderer;
pub mod runtime;

pub use dashboard_controller::{DashboardController, DashboardSnapshot};
pub use incidents::{Incident, IncidentId, IncidentRegistry, Resolution};
pub use runtime::SharedDashboard;
