pub mod messages;
pub mod telemetry_client;

pub use messages::DashboardCommand;
pub use telemetry_client::TelemetryClient;
