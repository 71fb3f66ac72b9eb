use std::time::Duration;

// Telemetry backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

// Endpoint paths
pub const ENDPOINT_TRAFFIC_DATA: &str = "/traffic_data";
pub const ENDPOINT_CAMERA_STATUS: &str = "/camera_status";

// Scheduler periods, in ticks of the signal clock
pub const PERTURBATION_EVERY_TICKS: u64 = 3;
pub const TRAFFIC_POLL_EVERY_TICKS: u64 = 2;
pub const CAMERA_POLL_EVERY_TICKS: u64 = 3;

// One tick of the signal clock
pub const DEFAULT_TICK_MILLIS: u64 = 1000;

// Longest tick or poll period the scheduler accepts
pub const MAX_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

// Incident actions with side effects beyond resolution
pub const ACTION_CLEAR_SIGNAL: &str = "Clear traffic signal";
pub const ACTION_CONTACT_HOSPITAL: &str = "Contact nearest hospital";
pub const ACTION_DISPATCH_POLICE: &str = "Dispatch traffic police";

// Seconds added to the selected junction when a recommendation is accepted
pub const RECOMMENDATION_EXTENSION_SECS: u32 = 15;
