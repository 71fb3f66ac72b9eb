// src/shared_data.rs

use serde::{Deserialize, Serialize};

/// Queue telemetry served by the backend's `/traffic_data` endpoint.
/// Display only: signal decisions never read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficData {
    #[serde(default)]
    pub ns_queue_length: u32,
    #[serde(default)]
    pub sn_queue_length: u32,
    /// Queue reduction against the first observed baseline, in percent.
    #[serde(default)]
    pub traffic_reduction: f64,
}

/// Camera health served by the backend's `/camera_status` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraStatus {
    pub status: String,
    #[serde(default)]
    pub fps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    Live,
    Simulated,
}

impl CameraStatus {
    /// Anything other than `"active"` counts as a simulated feed.
    pub fn mode(&self) -> CameraMode {
        if self.status == "active" {
            CameraMode::Live
        } else {
            CameraMode::Simulated
        }
    }
}
