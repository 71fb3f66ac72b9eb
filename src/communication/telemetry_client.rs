use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::errors::{DashboardError, DashboardResult};
use crate::global_variables::{ENDPOINT_CAMERA_STATUS, ENDPOINT_TRAFFIC_DATA};
use crate::shared_data::{CameraStatus, TrafficData};

/// Read-only client for the two backend polling endpoints.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    http: Client,
    base_url: String,
}

impl TelemetryClient {
    pub fn new(base_url: &str, timeout: Duration) -> DashboardResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_traffic_data(&self) -> DashboardResult<TrafficData> {
        self.get_json(ENDPOINT_TRAFFIC_DATA).await
    }

    pub async fn fetch_camera_status(&self) -> DashboardResult<CameraStatus> {
        self.get_json(ENDPOINT_CAMERA_STATUS).await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> DashboardResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let to_failure = |source| DashboardError::ExternalFetchFailure {
            endpoint: endpoint.to_string(),
            source,
        };
        self.http
            .get(&url)
            .send()
            .await
            .map_err(to_failure)?
            .error_for_status()
            .map_err(to_failure)?
            .json::<T>()
            .await
            .map_err(to_failure)
    }
}
