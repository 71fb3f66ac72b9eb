use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::communication::telemetry_client::TelemetryClient;
use crate::config::DashboardConfig;
use crate::errors::DashboardResult;
use crate::monitoring::dashboard_controller::DashboardController;

/// The single writer lock every periodic task and command goes through.
pub type SharedDashboard = Arc<Mutex<DashboardController>>;

pub fn shared(controller: DashboardController) -> SharedDashboard {
    Arc::new(Mutex::new(controller))
}

// Runs a dedicated update loop that ticks the dashboard once per period.
pub async fn run_tick_loop(dashboard: SharedDashboard, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        dashboard.lock().await.tick();
    }
}

/// Fetches `/traffic_data` once and stores it. The lock is only held to apply the result.
/// Returns whether the poll succeeded; failures keep the previous telemetry.
pub async fn poll_traffic_data(dashboard: SharedDashboard, client: TelemetryClient) -> bool {
    match client.fetch_traffic_data().await {
        Ok(data) => {
            dashboard.lock().await.apply_traffic_data(data);
            true
        }
        Err(e) => {
            log::warn!("Error fetching traffic data: {}", e);
            false
        }
    }
}

/// Fetches `/camera_status` once and stores it; failures keep the previous status.
pub async fn poll_camera_status(dashboard: SharedDashboard, client: TelemetryClient) -> bool {
    match client.fetch_camera_status().await {
        Ok(status) => {
            dashboard.lock().await.apply_camera_status(status);
            true
        }
        Err(e) => {
            log::warn!("Error checking camera status: {}", e);
            false
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Poll {
    TrafficData,
    CameraStatus,
}

// Polls once per period. Each poll finishes before the next starts, so results land in
// request order; the client timeout bounds how long one poll can hold up the next.
async fn run_poller(dashboard: SharedDashboard, client: TelemetryClient, period: Duration, poll: Poll) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let dashboard = Arc::clone(&dashboard);
        let client = client.clone();
        match poll {
            Poll::TrafficData => poll_traffic_data(dashboard, client).await,
            Poll::CameraStatus => poll_camera_status(dashboard, client).await,
        };
    }
}

/// Spawns the signal clock and both pollers. The tasks run until the runtime shuts down.
/// Fails without spawning anything when a period in `config` is out of range.
pub fn spawn_dashboard_tasks(
    dashboard: &SharedDashboard,
    client: &TelemetryClient,
    config: &DashboardConfig,
) -> DashboardResult<Vec<JoinHandle<()>>> {
    let config = config.clone().validate()?;
    let tick = config.tick();
    let traffic_period = config.traffic_poll_period()?;
    let camera_period = config.camera_poll_period()?;
    log::info!(
        "Starting dashboard: tick {:?}, polling {} every {:?} / {:?}",
        tick,
        client.base_url(),
        traffic_period,
        camera_period
    );
    Ok(vec![
        tokio::spawn(run_tick_loop(Arc::clone(dashboard), tick)),
        tokio::spawn(run_poller(
            Arc::clone(dashboard),
            client.clone(),
            traffic_period,
            Poll::TrafficData,
        )),
        tokio::spawn(run_poller(
            Arc::clone(dashboard),
            client.clone(),
            camera_period,
            Poll::CameraStatus,
        )),
    ])
}
