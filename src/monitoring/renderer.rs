use std::fmt::Write;

use tokio::sync::watch;

use crate::control_system::recommendation::Decision;
use crate::monitoring::dashboard_controller::DashboardSnapshot;
use crate::monitoring::incidents::{Incident, IncidentKind};
use crate::shared_data::CameraMode;
use crate::simulation_engine::junctions::{LightState, SignalState};

/// How many resolved incidents the feed shows.
pub const RESOLVED_SHOWN: usize = 2;

fn light(state: LightState) -> &'static str {
    match state {
        LightState::Green => "G",
        LightState::Yellow => "Y",
        LightState::Red => "R",
    }
}

fn lights(state: &SignalState) -> String {
    format!("NS:{} EW:{}", light(state.ns), light(state.ew))
}

/// Formats a snapshot as the plain-text console dashboard.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Junction Dashboard (tick {}) === Emergency Mode {} | Override {}",
        snapshot.tick,
        if snapshot.emergency_mode { "ON" } else { "OFF" },
        if snapshot.manual_override { "ON" } else { "OFF" },
    );

    if let Some(junction) = snapshot.selected() {
        let _ = writeln!(out, "Selected: {} ({:?})", junction.name, junction.status);
        let _ = writeln!(
            out,
            "  Density {}% | Queue {} vehicles | Avg wait {}s | {} {}s left",
            junction.density.round(),
            junction.queue_length,
            junction.wait_time.round(),
            junction.phase,
            junction.time_left
        );
    }

    let _ = writeln!(out, "Signals:");
    for junction in &snapshot.junctions {
        let mut flags = String::new();
        if junction.emergency_vehicle_present {
            flags.push_str(" [emergency vehicle]");
        }
        if junction.accident_present {
            flags.push_str(" [accident]");
        }
        if snapshot.open_popups.get(&junction.id).copied().unwrap_or(false) {
            flags.push_str(" [popup]");
        }
        let _ = writeln!(
            out,
            "  {:<24} {:<9} {:>3}s  {}{}",
            junction.name,
            junction.phase.label(),
            junction.time_left,
            lights(&junction.signal_state),
            flags
        );
    }

    let _ = writeln!(out, "Incidents:");
    for incident in &snapshot.active_incidents {
        let _ = writeln!(
            out,
            "  #{} [{:?}/{:?}] {} - {} ({})",
            incident.id,
            incident.kind,
            incident.priority,
            incident.location,
            incident.message,
            incident.timestamp.format("%H:%M")
        );
    }
    for incident in snapshot.resolved_incidents.iter().take(RESOLVED_SHOWN) {
        let _ = writeln!(
            out,
            "  #{} resolved: {} at {}",
            incident.id,
            incident.resolved_action.as_deref().unwrap_or("-"),
            incident
                .resolved_time
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default()
        );
    }

    let rec = &snapshot.recommendation;
    let decision = match rec.decision {
        Decision::Pending => "pending",
        Decision::Accepted => "accepted",
        Decision::Declined => "declined",
    };
    let _ = writeln!(
        out,
        "AI: {} ({}% - {}) [{}]",
        rec.suggestion, rec.confidence, rec.reason, decision
    );

    if let Some(data) = &snapshot.traffic_data {
        let _ = writeln!(out, "Traffic reduction: {:.1}%", data.traffic_reduction);
    }
    if let Some(camera) = &snapshot.camera {
        let mode = match camera.mode() {
            CameraMode::Live => "Live",
            CameraMode::Simulated => "Simulated",
        };
        let _ = writeln!(out, "Camera: {} {} FPS", mode, camera.fps);
    }
    if let Some(notice) = &snapshot.notice {
        let _ = writeln!(out, "Notice: {}", notice);
    }
    out
}

fn kind_heading(kind: IncidentKind) -> &'static str {
    match kind {
        IncidentKind::Emergency => "Emergency Vehicle",
        IncidentKind::Accident => "Traffic Accident",
        IncidentKind::Congestion => "Traffic Congestion",
    }
}

/// Detail view of one incident: heading, details, vehicle info and the numbered actions.
pub fn render_incident(incident: &Incident) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Incident #{}: {} ({:?} priority) ===",
        incident.id,
        kind_heading(incident.kind),
        incident.priority
    );
    let _ = writeln!(
        out,
        "{} ({}) - {}",
        incident.location,
        incident.junction_id,
        incident.timestamp.format("%H:%M")
    );
    let _ = writeln!(out, "{}", incident.message);
    if !incident.details.is_empty() {
        let _ = writeln!(out, "Details: {}", incident.details);
    }
    if let Some(vehicle) = &incident.vehicle {
        let _ = writeln!(
            out,
            "Vehicle: {} heading {}, ETA {}",
            vehicle.vehicle_type, vehicle.direction, vehicle.estimated_arrival
        );
    }
    if incident.resolved {
        let _ = writeln!(
            out,
            "Resolved: {} at {}",
            incident.resolved_action.as_deref().unwrap_or("-"),
            incident
                .resolved_time
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default()
        );
    } else if incident.actions.is_empty() {
        let _ = writeln!(out, "No actions available");
    } else {
        let _ = writeln!(out, "Available actions:");
        for (idx, action) in incident.actions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", idx + 1, action);
        }
    }
    out
}

/// Prints the dashboard every `every_ticks` ticks of the published snapshots.
pub async fn run_console_renderer(mut snapshots: watch::Receiver<DashboardSnapshot>, every_ticks: u64) {
    if every_ticks == 0 {
        return;
    }
    let mut last_rendered = None;
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if snapshot.tick % every_ticks == 0 && last_rendered != Some(snapshot.tick) {
            last_rendered = Some(snapshot.tick);
            println!("{}", render_text(&snapshot));
        }
    }
}
