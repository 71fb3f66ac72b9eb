use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::errors::{DashboardError, DashboardResult};
use crate::simulation_engine::junctions::JunctionId;

pub type IncidentId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentKind {
    Emergency,
    Accident,
    Congestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Extra detail attached to emergency-vehicle incidents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyVehicleInfo {
    pub vehicle_type: String,
    pub direction: String,
    pub estimated_arrival: String,
}

/// An incident as reported, before the registry assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
    pub kind: IncidentKind,
    pub location: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub priority: Priority,
    pub details: String,
    pub actions: Vec<String>,
    pub junction_id: JunctionId,
    pub vehicle: Option<EmergencyVehicleInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub kind: IncidentKind,
    pub location: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub priority: Priority,
    pub details: String,
    /// Actions offered to the operator, in display order.
    pub actions: Vec<String>,
    pub resolved: bool,
    pub resolved_action: Option<String>,
    pub resolved_time: Option<DateTime<Local>>,
    pub junction_id: JunctionId,
    pub vehicle: Option<EmergencyVehicleInfo>,
}

/// What a call to [`IncidentRegistry::resolve`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved,
    /// The incident was closed earlier; its first resolution is kept.
    AlreadyResolved,
}

#[derive(Debug, Clone)]
pub struct IncidentRegistry {
    incidents: Vec<Incident>,
    resolution_order: Vec<IncidentId>,
    next_id: IncidentId,
}

impl Default for IncidentRegistry {
    fn default() -> Self {
        Self {
            incidents: Vec::new(),
            resolution_order: Vec::new(),
            next_id: 1,
        }
    }
}

impl IncidentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new incident under the next id.
    pub fn report(&mut self, incident: NewIncident) -> IncidentId {
        let id = self.next_id;
        self.next_id += 1;
        log::info!(
            "Incident {} reported at {}: {}",
            id,
            incident.location,
            incident.message
        );
        self.incidents.push(Incident {
            id,
            kind: incident.kind,
            location: incident.location,
            message: incident.message,
            timestamp: incident.timestamp,
            priority: incident.priority,
            details: incident.details,
            actions: incident.actions,
            resolved: false,
            resolved_action: None,
            resolved_time: None,
            junction_id: incident.junction_id,
            vehicle: incident.vehicle,
        });
        id
    }

    pub fn get(&self, id: IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    /// Closes an incident with the action the operator took.
    /// A second call for the same incident changes nothing.
    pub fn resolve(
        &mut self,
        id: IncidentId,
        action: &str,
        at: DateTime<Local>,
    ) -> DashboardResult<Resolution> {
        let incident = self
            .incidents
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| DashboardError::unknown_incident(id))?;
        if incident.resolved {
            log::debug!("Incident {} already resolved", id);
            return Ok(Resolution::AlreadyResolved);
        }
        incident.resolved = true;
        incident.resolved_action = Some(action.to_string());
        incident.resolved_time = Some(at);
        self.resolution_order.push(id);
        log::info!("Incident {} resolved with '{}'", id, action);
        Ok(Resolution::Resolved)
    }

    /// Open incidents in the order they were reported.
    pub fn active_incidents(&self) -> impl Iterator<Item = &Incident> + '_ {
        self.incidents.iter().filter(|i| !i.resolved)
    }

    /// Closed incidents, most recently resolved first.
    pub fn resolved_incidents(&self) -> impl Iterator<Item = &Incident> + '_ {
        self.resolution_order
            .iter()
            .rev()
            .filter_map(move |id| self.get(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.iter()
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

/// The emergency the demo dashboard starts with.
pub fn seed_incidents(now: DateTime<Local>) -> IncidentRegistry {
    let mut registry = IncidentRegistry::new();
    registry.report(NewIncident {
        kind: IncidentKind::Emergency,
        location: "OMR Junction".to_string(),
        message: "Ambulance approaching from south".to_string(),
        timestamp: now,
        priority: Priority::High,
        details: "Emergency vehicle detected via OpenCV. Estimated arrival: 2 minutes.".to_string(),
        actions: vec![
            "Clear traffic signal".to_string(),
            "Alert nearby junctions".to_string(),
            "Contact emergency services".to_string(),
        ],
        junction_id: JunctionId::from("omr-sholinganallur"),
        vehicle: Some(EmergencyVehicleInfo {
            vehicle_type: "Ambulance".to_string(),
            direction: "South to North".to_string(),
            estimated_arrival: "2 min".to_string(),
        }),
    });
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn congestion(location: &str, now: DateTime<Local>) -> NewIncident {
        NewIncident {
            kind: IncidentKind::Congestion,
            location: location.to_string(),
            message: "Queue building".to_string(),
            timestamp: now,
            priority: Priority::Medium,
            details: String::new(),
            actions: vec!["Dispatch traffic police".to_string()],
            junction_id: JunctionId::from("anna-salai-mount"),
            vehicle: None,
        }
    }

    #[test]
    fn ids_are_monotonic() {
        let now = Local::now();
        let mut registry = seed_incidents(now);
        assert_eq!(registry.report(congestion("A", now)), 2);
        assert_eq!(registry.report(congestion("B", now)), 3);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn resolve_is_idempotent() {
        let now = Local::now();
        let mut registry = seed_incidents(now);
        let first = now + Duration::seconds(5);
        assert_eq!(
            registry.resolve(1, "Clear traffic signal", first).unwrap(),
            Resolution::Resolved
        );
        assert_eq!(
            registry
                .resolve(1, "Alert nearby junctions", first + Duration::minutes(3))
                .unwrap(),
            Resolution::AlreadyResolved
        );
        let incident = registry.get(1).unwrap();
        assert!(incident.resolved);
        assert_eq!(incident.resolved_action.as_deref(), Some("Clear traffic signal"));
        assert_eq!(incident.resolved_time, Some(first));
        assert_eq!(registry.resolved_incidents().count(), 1);
    }

    #[test]
    fn resolve_unknown_incident_fails() {
        let mut registry = seed_incidents(Local::now());
        let err = registry.resolve(99, "anything", Local::now()).unwrap_err();
        assert!(err.is_invalid_reference());
        assert!(!registry.get(1).unwrap().resolved);
    }

    #[test]
    fn active_in_report_order_resolved_most_recent_first() {
        let now = Local::now();
        let mut registry = seed_incidents(now);
        registry.report(congestion("A", now));
        registry.report(congestion("B", now));
        registry.report(congestion("C", now));

        registry.resolve(3, "Dispatch traffic police", now).unwrap();
        registry.resolve(1, "Clear traffic signal", now).unwrap();

        let active: Vec<IncidentId> = registry.active_incidents().map(|i| i.id).collect();
        assert_eq!(active, vec![2, 4]);
        let resolved: Vec<IncidentId> = registry.resolved_incidents().map(|i| i.id).collect();
        assert_eq!(resolved, vec![1, 3]);

        // Restartable: a second pass sees the same sequence.
        assert_eq!(registry.resolved_incidents().count(), 2);
        assert_eq!(registry.active_incidents().count(), 2);
    }
}
