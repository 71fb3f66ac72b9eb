use crate::monitoring::incidents::IncidentId;
use crate::simulation_engine::junctions::{JunctionId, Phase};
use serde::{Deserialize, Serialize};

/// Operator commands accepted by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DashboardCommand {
    SelectJunction {
        junction_id: JunctionId,
    },
    ToggleEmergencyMode,
    ToggleManualOverride,
    /// Applies to the selected junction.
    SetPhase {
        phase: Phase,
    },
    /// Applies to the selected junction.
    EmergencyPreemption,
    ResolveIncident {
        incident_id: IncidentId,
        action: String,
    },
    AcceptRecommendation,
    DeclineRecommendation,
    TogglePopup {
        junction_id: JunctionId,
    },
}
