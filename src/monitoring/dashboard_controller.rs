use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::watch;

use crate::communication::messages::DashboardCommand;
use crate::control_system::recommendation::{
    default_recommendation, Recommendation, RecommendationController,
};
use crate::control_system::signal_phase_engine::{PhaseTimings, SignalPhaseEngine};
use crate::errors::{DashboardError, DashboardResult};
use crate::global_variables::{
    ACTION_CLEAR_SIGNAL, ACTION_CONTACT_HOSPITAL, ACTION_DISPATCH_POLICE,
    PERTURBATION_EVERY_TICKS, RECOMMENDATION_EXTENSION_SECS,
};
use crate::monitoring::incidents::{seed_incidents, Incident, IncidentId, IncidentRegistry, Resolution};
use crate::shared_data::{CameraStatus, TrafficData};
use crate::simulation_engine::junctions::{create_junctions, Junction, JunctionId, JunctionStore, Phase};
use crate::simulation_engine::perturbation::{perturb_junction, RandomSource};

/// Immutable copy of the whole dashboard, published after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub tick: u64,
    pub selected_junction: JunctionId,
    pub emergency_mode: bool,
    pub manual_override: bool,
    pub junctions: Vec<Junction>,
    /// Open incidents in report order.
    pub active_incidents: Vec<Incident>,
    /// Closed incidents, most recently resolved first.
    pub resolved_incidents: Vec<Incident>,
    pub recommendation: Recommendation,
    pub open_popups: BTreeMap<JunctionId, bool>,
    pub traffic_data: Option<TrafficData>,
    pub camera: Option<CameraStatus>,
    pub notice: Option<String>,
}

impl DashboardSnapshot {
    pub fn selected(&self) -> Option<&Junction> {
        self.junctions.iter().find(|j| j.id == self.selected_junction)
    }
}

/// Owns all dashboard state and is the only place it changes.
pub struct DashboardController {
    engine: SignalPhaseEngine,
    incidents: IncidentRegistry,
    recommendation: RecommendationController,
    selected_junction: JunctionId,
    open_popups: BTreeMap<JunctionId, bool>,
    traffic_data: Option<TrafficData>,
    camera: Option<CameraStatus>,
    notice: Option<String>,
    random: Box<dyn RandomSource>,
    perturbation_every_ticks: u64,
    tick_count: u64,
    snapshots: watch::Sender<DashboardSnapshot>,
}

impl DashboardController {
    /// Builds a controller selecting the first junction. Fails when there are no junctions.
    pub fn new(
        junctions: JunctionStore,
        incidents: IncidentRegistry,
        recommendation: RecommendationController,
        timings: PhaseTimings,
        random: Box<dyn RandomSource>,
    ) -> DashboardResult<Self> {
        let selected_junction = junctions
            .first_id()
            .cloned()
            .ok_or_else(|| DashboardError::Config("at least one junction is required".into()))?;
        let engine = SignalPhaseEngine::new(junctions, timings);
        let initial = DashboardSnapshot {
            tick: 0,
            selected_junction: selected_junction.clone(),
            emergency_mode: false,
            manual_override: false,
            junctions: engine.junctions().to_vec(),
            active_incidents: incidents.active_incidents().cloned().collect(),
            resolved_incidents: incidents.resolved_incidents().cloned().collect(),
            recommendation: recommendation.recommendation().clone(),
            open_popups: BTreeMap::new(),
            traffic_data: None,
            camera: None,
            notice: None,
        };
        let (snapshots, _) = watch::channel(initial);
        Ok(Self {
            engine,
            incidents,
            recommendation,
            selected_junction,
            open_popups: BTreeMap::new(),
            traffic_data: None,
            camera: None,
            notice: None,
            random,
            perturbation_every_ticks: PERTURBATION_EVERY_TICKS,
            tick_count: 0,
            snapshots,
        })
    }

    /// The seeded Chennai dashboard: three junctions, one emergency, one recommendation.
    pub fn demo(timings: PhaseTimings, random: Box<dyn RandomSource>) -> DashboardResult<Self> {
        Self::new(
            JunctionStore::new(create_junctions()),
            seed_incidents(Local::now()),
            default_recommendation(),
            timings,
            random,
        )
    }

    pub fn with_perturbation_every(mut self, ticks: u64) -> Self {
        self.perturbation_every_ticks = ticks.max(1);
        self
    }

    pub fn engine(&self) -> &SignalPhaseEngine {
        &self.engine
    }

    pub fn incidents(&self) -> &IncidentRegistry {
        &self.incidents
    }

    pub fn recommendation(&self) -> &RecommendationController {
        &self.recommendation
    }

    pub fn selected_junction(&self) -> &JunctionId {
        &self.selected_junction
    }

    pub fn emergency_mode(&self) -> bool {
        self.engine.emergency_mode()
    }

    pub fn manual_override(&self) -> bool {
        self.engine.manual_override()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn traffic_data(&self) -> Option<&TrafficData> {
        self.traffic_data.as_ref()
    }

    pub fn camera(&self) -> Option<&CameraStatus> {
        self.camera.as_ref()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.subscribe()
    }

    /// Advances the signal clock by one unit; every few ticks also perturbs the selected junction.
    pub fn tick(&mut self) {
        self.engine.tick();
        self.tick_count += 1;
        if self.tick_count % self.perturbation_every_ticks == 0 {
            self.perturb_selected();
        }
        log::trace!("Tick {}", self.tick_count);
        self.publish();
    }

    fn perturb_selected(&mut self) {
        match self.engine.junction_mut(&self.selected_junction) {
            Ok(junction) => perturb_junction(junction, self.random.as_mut()),
            Err(e) => log::warn!("Skipping perturbation: {}", e),
        }
    }

    pub fn select_junction(&mut self, id: &JunctionId) -> DashboardResult<()> {
        if !self.engine.junctions().contains(id) {
            return Err(DashboardError::unknown_junction(id.as_str()));
        }
        self.selected_junction = id.clone();
        log::info!("Selected junction {}", id);
        self.publish();
        Ok(())
    }

    pub fn toggle_emergency_mode(&mut self) -> bool {
        let enabled = !self.engine.emergency_mode();
        self.engine.set_emergency_mode(enabled);
        log::info!("Emergency mode {}", if enabled { "ON" } else { "OFF" });
        self.publish();
        enabled
    }

    pub fn toggle_manual_override(&mut self) -> bool {
        let enabled = !self.engine.manual_override();
        self.engine.set_manual_override(enabled);
        log::info!("Manual override {}", if enabled { "ON" } else { "OFF" });
        self.publish();
        enabled
    }

    pub fn set_phase(&mut self, id: &JunctionId, phase: Phase) -> DashboardResult<()> {
        self.engine.set_phase(id, phase)?;
        self.publish();
        Ok(())
    }

    pub fn preempt_for_emergency(&mut self, id: &JunctionId) -> DashboardResult<()> {
        self.engine.preempt_for_emergency(id)?;
        self.publish();
        Ok(())
    }

    pub fn resolve_incident(&mut self, id: IncidentId, action: &str) -> DashboardResult<Resolution> {
        self.resolve_incident_at(id, action, Local::now())
    }

    /// Resolves an incident and carries out the follow-up its action implies.
    /// Follow-ups only run on the first, effective resolution.
    pub fn resolve_incident_at(
        &mut self,
        id: IncidentId,
        action: &str,
        at: DateTime<Local>,
    ) -> DashboardResult<Resolution> {
        let resolution = self.incidents.resolve(id, action, at)?;
        if resolution == Resolution::Resolved {
            if action == ACTION_CLEAR_SIGNAL {
                let junction_id = self.incidents.get(id).map(|i| i.junction_id.clone());
                if let Some(junction_id) = junction_id {
                    if let Err(e) = self.engine.preempt_for_emergency(&junction_id) {
                        log::warn!("Incident {} cleared but preemption failed: {}", id, e);
                    }
                }
            }
            if let Some(notice) = resolution_notice(action) {
                self.notice = Some(notice.to_string());
            }
        }
        self.publish();
        Ok(resolution)
    }

    /// Accepts the recommendation and extends the selected junction's current phase.
    pub fn accept_recommendation(&mut self) -> DashboardResult<()> {
        if !self.engine.junctions().contains(&self.selected_junction) {
            return Err(DashboardError::unknown_junction(self.selected_junction.as_str()));
        }
        self.recommendation.accept()?;
        self.engine
            .extend_time_left(&self.selected_junction, RECOMMENDATION_EXTENSION_SECS)?;
        self.publish();
        Ok(())
    }

    pub fn decline_recommendation(&mut self) -> DashboardResult<()> {
        self.recommendation.decline()?;
        self.publish();
        Ok(())
    }

    /// Flips the map popup of a junction. UI bookkeeping only.
    pub fn toggle_popup(&mut self, id: &JunctionId) -> DashboardResult<bool> {
        if !self.engine.junctions().contains(id) {
            return Err(DashboardError::unknown_junction(id.as_str()));
        }
        let open = self.open_popups.entry(id.clone()).or_insert(false);
        *open = !*open;
        let open = *open;
        self.publish();
        Ok(open)
    }

    pub fn apply_traffic_data(&mut self, data: TrafficData) {
        log::debug!(
            "Traffic data: NS queue {}, SN queue {}, reduction {:.1}%",
            data.ns_queue_length,
            data.sn_queue_length,
            data.traffic_reduction
        );
        self.traffic_data = Some(data);
        self.publish();
    }

    pub fn apply_camera_status(&mut self, status: CameraStatus) {
        let changed = self.camera.as_ref().map(|c| c.mode()) != Some(status.mode());
        if changed {
            log::info!("Camera feed is now {:?}", status.mode());
        }
        self.camera = Some(status);
        self.publish();
    }

    /// Runs one operator command. Rejected commands leave the state as it was.
    pub fn dispatch(&mut self, command: DashboardCommand) -> DashboardResult<()> {
        log::info!("Command {:?}", command);
        let selected = self.selected_junction.clone();
        let result = match command {
            DashboardCommand::SelectJunction { junction_id } => self.select_junction(&junction_id),
            DashboardCommand::ToggleEmergencyMode => {
                self.toggle_emergency_mode();
                Ok(())
            }
            DashboardCommand::ToggleManualOverride => {
                self.toggle_manual_override();
                Ok(())
            }
            DashboardCommand::SetPhase { phase } => self.set_phase(&selected, phase),
            DashboardCommand::EmergencyPreemption => self.preempt_for_emergency(&selected),
            DashboardCommand::ResolveIncident {
                incident_id,
                action,
            } => self.resolve_incident(incident_id, &action).map(|_| ()),
            DashboardCommand::AcceptRecommendation => self.accept_recommendation(),
            DashboardCommand::DeclineRecommendation => self.decline_recommendation(),
            DashboardCommand::TogglePopup { junction_id } => {
                self.toggle_popup(&junction_id).map(|_| ())
            }
        };
        if let Err(ref e) = result {
            log::warn!("Command rejected: {}", e);
        }
        result
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            tick: self.tick_count,
            selected_junction: self.selected_junction.clone(),
            emergency_mode: self.engine.emergency_mode(),
            manual_override: self.engine.manual_override(),
            junctions: self.engine.junctions().to_vec(),
            active_incidents: self.incidents.active_incidents().cloned().collect(),
            resolved_incidents: self.incidents.resolved_incidents().cloned().collect(),
            recommendation: self.recommendation.recommendation().clone(),
            open_popups: self.open_popups.clone(),
            traffic_data: self.traffic_data.clone(),
            camera: self.camera.clone(),
            notice: self.notice.clone(),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

/// Operator-facing message for actions that reach outside the dashboard.
pub fn resolution_notice(action: &str) -> Option<&'static str> {
    match action {
        ACTION_CLEAR_SIGNAL => Some("Emergency signal preemption activated"),
        ACTION_CONTACT_HOSPITAL => Some("Contacted Apollo Hospital Chennai - ETA: 8 minutes"),
        ACTION_DISPATCH_POLICE => {
            Some("Traffic police dispatched from T. Nagar station - ETA: 5 minutes")
        }
        _ => None,
    }
}
