use serde::{Deserialize, Serialize};

use crate::errors::{DashboardError, DashboardResult};
use crate::simulation_engine::junctions::{Junction, JunctionId, JunctionStore, Phase, PhaseKind};

/// Phase durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    pub yellow: u32,
    pub green: u32,
    pub green_emergency: u32,
    pub red: u32,
    pub red_emergency: u32,
    /// Timer given to a phase picked by hand under manual override.
    pub manual: u32,
    /// Timer given to the green phase forced by emergency preemption.
    pub preemption: u32,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            yellow: 5,
            green: 30,
            green_emergency: 60,
            red: 25,
            red_emergency: 20,
            manual: 30,
            preemption: 60,
        }
    }
}

impl PhaseTimings {
    pub fn duration(&self, phase: Phase, emergency_mode: bool) -> u32 {
        match (phase.kind(), emergency_mode) {
            (PhaseKind::Yellow, _) => self.yellow,
            (PhaseKind::Green, false) => self.green,
            (PhaseKind::Green, true) => self.green_emergency,
            (PhaseKind::Red, false) => self.red,
            (PhaseKind::Red, true) => self.red_emergency,
        }
    }
}

/// Drives the phase state machine of every junction.
///
/// Owns the junctions together with the two global flags that steer cycling:
/// `emergency_mode` lengthens green phases and shortens red ones, `manual_override`
/// freezes automatic cycling everywhere.
#[derive(Debug, Clone)]
pub struct SignalPhaseEngine {
    junctions: JunctionStore,
    timings: PhaseTimings,
    emergency_mode: bool,
    manual_override: bool,
}

impl SignalPhaseEngine {
    pub fn new(junctions: JunctionStore, timings: PhaseTimings) -> Self {
        let mut engine = Self {
            junctions,
            timings,
            emergency_mode: false,
            manual_override: false,
        };
        engine.refresh_signal_states();
        engine
    }

    pub fn junctions(&self) -> &JunctionStore {
        &self.junctions
    }

    pub fn junction(&self, id: &JunctionId) -> Option<&Junction> {
        self.junctions.get(id)
    }

    pub(crate) fn junction_mut(&mut self, id: &JunctionId) -> DashboardResult<&mut Junction> {
        self.junctions
            .get_mut(id)
            .ok_or_else(|| DashboardError::unknown_junction(id.as_str()))
    }

    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    pub fn emergency_mode(&self) -> bool {
        self.emergency_mode
    }

    pub fn manual_override(&self) -> bool {
        self.manual_override
    }

    pub fn set_emergency_mode(&mut self, enabled: bool) {
        self.emergency_mode = enabled;
    }

    /// Turning override off resumes cycling from the current phase and timer as they are.
    pub fn set_manual_override(&mut self, enabled: bool) {
        self.manual_override = enabled;
    }

    // Counts every junction down by one second and moves the expired ones to their next phase.
    pub fn tick(&mut self) {
        if self.manual_override {
            return;
        }
        let timings = self.timings;
        let emergency_mode = self.emergency_mode;
        for junction in self.junctions.iter_mut() {
            if junction.time_left > 0 {
                junction.time_left -= 1;
            } else {
                let next = junction.phase.next();
                junction.phase = next;
                junction.time_left = timings.duration(next, emergency_mode);
                log::debug!(
                    "Junction {} switching to {} for {}s",
                    junction.id,
                    next,
                    junction.time_left
                );
            }
        }
        self.refresh_signal_states();
    }

    /// Puts a junction into `phase` by hand. Only allowed while manual override is on.
    pub fn set_phase(&mut self, id: &JunctionId, phase: Phase) -> DashboardResult<()> {
        if !self.junctions.contains(id) {
            return Err(DashboardError::unknown_junction(id.as_str()));
        }
        if !self.manual_override {
            return Err(DashboardError::PreconditionViolation(format!(
                "cannot set {} on {}: manual override is off",
                phase, id
            )));
        }
        let duration = self.timings.manual;
        let junction = self.junction_mut(id)?;
        junction.phase = phase;
        junction.time_left = duration;
        junction.refresh_signal_state();
        log::info!("Manual control: junction {} set to {}", id, phase);
        Ok(())
    }

    /// Forces north-south green with the preemption timer and turns on emergency mode.
    /// Bypasses manual override.
    pub fn preempt_for_emergency(&mut self, id: &JunctionId) -> DashboardResult<()> {
        let duration = self.timings.preemption;
        let junction = self.junction_mut(id)?;
        junction.phase = Phase::NsGreen;
        junction.time_left = duration;
        junction.refresh_signal_state();
        self.emergency_mode = true;
        log::info!("Emergency preemption at junction {}", id);
        Ok(())
    }

    pub fn extend_time_left(&mut self, id: &JunctionId, seconds: u32) -> DashboardResult<()> {
        let junction = self.junction_mut(id)?;
        junction.time_left = junction.time_left.saturating_add(seconds);
        Ok(())
    }

    fn refresh_signal_states(&mut self) {
        for junction in self.junctions.iter_mut() {
            junction.refresh_signal_state();
        }
    }
}
