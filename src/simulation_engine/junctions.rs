use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A unique identifier for a junction, e.g. `anna-salai-mount`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JunctionId(pub String);

impl JunctionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JunctionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JunctionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The state of one axis of a signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

/// The lights shown on the north-south and east-west axes.
/// Each axis shows exactly one light, so the two can never disagree with themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalState {
    pub ns: LightState,
    pub ew: LightState,
}

impl SignalState {
    pub const ALL_RED: SignalState = SignalState {
        ns: LightState::Red,
        ew: LightState::Red,
    };
}

/// Signal phase of a junction. Cycles in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    NsGreen,
    NsYellow,
    NsRed,
    EwGreen,
    EwYellow,
    EwRed,
}

/// Broad category of a phase, used to pick its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Green,
    Yellow,
    Red,
}

impl Phase {
    pub const CYCLE: [Phase; 6] = [
        Phase::NsGreen,
        Phase::NsYellow,
        Phase::NsRed,
        Phase::EwGreen,
        Phase::EwYellow,
        Phase::EwRed,
    ];

    /// The phases an operator can pick by hand while manual override is on.
    pub const MANUAL_CONTROLS: [Phase; 4] =
        [Phase::NsGreen, Phase::NsRed, Phase::EwGreen, Phase::EwRed];

    pub fn next(self) -> Phase {
        match self {
            Phase::NsGreen => Phase::NsYellow,
            Phase::NsYellow => Phase::NsRed,
            Phase::NsRed => Phase::EwGreen,
            Phase::EwGreen => Phase::EwYellow,
            Phase::EwYellow => Phase::EwRed,
            Phase::EwRed => Phase::NsGreen,
        }
    }

    pub fn kind(self) -> PhaseKind {
        match self {
            Phase::NsGreen | Phase::EwGreen => PhaseKind::Green,
            Phase::NsYellow | Phase::EwYellow => PhaseKind::Yellow,
            Phase::NsRed | Phase::EwRed => PhaseKind::Red,
        }
    }

    /// The lights this phase shows. Both red phases are the all-red state.
    pub fn signal_state(self) -> SignalState {
        use LightState::*;
        match self {
            Phase::NsGreen => SignalState { ns: Green, ew: Red },
            Phase::NsYellow => SignalState { ns: Yellow, ew: Red },
            Phase::EwGreen => SignalState { ns: Red, ew: Green },
            Phase::EwYellow => SignalState { ns: Red, ew: Yellow },
            Phase::NsRed | Phase::EwRed => SignalState::ALL_RED,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::NsGreen => "NS Green",
            Phase::NsYellow => "NS Yellow",
            Phase::NsRed => "NS Red",
            Phase::EwGreen => "EW Green",
            Phase::EwYellow => "EW Yellow",
            Phase::EwRed => "EW Red",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Phase {
    type Err = String;

    /// Accepts both the display label ("NS Green") and the wire form ("NS_GREEN").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Phase::CYCLE
            .into_iter()
            .find(|phase| phase.label().to_ascii_uppercase().replace(' ', "_") == normalized)
            .ok_or_else(|| format!("unknown phase '{}'", s))
    }
}

/// Congestion level shown for a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionStatus {
    Low,
    Medium,
    High,
}

impl CongestionStatus {
    pub fn from_density(density: f64) -> Self {
        if density > 70.0 {
            CongestionStatus::High
        } else if density > 40.0 {
            CongestionStatus::Medium
        } else {
            CongestionStatus::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Initial traffic readings of a junction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficMetrics {
    /// Percent, 10..=100 once perturbed.
    pub density: f64,
    pub queue_length: u32,
    /// Seconds.
    pub wait_time: f64,
}

impl TrafficMetrics {
    pub fn new(density: f64, queue_length: u32, wait_time: f64) -> Self {
        Self {
            density,
            queue_length,
            wait_time,
        }
    }
}

/// Represents a monitored junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub id: JunctionId,
    pub name: String,
    /// Traffic density in percent.
    pub density: f64,
    pub queue_length: u32,
    /// Average wait time in seconds.
    pub wait_time: f64,
    pub status: CongestionStatus,
    pub phase: Phase,
    /// Seconds until the phase changes.
    pub time_left: u32,
    pub emergency_vehicle_present: bool,
    pub accident_present: bool,
    pub coordinates: Coordinates,
    pub signal_state: SignalState,
}

impl Junction {
    /// Creates a junction. Status and signal lights are derived from density and phase.
    pub fn new(
        id: &str,
        name: &str,
        traffic: TrafficMetrics,
        phase: Phase,
        time_left: u32,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id: JunctionId::new(id),
            name: name.to_string(),
            density: traffic.density,
            queue_length: traffic.queue_length,
            wait_time: traffic.wait_time,
            status: CongestionStatus::from_density(traffic.density),
            phase,
            time_left,
            emergency_vehicle_present: false,
            accident_present: false,
            coordinates,
            signal_state: phase.signal_state(),
        }
    }

    pub fn with_emergency_vehicle(mut self) -> Self {
        self.emergency_vehicle_present = true;
        self
    }

    pub fn with_accident(mut self) -> Self {
        self.accident_present = true;
        self
    }

    pub fn refresh_signal_state(&mut self) {
        self.signal_state = self.phase.signal_state();
    }

    pub fn refresh_status(&mut self) {
        self.status = CongestionStatus::from_density(self.density);
    }
}

/// Junctions keyed by id, kept in the order they were registered.
#[derive(Debug, Clone, Default)]
pub struct JunctionStore {
    junctions: Vec<Junction>,
}

impl JunctionStore {
    /// Builds a store. A junction whose id is already present is dropped.
    pub fn new(junctions: Vec<Junction>) -> Self {
        let mut store = Self::default();
        for junction in junctions {
            if store.contains(&junction.id) {
                log::warn!("Ignoring duplicate junction id {}", junction.id);
                continue;
            }
            store.junctions.push(junction);
        }
        store
    }

    pub fn get(&self, id: &JunctionId) -> Option<&Junction> {
        self.junctions.iter().find(|j| &j.id == id)
    }

    pub fn get_mut(&mut self, id: &JunctionId) -> Option<&mut Junction> {
        self.junctions.iter_mut().find(|j| &j.id == id)
    }

    pub fn contains(&self, id: &JunctionId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Junction> {
        self.junctions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Junction> {
        self.junctions.iter_mut()
    }

    pub fn first_id(&self) -> Option<&JunctionId> {
        self.junctions.first().map(|j| &j.id)
    }

    pub fn len(&self) -> usize {
        self.junctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Junction> {
        self.junctions.clone()
    }
}

/// The Chennai junctions monitored by the demo dashboard.
pub fn create_junctions() -> Vec<Junction> {
    vec![
        Junction::new(
            "anna-salai-mount",
            "Anna Salai - Mount Road",
            TrafficMetrics::new(65.0, 8, 45.0),
            Phase::NsGreen,
            25,
            Coordinates::new(13.0827, 80.2707),
        ),
        Junction::new(
            "omr-sholinganallur",
            "OMR - Sholinganallur",
            TrafficMetrics::new(82.0, 12, 75.0),
            Phase::EwGreen,
            18,
            Coordinates::new(12.8992, 80.2289),
        )
        .with_emergency_vehicle(),
        Junction::new(
            "ecr-mahabalipuram",
            "ECR - Mahabalipuram Rd",
            TrafficMetrics::new(35.0, 3, 20.0),
            Phase::NsRed,
            10,
            Coordinates::new(12.6208, 80.1944),
        )
        .with_accident(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_state_table() {
        use LightState::*;
        let expected = [
            (Phase::NsGreen, Green, Red),
            (Phase::NsYellow, Yellow, Red),
            (Phase::NsRed, Red, Red),
            (Phase::EwGreen, Red, Green),
            (Phase::EwYellow, Red, Yellow),
            (Phase::EwRed, Red, Red),
        ];
        for (phase, ns, ew) in expected {
            assert_eq!(phase.signal_state(), SignalState { ns, ew }, "{}", phase);
        }
    }

    #[test]
    fn next_follows_cycle_order_and_wraps() {
        for (idx, phase) in Phase::CYCLE.iter().enumerate() {
            assert_eq!(phase.next(), Phase::CYCLE[(idx + 1) % Phase::CYCLE.len()]);
        }
    }

    #[test]
    fn phase_parses_labels_and_wire_names() {
        assert_eq!("NS Green".parse::<Phase>(), Ok(Phase::NsGreen));
        assert_eq!("ew_red".parse::<Phase>(), Ok(Phase::EwRed));
        assert_eq!(" EW Yellow ".parse::<Phase>(), Ok(Phase::EwYellow));
        assert!("Blue".parse::<Phase>().is_err());
        for phase in Phase::CYCLE {
            assert_eq!(phase.to_string().parse::<Phase>(), Ok(phase));
        }
    }

    #[test]
    fn phase_serializes_in_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::NsYellow).unwrap(), "\"NS_YELLOW\"");
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(CongestionStatus::from_density(70.0), CongestionStatus::Medium);
        assert_eq!(CongestionStatus::from_density(70.1), CongestionStatus::High);
        assert_eq!(CongestionStatus::from_density(40.0), CongestionStatus::Low);
        assert_eq!(CongestionStatus::from_density(40.5), CongestionStatus::Medium);
    }

    #[test]
    fn seeded_junctions_derive_lights_from_phase() {
        let store = JunctionStore::new(create_junctions());
        assert_eq!(store.len(), 3);
        let ecr = store.get(&JunctionId::from("ecr-mahabalipuram")).unwrap();
        assert_eq!(ecr.signal_state, SignalState::ALL_RED);
        assert!(ecr.accident_present);
        let omr = store.get(&JunctionId::from("omr-sholinganallur")).unwrap();
        assert_eq!(omr.status, CongestionStatus::High);
        assert!(omr.emergency_vehicle_present);
    }

    #[test]
    fn new_takes_metrics_and_coordinates() {
        let junction = Junction::new(
            "adyar-signal",
            "Adyar Signal",
            TrafficMetrics::new(45.0, 6, 30.0),
            Phase::EwYellow,
            4,
            Coordinates::new(13.0067, 80.2573),
        );
        assert_eq!(junction.id, JunctionId::from("adyar-signal"));
        assert_eq!((junction.density, junction.queue_length, junction.wait_time), (45.0, 6, 30.0));
        assert_eq!(junction.status, CongestionStatus::Medium);
        assert_eq!(junction.coordinates, Coordinates::new(13.0067, 80.2573));
        assert_eq!(junction.signal_state, Phase::EwYellow.signal_state());
    }

    #[test]
    fn store_drops_duplicate_ids() {
        let mut junctions = create_junctions();
        junctions.push(junctions[0].clone());
        let store = JunctionStore::new(junctions);
        assert_eq!(store.len(), 3);
        assert_eq!(store.first_id(), Some(&JunctionId::from("anna-salai-mount")));
    }
}
