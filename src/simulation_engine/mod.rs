pub mod junctions;
pub mod perturbation;

pub use junctions::{
    create_junctions, CongestionStatus, Coordinates, Junction, JunctionId, JunctionStore,
    LightState, Phase, PhaseKind, SignalState, TrafficMetrics,
};
pub use perturbation::{perturb_junction, RandomSource, RngSource};
