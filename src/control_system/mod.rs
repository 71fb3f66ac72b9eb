pub mod recommendation;
pub mod signal_phase_engine;

pub use recommendation::{default_recommendation, Decision, Recommendation, RecommendationController};
pub use signal_phase_engine::{PhaseTimings, SignalPhaseEngine};
