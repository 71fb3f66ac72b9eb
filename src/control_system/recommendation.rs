use serde::{Deserialize, Serialize};

use crate::errors::{DashboardError, DashboardResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Pending,
    Accepted,
    Declined,
}

/// A suggested signal adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub suggestion: String,
    /// Confidence in percent, 0 to 100.
    pub confidence: u8,
    pub reason: String,
    pub decision: Decision,
}

/// Holds one recommendation until the operator accepts or declines it.
/// Both outcomes are terminal; a new suggestion needs a new controller.
#[derive(Debug, Clone)]
pub struct RecommendationController {
    recommendation: Recommendation,
}

impl RecommendationController {
    pub fn new(suggestion: impl Into<String>, confidence: u8, reason: impl Into<String>) -> Self {
        Self {
            recommendation: Recommendation {
                suggestion: suggestion.into(),
                confidence: confidence.min(100),
                reason: reason.into(),
                decision: Decision::Pending,
            },
        }
    }

    pub fn recommendation(&self) -> &Recommendation {
        &self.recommendation
    }

    pub fn decision(&self) -> Decision {
        self.recommendation.decision
    }

    pub fn accept(&mut self) -> DashboardResult<()> {
        self.decide(Decision::Accepted)
    }

    pub fn decline(&mut self) -> DashboardResult<()> {
        self.decide(Decision::Declined)
    }

    fn decide(&mut self, decision: Decision) -> DashboardResult<()> {
        if self.recommendation.decision != Decision::Pending {
            return Err(DashboardError::PreconditionViolation(format!(
                "recommendation already {:?}",
                self.recommendation.decision
            )));
        }
        self.recommendation.decision = decision;
        log::info!(
            "Recommendation '{}' {:?}",
            self.recommendation.suggestion,
            decision
        );
        Ok(())
    }
}

/// The suggestion shown when the dashboard starts.
pub fn default_recommendation() -> RecommendationController {
    RecommendationController::new(
        "Extend NS green phase by 15s to clear queue",
        93,
        "High density detected, queue length increasing",
    )
}
