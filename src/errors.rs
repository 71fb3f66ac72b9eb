use thiserror::Error;

/// Failures surfaced by the dashboard core and its telemetry client.
///
/// None of these are fatal: the scheduler logs them and carries on.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Unknown junction or incident id. The operation is aborted and nothing changes.
    #[error("unknown {kind} '{id}'")]
    InvalidReference { kind: &'static str, id: String },

    /// The operation is not allowed in the current state and was treated as a no-op.
    #[error("{0}")]
    PreconditionViolation(String),

    /// A poll of the external backend failed to connect, returned an error status or bad JSON.
    #[error("fetch of {endpoint} failed: {source}")]
    ExternalFetchFailure {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn unknown_junction(id: impl Into<String>) -> Self {
        Self::InvalidReference {
            kind: "junction",
            id: id.into(),
        }
    }

    pub fn unknown_incident(id: u64) -> Self {
        Self::InvalidReference {
            kind: "incident",
            id: id.to_string(),
        }
    }

    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, Self::InvalidReference { .. })
    }

    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::PreconditionViolation(_))
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
