use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::control_system::signal_phase_engine::PhaseTimings;
use crate::errors::{DashboardError, DashboardResult};
use crate::global_variables::{
    CAMERA_POLL_EVERY_TICKS, DEFAULT_BASE_URL, DEFAULT_TICK_MILLIS, MAX_PERIOD,
    PERTURBATION_EVERY_TICKS, TRAFFIC_POLL_EVERY_TICKS,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the telemetry backend.
    pub base_url: String,
    /// Length of one signal tick.
    pub tick_millis: u64,
    pub perturbation_every_ticks: u64,
    pub traffic_poll_every_ticks: u64,
    pub camera_poll_every_ticks: u64,
    /// Print a snapshot every N ticks; 0 turns the console renderer off.
    pub render_every_ticks: u64,
    pub http_timeout_millis: u64,
    pub timings: PhaseTimings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tick_millis: DEFAULT_TICK_MILLIS,
            perturbation_every_ticks: PERTURBATION_EVERY_TICKS,
            traffic_poll_every_ticks: TRAFFIC_POLL_EVERY_TICKS,
            camera_poll_every_ticks: CAMERA_POLL_EVERY_TICKS,
            render_every_ticks: 5,
            http_timeout_millis: 1500,
            timings: PhaseTimings::default(),
        }
    }
}

impl DashboardConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn traffic_poll_period(&self) -> DashboardResult<Duration> {
        self.period_of("traffic_poll_every_ticks", self.traffic_poll_every_ticks)
    }

    pub fn camera_poll_period(&self) -> DashboardResult<Duration> {
        self.period_of("camera_poll_every_ticks", self.camera_poll_every_ticks)
    }

    // `ticks` tick lengths, as long as the result is non-zero and at most MAX_PERIOD.
    fn period_of(&self, name: &str, ticks: u64) -> DashboardResult<Duration> {
        u32::try_from(ticks)
            .ok()
            .and_then(|n| self.tick().checked_mul(n))
            .filter(|period| !period.is_zero() && *period <= MAX_PERIOD)
            .ok_or_else(|| {
                DashboardError::Config(format!(
                    "{name} = {ticks} at {}ms per tick is outside 1ms..={}s",
                    self.tick_millis,
                    MAX_PERIOD.as_secs()
                ))
            })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_millis)
    }

    pub fn from_toml_str(raw: &str) -> DashboardResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| DashboardError::Config(e.to_string()))?;
        config.validate()
    }

    /// Checks every period the scheduler derives from this config.
    pub fn validate(self) -> DashboardResult<Self> {
        if self.tick_millis == 0 {
            return Err(DashboardError::Config("tick_millis must be positive".into()));
        }
        if self.tick() > MAX_PERIOD {
            return Err(DashboardError::Config(format!(
                "tick_millis must be at most {}",
                MAX_PERIOD.as_millis()
            )));
        }
        if self.perturbation_every_ticks == 0 {
            return Err(DashboardError::Config(
                "perturbation_every_ticks must be positive".into(),
            ));
        }
        self.traffic_poll_period()?;
        self.camera_poll_period()?;
        Ok(self)
    }

    /// Applies `DASHBOARD_BASE_URL` and `DASHBOARD_TICK_MILLIS` on top of the current values.
    pub fn apply_env(mut self) -> DashboardResult<Self> {
        if let Ok(v) = std::env::var("DASHBOARD_BASE_URL") {
            self.base_url = v;
        }
        if let Ok(v) = std::env::var("DASHBOARD_TICK_MILLIS") {
            self.tick_millis = v
                .parse()
                .map_err(|_| DashboardError::Config(format!("DASHBOARD_TICK_MILLIS='{v}'")))?;
        }
        self.validate()
    }
}

/// Command-line values that win over the file and the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub tick_millis: Option<u64>,
    pub render_every_ticks: Option<u64>,
}

impl DashboardConfig {
    /// Applies command-line overrides and validates the result like any other source.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> DashboardResult<Self> {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(tick_millis) = overrides.tick_millis {
            self.tick_millis = tick_millis;
        }
        if let Some(render_every_ticks) = overrides.render_every_ticks {
            self.render_every_ticks = render_every_ticks;
        }
        self.validate()
    }
}

/// Reads the config file if present, falling back to defaults, then applies the environment.
pub fn load_config(path: &Path) -> DashboardResult<DashboardConfig> {
    let config = match fs::read_to_string(path) {
        Ok(raw) => DashboardConfig::from_toml_str(&raw)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No config at {}, using defaults", path.display());
            DashboardConfig::default()
        }
        Err(e) => {
            return Err(DashboardError::Config(format!(
                "{}: {}",
                path.display(),
                e
            )))
        }
    };
    config.apply_env()
}
