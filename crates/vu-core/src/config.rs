use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the unconditional slice run when a microprogram is kickstarted.
pub const KICKSTART_CYCLES: u32 = 16;

/// User-visible scheduling knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Trade block batching for responsiveness.
    ///
    /// When set, a freshly started microprogram immediately runs [`KICKSTART_CYCLES`] cycles and
    /// continuation polls run the unit as soon as it is one cycle behind. When clear, a unit only
    /// runs once a full block's worth of primary cycles has accrued. Some titles need one mode,
    /// some the other.
    pub kickstart: bool,
}

impl SchedulerConfig {
    pub fn with_kickstart(kickstart: bool) -> Self {
        Self { kickstart }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
