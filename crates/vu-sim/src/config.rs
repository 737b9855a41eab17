use serde::{Deserialize, Serialize};
use vu_core::{ConfigError, SchedulerConfig};
use vu_ipc::MAX_RECORDS;

/// A scripted microprogram: when to start it and what its blocks cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Primary cycle at (or after) which the program is started.
    pub start_cycle: u32,
    pub blocks: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub scheduler: SchedulerConfig,
    /// Run VU1 on its own worker thread.
    pub offload_vu1: bool,
    /// Number of primary-loop polls.
    pub steps: u64,
    /// Longest primary slice between polls. Slices are cut short when the event timer is due
    /// sooner.
    pub cycles_per_step: u32,
    /// Cycles the VU1 worker runs per slice before publishing progress.
    pub worker_quantum: u32,
    /// Capacity of the worker's change ring.
    pub offload_ring_capacity: usize,
    /// Issue a VU0 cross-kick every N polls, as after a macro-mode operand transfer.
    pub cross_kick_every: Option<u64>,
    pub vu0: Option<ProgramConfig>,
    pub vu1: Option<ProgramConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            offload_vu1: false,
            steps: 2_000,
            cycles_per_step: 32,
            worker_quantum: 64,
            offload_ring_capacity: 256,
            cross_kick_every: None,
            vu0: Some(ProgramConfig {
                start_cycle: 0,
                blocks: [12, 20, 8, 40].repeat(64),
            }),
            vu1: Some(ProgramConfig {
                start_cycle: 256,
                blocks: [48, 16, 96, 24, 32].repeat(64),
            }),
        }
    }
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps == 0 {
            return Err(ConfigError::Invalid("steps must be non-zero".into()));
        }
        if self.cycles_per_step == 0 {
            return Err(ConfigError::Invalid("cycles_per_step must be non-zero".into()));
        }
        if self.offload_vu1 && self.worker_quantum == 0 {
            return Err(ConfigError::Invalid(
                "worker_quantum must be non-zero when VU1 is offloaded".into(),
            ));
        }
        if self.offload_vu1 && self.offload_ring_capacity == 0 {
            return Err(ConfigError::Invalid(
                "offload_ring_capacity must be non-zero".into(),
            ));
        }
        if self.offload_vu1 && self.offload_ring_capacity > MAX_RECORDS {
            return Err(ConfigError::Invalid(format!(
                "offload_ring_capacity must be at most {MAX_RECORDS}"
            )));
        }
        if self.cross_kick_every == Some(0) {
            return Err(ConfigError::Invalid("cross_kick_every must be non-zero".into()));
        }
        for (name, program) in [("vu0", &self.vu0), ("vu1", &self.vu1)] {
            if matches!(program, Some(p) if p.blocks.is_empty()) {
                return Err(ConfigError::Invalid(format!("{name} program has no blocks")));
            }
        }
        Ok(())
    }
}
