#![forbid(unsafe_code)]

// Native-only CLI; the wasm32 stub keeps `--workspace` builds for wasm targets compiling.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use vu_sim::{run_session, SessionConfig, SessionReport};

    #[derive(Debug, Parser)]
    #[command(about = "Drive scripted vector-unit microprograms through the block scheduler")]
    pub struct Args {
        /// JSON session config. Defaults to a built-in two-unit workload.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable kickstart scheduling (overrides the config file).
        #[arg(long)]
        kickstart: bool,

        /// Run VU1 on a worker thread (overrides the config file).
        #[arg(long)]
        offload_vu1: bool,

        /// Number of primary-loop polls.
        #[arg(long)]
        steps: Option<u64>,

        /// Longest primary slice between polls, in cycles.
        #[arg(long)]
        cycles_per_step: Option<u32>,

        /// Print the session report as JSON.
        #[arg(long)]
        json: bool,
    }

    fn load_config(args: &Args) -> Result<SessionConfig> {
        let mut config = match &args.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read config {}", path.display()))?;
                SessionConfig::from_json(&text)
                    .with_context(|| format!("parse config {}", path.display()))?
            }
            None => SessionConfig::default(),
        };
        if args.kickstart {
            config.scheduler.kickstart = true;
        }
        if args.offload_vu1 {
            config.offload_vu1 = true;
        }
        if let Some(steps) = args.steps {
            config.steps = steps;
        }
        if let Some(cycles) = args.cycles_per_step {
            config.cycles_per_step = cycles;
        }
        config.validate().context("invalid session config")?;
        Ok(config)
    }

    fn print_summary(report: &SessionReport) {
        let stats = &report.scheduler;
        println!("final cycle:      {}", report.final_cycle);
        println!("polls:            {}", report.polls);
        println!("timer events:     {}", report.timer_events);
        println!("VPU_STAT:         {:#06x}", report.vpu_stat);
        for (name, unit) in [("VU0", &report.vu0), ("VU1", &report.vu1)] {
            println!(
                "{name}: started={} running={} last_sync={} next_block={}",
                unit.started, unit.running, unit.last_sync_cycle, unit.next_block_cycles
            );
        }
        println!(
            "executions={} cycles_granted={} kickstarts={} cross_kicks={} timer_arms={} \
             offload_changes={} idle_ticks={}",
            stats.executions,
            stats.cycles_granted,
            stats.kickstarts,
            stats.cross_kicks,
            stats.timer_arms,
            stats.offload_changes,
            stats.idle_ticks
        );
        if let Some(worker) = &report.worker {
            println!(
                "VU1 worker: blocks={} changes={} final_cycle={}",
                worker.blocks_executed, worker.changes_published, worker.final_cycle
            );
        }
    }

    pub fn main() -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();

        let args = Args::parse();
        let config = load_config(&args)?;
        tracing::info!(
            kickstart = config.scheduler.kickstart,
            offload_vu1 = config.offload_vu1,
            steps = config.steps,
            "starting session"
        );
        let report = run_session(&config)?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_summary(&report);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}
