//! Synthetic sessions for exercising the vector-unit scheduler end to end.
//!
//! A session drives a primary-processor loop for a fixed number of polls, starts scripted
//! microprograms on either unit at configured cycles, and optionally hands VU1 to a real worker
//! thread that reports back through the offload ring.

#![forbid(unsafe_code)]

mod config;
mod session;
mod worker;

pub use config::{ProgramConfig, SessionConfig};
pub use session::{run_session, SessionError, SessionReport, UnitReport};
pub use worker::{spawn_vu1_worker, Vu1Worker, WorkerSummary};
