//! VU1 change records.
//!
//! Each change is one ring record of [`RECORD_WORDS`] words: `[tag, a, b, c]`. Unused words are
//! zero on encode and ignored on decode.

use thiserror::Error;

use crate::ring::{Record, RECORD_WORDS};

/// Why a microprogram halted without reaching its end bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// D-bit (debug break) stop.
    DBit,
    /// T-bit (trace) stop.
    TBit,
}

impl StopReason {
    fn to_u32(self) -> u32 {
        match self {
            StopReason::DBit => 1,
            StopReason::TBit => 2,
        }
    }

    fn from_u32(v: u32) -> Result<Self, DecodeError> {
        match v {
            1 => Ok(StopReason::DBit),
            2 => Ok(StopReason::TBit),
            other => Err(DecodeError::InvalidStopReason(other)),
        }
    }
}

/// State change published by the thread that owns VU1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vu1Change {
    /// VU1's timeline advanced; it is still running.
    Progress { cycle: u32, next_block_cycles: u32 },
    /// The microprogram reached its end bit.
    Finished { cycle: u32 },
    /// The microprogram halted on a stop bit.
    Stopped { cycle: u32, reason: StopReason },
}

impl Vu1Change {
    /// VU1 cycle the change was published at.
    pub fn cycle(&self) -> u32 {
        match *self {
            Vu1Change::Progress { cycle, .. }
            | Vu1Change::Finished { cycle }
            | Vu1Change::Stopped { cycle, .. } => cycle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown change tag {0:#x}")]
    UnknownTag(u32),
    #[error("invalid stop reason {0}")]
    InvalidStopReason(u32),
}

const TAG_PROGRESS: u32 = 1;
const TAG_FINISHED: u32 = 2;
const TAG_STOPPED: u32 = 3;

pub fn encode_change(change: &Vu1Change) -> Record {
    let mut rec = [0u32; RECORD_WORDS];
    match *change {
        Vu1Change::Progress {
            cycle,
            next_block_cycles,
        } => {
            rec[0] = TAG_PROGRESS;
            rec[1] = cycle;
            rec[2] = next_block_cycles;
        }
        Vu1Change::Finished { cycle } => {
            rec[0] = TAG_FINISHED;
            rec[1] = cycle;
        }
        Vu1Change::Stopped { cycle, reason } => {
            rec[0] = TAG_STOPPED;
            rec[1] = cycle;
            rec[2] = reason.to_u32();
        }
    }
    rec
}

pub fn decode_change(rec: &Record) -> Result<Vu1Change, DecodeError> {
    Ok(match rec[0] {
        TAG_PROGRESS => Vu1Change::Progress {
            cycle: rec[1],
            next_block_cycles: rec[2],
        },
        TAG_FINISHED => Vu1Change::Finished { cycle: rec[1] },
        TAG_STOPPED => Vu1Change::Stopped {
            cycle: rec[1],
            reason: StopReason::from_u32(rec[2])?,
        },
        tag => return Err(DecodeError::UnknownTag(tag)),
    })
}
