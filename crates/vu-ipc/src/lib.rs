//! Worker → coordinator notification path for an offloaded vector unit.
//!
//! A worker thread that owns VU1 publishes state changes as fixed-size records into a bounded
//! lock-free ring; the coordinator drains them without ever blocking.
//!
//! - [`ring`]: the single-producer/single-consumer record ring.
//! - [`protocol`]: the [`Vu1Change`] record format.

#![forbid(unsafe_code)]

pub mod protocol;
pub mod ring;

mod channel;

pub use channel::{change_channel, ChangePublisher, ChangeReceiver, RecvError};
pub use protocol::{decode_change, encode_change, DecodeError, StopReason, Vu1Change};
pub use ring::{
    record_ring, PopError, PushError, Record, RecordConsumer, RecordProducer, MAX_RECORDS,
    RECORD_WORDS,
};
