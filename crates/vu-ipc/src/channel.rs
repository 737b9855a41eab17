use thiserror::Error;

use crate::protocol::{decode_change, encode_change, DecodeError, Vu1Change};
use crate::ring::{record_ring, PopError, PushError, RecordConsumer, RecordProducer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecvError {
    #[error("no change pending")]
    Empty,
    #[error("publisher has been dropped")]
    Disconnected,
    #[error("undecodable change record: {0}")]
    Decode(#[from] DecodeError),
}

/// Worker-side half of the VU1 change channel.
#[derive(Debug)]
pub struct ChangePublisher {
    ring: RecordProducer,
}

impl ChangePublisher {
    pub fn try_publish(&mut self, change: &Vu1Change) -> Result<(), PushError> {
        self.ring.try_push(&encode_change(change))
    }

    /// Publish, spinning while the coordinator has not caught up.
    pub fn publish(&mut self, change: &Vu1Change) -> Result<(), PushError> {
        self.ring.push_spinning(&encode_change(change))
    }

    /// Escape hatch for pushing a raw record (used to exercise the decoder).
    pub fn raw_mut(&mut self) -> &mut RecordProducer {
        &mut self.ring
    }
}

/// Coordinator-side half of the VU1 change channel. Never blocks.
#[derive(Debug)]
pub struct ChangeReceiver {
    ring: RecordConsumer,
}

impl ChangeReceiver {
    pub fn try_recv(&mut self) -> Result<Vu1Change, RecvError> {
        match self.ring.try_pop() {
            Ok(rec) => Ok(decode_change(&rec)?),
            Err(PopError::Empty) => Err(RecvError::Empty),
            Err(PopError::Disconnected) => Err(RecvError::Disconnected),
        }
    }

    pub fn pending(&self) -> usize {
        self.ring.len()
    }
}

/// Create a change channel with room for at least `capacity` in-flight changes.
pub fn change_channel(capacity: usize) -> (ChangePublisher, ChangeReceiver) {
    let (tx, rx) = record_ring(capacity);
    (ChangePublisher { ring: tx }, ChangeReceiver { ring: rx })
}
