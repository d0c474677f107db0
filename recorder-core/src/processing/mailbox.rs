use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::buffer::BufferId;

/// A completed buffer as announced by the interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadySlot {
    pub id: BufferId,
    /// Transfer number of this completion, starting at 1.
    pub sequence: u64,
}

/// Single-slot, single-producer/single-consumer hand-off from interrupt
/// context to the main loop.
///
/// The slot is one `AtomicU64`: `0` means empty, otherwise
/// `sequence << 2 | id << 1 | 1`. Posting and taking are each a single swap,
/// so a post that lands between the consumer's check and its read can never
/// tear the payload. Only one outstanding value is ever valid.
#[derive(Debug, Default)]
pub struct ReadyMailbox {
    slot: AtomicU64,
}

impl ReadyMailbox {
    pub const fn new() -> Self {
        Self {
            slot: AtomicU64::new(0),
        }
    }

    /// Publish a completion. Returns the value it displaced, if the consumer
    /// never observed it.
    pub fn post(&self, id: BufferId, sequence: u64) -> Option<ReadySlot> {
        let previous = self.slot.swap(pack(id, sequence), Ordering::AcqRel);
        unpack(previous)
    }

    /// Take the pending value, leaving the slot empty. Never blocks.
    pub fn take(&self) -> Option<ReadySlot> {
        unpack(self.slot.swap(0, Ordering::AcqRel))
    }

    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire) != 0
    }

    pub fn clear(&self) {
        self.slot.store(0, Ordering::Release);
    }
}

fn pack(id: BufferId, sequence: u64) -> u64 {
    ((sequence & (u64::MAX >> 2)) << 2) | ((id.index() as u64) << 1) | 1
}

fn unpack(raw: u64) -> Option<ReadySlot> {
    if raw == 0 {
        return None;
    }
    let id = if raw & 0b10 == 0 { BufferId::A } else { BufferId::B };
    Some(ReadySlot {
        id,
        sequence: raw >> 2,
    })
}
