use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::capture::buffer_pool::{BufferPool, BufferView};
use crate::models::buffer::{BufferId, BufferState, Sample};
use crate::models::error::TransferError;
use crate::processing::mailbox::{ReadyMailbox, ReadySlot};
use crate::traits::event_sink::{CaptureEvent, CaptureEventSink};

/// State shared between the DMA interrupt handler and the main loop.
///
/// The interrupt side records the completion, toggles the fill index and
/// posts to the mailbox; nothing more. The main loop only learns about
/// completions through [`take_completed`](Self::take_completed) or
/// [`process_completed_buffer`](Self::process_completed_buffer), each of
/// which clears the ready slot so every completion is observed once.
pub struct DmaChannel<const N: usize> {
    pool: BufferPool<N>,
    mailbox: ReadyMailbox,
    active: AtomicBool,
    /// Buffer the engine is filling right now.
    current: AtomicU8,
    transfer_count: AtomicU64,
    overrun_count: AtomicU64,
    sink: Mutex<Option<Arc<dyn CaptureEventSink>>>,
}

impl<const N: usize> DmaChannel<N> {
    pub fn new() -> Self {
        Self {
            pool: BufferPool::new(),
            mailbox: ReadyMailbox::new(),
            active: AtomicBool::new(false),
            current: AtomicU8::new(BufferId::A.index() as u8),
            transfer_count: AtomicU64::new(0),
            overrun_count: AtomicU64::new(0),
            sink: Mutex::new(None),
        }
    }

    // --- Interrupt context ---

    /// Block-complete interrupt: the engine finished the current buffer and
    /// has already moved on to the other one.
    pub fn on_transfer_complete(&self) {
        if !self.active.load(Ordering::Acquire) {
            log::debug!("completion after stop ignored");
            return;
        }

        let completed = decode_id(self.current.load(Ordering::Acquire));
        let next = completed.other();
        self.current.store(next.index() as u8, Ordering::Release);
        let sequence = self.transfer_count.fetch_add(1, Ordering::AcqRel) + 1;

        // The engine now owns `next` again, whatever the consumer thinks.
        let reclaimed = self.pool.swap_state(next, BufferState::Filling);
        self.pool.set_state(completed, BufferState::Ready);
        if let Some(stale) = self.mailbox.post(completed, sequence) {
            log::debug!("completion #{} of buffer {} never observed", stale.sequence, stale.id);
        }

        self.emit(&CaptureEvent::BufferComplete {
            id: completed,
            sequence,
        });

        if reclaimed != BufferState::Filling {
            self.overrun_count.fetch_add(1, Ordering::AcqRel);
            self.emit(&CaptureEvent::Error(TransferError::Overrun { buffer: next }));
        }
    }

    /// Transfer-error interrupt. Capture stays active; the caller decides
    /// whether to stop.
    pub fn on_transfer_error(&self) {
        self.emit(&CaptureEvent::Error(TransferError::Hardware));
    }

    /// Deposit samples into `id`. Used by the engine side only.
    pub fn fill<R>(&self, id: BufferId, f: impl FnOnce(&mut [Sample]) -> R) -> R {
        let mut samples = self.pool.lock(id);
        f(&mut samples[..])
    }

    // --- Main-loop context ---

    /// Take the most recent completed buffer, if any. The returned lease
    /// holds the buffer out of the engine's loop until it is dropped.
    pub fn take_completed(&self) -> Option<BufferLease<'_, N>> {
        let slot = self.mailbox.take()?;
        if !self.pool.transition(slot.id, BufferState::Ready, BufferState::Consumed) {
            log::warn!("buffer {} reclaimed by DMA before it was taken", slot.id);
            return None;
        }
        Some(BufferLease { channel: self, slot })
    }

    /// Returns true exactly once per completed transfer.
    pub fn process_completed_buffer(&self) -> bool {
        self.take_completed().is_some()
    }

    /// Direct access to a buffer's samples. Only read the buffer named by
    /// the last completion; the other one belongs to the engine.
    pub fn buffer(&self, id: BufferId) -> BufferView<'_, N> {
        self.pool.lock(id)
    }

    pub fn buffer_state(&self, id: BufferId) -> BufferState {
        self.pool.state(id)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Buffer the engine is currently filling.
    pub fn current_buffer(&self) -> BufferId {
        decode_id(self.current.load(Ordering::Acquire))
    }

    pub fn transfer_count(&self) -> u64 {
        self.transfer_count.load(Ordering::Acquire)
    }

    pub fn overrun_count(&self) -> u64 {
        self.overrun_count.load(Ordering::Acquire)
    }

    pub fn has_pending(&self) -> bool {
        self.mailbox.is_pending()
    }

    // --- Manager-only control ---

    pub(crate) fn set_sink(&self, sink: Option<Arc<dyn CaptureEventSink>>) {
        *self.sink.lock() = sink;
    }

    /// Hand both buffers back to the engine and drop any completion left
    /// over from before a stop, so the first wrap is not taken for an overrun.
    pub(crate) fn activate(&self, first: BufferId) {
        if let Some(stale) = self.mailbox.take() {
            log::debug!("discarding completion #{} of buffer {} from before restart", stale.sequence, stale.id);
        }
        for id in [BufferId::A, BufferId::B] {
            self.pool.set_state(id, BufferState::Filling);
        }
        self.current.store(first.index() as u8, Ordering::Release);
        self.active.store(true, Ordering::Release);
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Back to the post-initialize state. Counters restart from zero.
    pub(crate) fn reset(&self) {
        self.active.store(false, Ordering::Release);
        self.mailbox.clear();
        self.pool.reset();
        self.current.store(BufferId::A.index() as u8, Ordering::Release);
        self.transfer_count.store(0, Ordering::Release);
        self.overrun_count.store(0, Ordering::Release);
    }

    fn emit(&self, event: &CaptureEvent) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink.on_event(event);
        }
    }
}

impl<const N: usize> Default for DmaChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_id(raw: u8) -> BufferId {
    if raw == 0 {
        BufferId::A
    } else {
        BufferId::B
    }
}

/// A completed buffer on loan to the main loop.
///
/// Dropping the lease hands the buffer back to the engine. If the engine
/// wrapped onto it first, the lease is no longer intact and its contents
/// may be a mix of two fills.
pub struct BufferLease<'a, const N: usize> {
    channel: &'a DmaChannel<N>,
    slot: ReadySlot,
}

impl<'a, const N: usize> BufferLease<'a, N> {
    pub fn id(&self) -> BufferId {
        self.slot.id
    }

    pub fn sequence(&self) -> u64 {
        self.slot.sequence
    }

    pub fn samples(&self) -> BufferView<'a, N> {
        self.channel.pool.lock(self.slot.id)
    }

    /// False once the engine has reclaimed the buffer under this lease.
    pub fn is_intact(&self) -> bool {
        self.channel.pool.state(self.slot.id) == BufferState::Consumed
    }
}

impl<const N: usize> Drop for BufferLease<'_, N> {
    fn drop(&mut self) {
        self.channel
            .pool
            .transition(self.slot.id, BufferState::Consumed, BufferState::Filling);
    }
}
