use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::models::buffer::{BufferId, BufferState, Sample};

/// Fill pattern written into buffer A at initialization (`+ index`).
pub const PATTERN_A: Sample = 0xBEEF_0000;
/// Fill pattern written into buffer B at initialization (`+ index`).
pub const PATTERN_B: Sample = 0xCAFE_0000;

/// Read/write access to one buffer's samples.
pub type BufferView<'a, const N: usize> = MutexGuard<'a, [Sample; N]>;

/// The two fixed ping-pong buffers and their ownership phase.
///
/// Storage is sized at compile time and never reallocated. Each buffer sits
/// behind its own lock so the engine and the writer only contend if the
/// hand-off deadline is already blown.
pub struct BufferPool<const N: usize> {
    buffers: [Mutex<[Sample; N]>; 2],
    states: [AtomicU8; 2],
}

impl<const N: usize> BufferPool<N> {
    pub fn new() -> Self {
        let pool = Self {
            buffers: [Mutex::new([0; N]), Mutex::new([0; N])],
            states: [
                AtomicU8::new(BufferState::Filling as u8),
                AtomicU8::new(BufferState::Filling as u8),
            ],
        };
        pool.reset();
        pool
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn lock(&self, id: BufferId) -> BufferView<'_, N> {
        self.buffers[id.index()].lock()
    }

    pub fn state(&self, id: BufferId) -> BufferState {
        BufferState::from_raw(self.states[id.index()].load(Ordering::Acquire))
    }

    pub fn set_state(&self, id: BufferId, state: BufferState) {
        self.states[id.index()].store(state as u8, Ordering::Release);
    }

    /// Set `state`, returning the phase it replaced.
    pub fn swap_state(&self, id: BufferId, state: BufferState) -> BufferState {
        BufferState::from_raw(self.states[id.index()].swap(state as u8, Ordering::AcqRel))
    }

    /// Move `id` from `from` to `to`. Fails if another context moved it first.
    pub fn transition(&self, id: BufferId, from: BufferState, to: BufferState) -> bool {
        self.states[id.index()]
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Return both buffers to the engine and stamp the debug patterns.
    pub fn reset(&self) {
        for (id, pattern) in [(BufferId::A, PATTERN_A), (BufferId::B, PATTERN_B)] {
            let mut samples = self.lock(id);
            for (i, sample) in samples.iter_mut().enumerate() {
                *sample = pattern.wrapping_add(i as Sample);
            }
            self.set_state(id, BufferState::Filling);
        }
    }
}

impl<const N: usize> Default for BufferPool<N> {
    fn default() -> Self {
        Self::new()
    }
}
