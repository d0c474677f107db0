use std::sync::Arc;

use crate::capture::buffer_pool::BufferView;
use crate::capture::channel::{BufferLease, DmaChannel};
use crate::models::buffer::{BufferId, BUFFER_SAMPLES};
use crate::models::error::{InitError, StartError};
use crate::models::state::CaptureState;
use crate::traits::dma_engine::{DescriptorChain, DmaEngine};
use crate::traits::event_sink::CaptureEventSink;

/// Ping-pong capture manager.
///
/// Owns the DMA engine and the interrupt-visible [`DmaChannel`]. The engine
/// is configured once with two chained descriptors (A → B → A) and then runs
/// without any per-buffer reconfiguration.
///
/// One instance exists per audio peripheral; it is created once and passed
/// by reference to everything that drives it.
pub struct CaptureManager<E, const N: usize = BUFFER_SAMPLES> {
    engine: E,
    channel: Arc<DmaChannel<N>>,
    chain: DescriptorChain,
    state: CaptureState,
}

impl<E: DmaEngine<N>, const N: usize> CaptureManager<E, N> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            channel: Arc::new(DmaChannel::new()),
            chain: DescriptorChain::ping_pong(N),
            state: CaptureState::Uninitialized,
        }
    }

    /// Open the peripheral and load the descriptor chain.
    ///
    /// Re-initializing an idle manager starts over: counters reset and both
    /// buffers return to the engine.
    pub fn initialize(&mut self) -> Result<(), InitError> {
        if self.state.is_active() {
            return Err(InitError::Active);
        }

        self.engine.open()?;
        self.channel.reset();
        self.engine.configure(&self.chain, Arc::clone(&self.channel))?;

        self.state = CaptureState::Initialized;
        log::info!("ping-pong capture initialized: 2 x {} samples", N);
        Ok(())
    }

    /// Arm the engine on descriptor A. A no-op while already active.
    pub fn start(&mut self) -> Result<(), StartError> {
        match self.state {
            CaptureState::Uninitialized => return Err(StartError::NotInitialized),
            CaptureState::Active => return Ok(()),
            CaptureState::Initialized | CaptureState::Stopped => {}
        }

        // Accept completions before the first one can possibly fire.
        self.channel.activate(BufferId::A);
        if let Err(e) = self.engine.arm(BufferId::A) {
            self.channel.deactivate();
            log::error!("failed to start capture: {}", e);
            return Err(e);
        }

        self.state = CaptureState::Active;
        log::info!("ping-pong capture started");
        Ok(())
    }

    /// Disable the engine immediately. The buffer being filled is abandoned;
    /// a completed buffer still waiting in the mailbox stays available until
    /// the next `start`.
    pub fn stop(&mut self) {
        if !self.state.is_active() {
            return;
        }

        self.engine.disable();
        self.channel.deactivate();
        self.state = CaptureState::Stopped;
        log::info!(
            "ping-pong capture stopped after {} transfers",
            self.channel.transfer_count()
        );
    }

    /// Register the event sink. Replaces any previous one.
    pub fn callback_register(&self, sink: Arc<dyn CaptureEventSink>) {
        self.channel.set_sink(Some(sink));
    }

    pub fn callback_clear(&self) {
        self.channel.set_sink(None);
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Samples of `id`, or `None` before initialization.
    ///
    /// Only request the buffer named by the last completion.
    pub fn get_buffer(&self, id: BufferId) -> Option<BufferView<'_, N>> {
        if self.state == CaptureState::Uninitialized {
            return None;
        }
        Some(self.channel.buffer(id))
    }

    /// Completed buffer fills since the last `initialize`.
    pub fn get_transfer_count(&self) -> u64 {
        self.channel.transfer_count()
    }

    pub fn process_completed_buffer(&self) -> bool {
        self.channel.process_completed_buffer()
    }

    pub fn take_completed(&self) -> Option<BufferLease<'_, N>> {
        self.channel.take_completed()
    }

    pub fn overrun_count(&self) -> u64 {
        self.channel.overrun_count()
    }

    /// The interrupt-visible half, for wiring into interrupt handlers.
    pub fn channel(&self) -> Arc<DmaChannel<N>> {
        Arc::clone(&self.channel)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
