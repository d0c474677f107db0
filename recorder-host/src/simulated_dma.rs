//! Simulated DMA engine.
//!
//! Stands in for the I2S receive channel on a host. A dedicated thread walks
//! the descriptor chain, fills each target buffer with a test tone, and
//! raises the block-complete interrupt once per fill time, just as the real
//! controller would without any software reconfiguration between blocks.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use recorder_core::{BufferId, DescriptorChain, DmaChannel, DmaEngine, InitError, Sample, StartError};

/// Stereo 16-bit sine packed into I2S words, left channel in the low half.
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    phase: f32,
    step: f32,
    amplitude: f32,
}

impl ToneGenerator {
    pub fn new(frequency_hz: f32, sample_rate: u32, amplitude: f32) -> Self {
        Self {
            phase: 0.0,
            step: TAU * frequency_hz / sample_rate as f32,
            amplitude: amplitude.clamp(0.0, 1.0),
        }
    }

    pub fn fill(&mut self, samples: &mut [Sample]) {
        for sample in samples.iter_mut() {
            let value = (self.phase.sin() * self.amplitude * i16::MAX as f32) as i16;
            let half = value as u16 as Sample;
            *sample = half | (half << 16);
            self.phase = (self.phase + self.step) % TAU;
        }
    }
}

/// Host DMA engine that produces one block every `fill_time`.
pub struct SimulatedDma<const N: usize> {
    fill_time: Duration,
    tone: ToneGenerator,
    available: bool,
    chain: Option<DescriptorChain>,
    channel: Option<Arc<DmaChannel<N>>>,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<const N: usize> SimulatedDma<N> {
    /// Engine whose block period matches `sample_rate` (one sample per word).
    pub fn new(sample_rate: u32, tone: ToneGenerator) -> Self {
        let fill_time = Duration::from_secs_f64(N as f64 / sample_rate.max(1) as f64);
        Self::with_fill_time(fill_time, tone)
    }

    pub fn with_fill_time(fill_time: Duration, tone: ToneGenerator) -> Self {
        Self {
            fill_time,
            tone,
            available: true,
            chain: None,
            channel: None,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        }
    }

    /// An engine whose peripheral cannot be opened.
    pub fn unavailable() -> Self {
        let mut dma = Self::with_fill_time(Duration::from_millis(1), ToneGenerator::new(440.0, 12_000, 0.0));
        dma.available = false;
        dma
    }

    pub fn fill_time(&self) -> Duration {
        self.fill_time
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl<const N: usize> DmaEngine<N> for SimulatedDma<N> {
    fn open(&mut self) -> Result<(), InitError> {
        if !self.available {
            return Err(InitError::PeripheralUnavailable("simulated i2s disabled".into()));
        }
        if self.fill_time.is_zero() {
            return Err(InitError::Configuration("fill time must be positive".into()));
        }
        Ok(())
    }

    fn configure(&mut self, chain: &DescriptorChain, channel: Arc<DmaChannel<N>>) -> Result<(), InitError> {
        if self.is_running() {
            return Err(InitError::Configuration("engine is running".into()));
        }
        self.chain = Some(*chain);
        self.channel = Some(channel);
        Ok(())
    }

    fn arm(&mut self, first: BufferId) -> Result<(), StartError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(StartError::Arm("simulated DMA already running".into()));
        }
        let (Some(chain), Some(channel)) = (self.chain, self.channel.clone()) else {
            return Err(StartError::Arm("descriptor chain not configured".into()));
        };

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let fill_time = self.fill_time;
        let tone = self.tone.clone();

        let handle = thread::Builder::new()
            .name("dma-sim".into())
            .spawn(move || {
                dma_loop(running, chain, channel, first, fill_time, tone);
            })
            .map_err(|e| StartError::Arm(format!("failed to spawn DMA thread: {}", e)))?;

        *self.capture_handle.lock() = Some(handle);
        Ok(())
    }

    fn disable(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl<const N: usize> Drop for SimulatedDma<N> {
    fn drop(&mut self) {
        self.disable();
    }
}

/// Producer loop. Deadlines are absolute so the block period does not drift
/// with scheduling jitter.
fn dma_loop<const N: usize>(
    running: Arc<AtomicBool>,
    chain: DescriptorChain,
    channel: Arc<DmaChannel<N>>,
    first: BufferId,
    fill_time: Duration,
    mut tone: ToneGenerator,
) {
    let mut target = first;
    let mut deadline = Instant::now() + fill_time;

    while running.load(Ordering::SeqCst) {
        let descriptor = chain.descriptor(target);
        channel.fill(descriptor.target, |samples| {
            let beats = descriptor.beats.min(samples.len());
            tone.fill(&mut samples[..beats]);
        });

        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        deadline += fill_time;

        // Disabled mid-block: the partial buffer is abandoned.
        if !running.load(Ordering::SeqCst) {
            break;
        }
        channel.on_transfer_complete();
        target = descriptor.next;
    }
    log::debug!("simulated DMA loop exited");
}
