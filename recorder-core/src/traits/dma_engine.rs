use std::sync::Arc;

use crate::capture::channel::DmaChannel;
use crate::models::buffer::BufferId;
use crate::models::error::{InitError, StartError};

/// One linked-list transfer descriptor: fill `target`, then continue with
/// the descriptor for `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferDescriptor {
    pub target: BufferId,
    pub next: BufferId,
    /// Words moved from the peripheral per block.
    pub beats: usize,
}

/// The two descriptors forming the closed ping-pong loop A → B → A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorChain {
    descriptors: [TransferDescriptor; 2],
}

impl DescriptorChain {
    pub fn ping_pong(beats: usize) -> Self {
        Self {
            descriptors: [
                TransferDescriptor {
                    target: BufferId::A,
                    next: BufferId::B,
                    beats,
                },
                TransferDescriptor {
                    target: BufferId::B,
                    next: BufferId::A,
                    beats,
                },
            ],
        }
    }

    /// The descriptor that fills `id`.
    pub fn descriptor(&self, id: BufferId) -> &TransferDescriptor {
        &self.descriptors[id.index()]
    }

    /// The descriptor the engine moves to after finishing `id`.
    pub fn successor(&self, id: BufferId) -> &TransferDescriptor {
        self.descriptor(self.descriptor(id).next)
    }
}

/// DMA engine wired to the audio peripheral's receive register.
///
/// Implemented by the target HAL on hardware and by `SimulatedDma` on a
/// host. Once armed, the engine walks the descriptor chain on its own and
/// reports each finished block through
/// [`DmaChannel::on_transfer_complete`] from interrupt context.
pub trait DmaEngine<const N: usize> {
    /// Open the peripheral handle and claim the channel.
    fn open(&mut self) -> Result<(), InitError>;

    /// Load the descriptor chain. The engine deposits samples and raises
    /// interrupts through `channel`.
    fn configure(&mut self, chain: &DescriptorChain, channel: Arc<DmaChannel<N>>) -> Result<(), InitError>;

    /// Start the linked-list transfer on the descriptor for `first`.
    fn arm(&mut self, first: BufferId) -> Result<(), StartError>;

    /// Disable the channel immediately. The block in progress is abandoned.
    fn disable(&mut self);
}
