//! Fakes for the hardware-facing traits, shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::capture::channel::DmaChannel;
use crate::models::buffer::{BufferId, Sample};
use crate::models::error::{InitError, StartError, StorageError};
use crate::traits::clock::{Clock, TimeOfDay};
use crate::traits::dma_engine::{DescriptorChain, DmaEngine};
use crate::traits::storage_medium::{MediaFile, StorageMedium};

/// DMA engine whose block completions are triggered by the test.
pub struct ManualDma<const N: usize> {
    available: bool,
    arm_fails: bool,
    chain: Option<DescriptorChain>,
    channel: Option<Arc<DmaChannel<N>>>,
    cursor: Mutex<BufferId>,
    armed: bool,
    arm_count: usize,
    disable_count: usize,
}

impl<const N: usize> ManualDma<N> {
    pub fn new() -> Self {
        Self {
            available: true,
            arm_fails: false,
            chain: None,
            channel: None,
            cursor: Mutex::new(BufferId::A),
            armed: false,
            arm_count: 0,
            disable_count: 0,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn failing_arm() -> Self {
        Self {
            arm_fails: true,
            ..Self::new()
        }
    }

    pub fn chain(&self) -> Option<&DescriptorChain> {
        self.chain.as_ref()
    }

    pub fn arm_count(&self) -> usize {
        self.arm_count
    }

    pub fn disable_count(&self) -> usize {
        self.disable_count
    }

    /// Fill the current descriptor's buffer with `value`, follow the chain,
    /// and raise the completion interrupt.
    pub fn complete_next(&self, value: Sample) {
        let (Some(chain), Some(channel)) = (self.chain.as_ref(), self.channel.as_ref()) else {
            return;
        };
        if !self.armed {
            return;
        }

        let target = {
            let mut cursor = self.cursor.lock();
            let target = *cursor;
            *cursor = chain.descriptor(target).next;
            target
        };
        channel.fill(target, |samples| samples.fill(value));
        channel.on_transfer_complete();
    }
}

impl<const N: usize> DmaEngine<N> for ManualDma<N> {
    fn open(&mut self) -> Result<(), InitError> {
        if self.available {
            Ok(())
        } else {
            Err(InitError::PeripheralUnavailable("i2s0".into()))
        }
    }

    fn configure(&mut self, chain: &DescriptorChain, channel: Arc<DmaChannel<N>>) -> Result<(), InitError> {
        self.chain = Some(*chain);
        self.channel = Some(channel);
        Ok(())
    }

    fn arm(&mut self, first: BufferId) -> Result<(), StartError> {
        if self.arm_fails {
            return Err(StartError::Arm("channel busy".into()));
        }
        *self.cursor.lock() = first;
        self.armed = true;
        self.arm_count += 1;
        Ok(())
    }

    fn disable(&mut self) {
        self.armed = false;
        self.disable_count += 1;
    }
}

#[derive(Default)]
struct MemoryState {
    files: HashMap<String, Vec<u8>>,
    closed: HashSet<String>,
    fail_opens: bool,
    short_write_next: bool,
    fail_seek_next: bool,
    fail_sync_next: bool,
    fail_close_next: bool,
    ops: usize,
    syncs: usize,
}

/// In-memory storage medium. Clones share the same contents.
#[derive(Clone, Default)]
pub struct MemoryMedium {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.inner.lock().files.get(name).cloned()
    }

    pub fn is_closed(&self, name: &str) -> bool {
        self.inner.lock().closed.contains(name)
    }

    /// Number of open/seek/write/sync/close calls so far.
    pub fn op_count(&self) -> usize {
        self.inner.lock().ops
    }

    pub fn sync_count(&self) -> usize {
        self.inner.lock().syncs
    }

    pub fn fail_opens(&self) {
        self.inner.lock().fail_opens = true;
    }

    /// The next write stores only half of its data.
    pub fn short_write_next(&self) {
        self.inner.lock().short_write_next = true;
    }

    pub fn fail_seek_next(&self) {
        self.inner.lock().fail_seek_next = true;
    }

    pub fn fail_sync_next(&self) {
        self.inner.lock().fail_sync_next = true;
    }

    pub fn fail_close_next(&self) {
        self.inner.lock().fail_close_next = true;
    }
}

pub struct MemoryFile {
    name: String,
    cursor: usize,
    inner: Arc<Mutex<MemoryState>>,
}

impl StorageMedium for MemoryMedium {
    type File = MemoryFile;

    fn open_write(&mut self, name: &str) -> Result<MemoryFile, StorageError> {
        let mut state = self.inner.lock();
        state.ops += 1;
        if state.fail_opens {
            return Err(StorageError::Open(name.to_string()));
        }
        state.files.insert(name.to_string(), Vec::new());
        state.closed.remove(name);
        Ok(MemoryFile {
            name: name.to_string(),
            cursor: 0,
            inner: Arc::clone(&self.inner),
        })
    }
}

impl MediaFile for MemoryFile {
    fn seek(&mut self, offset: u64) -> Result<(), StorageError> {
        let mut state = self.inner.lock();
        state.ops += 1;
        if std::mem::take(&mut state.fail_seek_next) {
            return Err(StorageError::Seek(format!("{} at {}", self.name, offset)));
        }
        self.cursor = offset as usize;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, StorageError> {
        let mut state = self.inner.lock();
        state.ops += 1;
        let len = if state.short_write_next {
            state.short_write_next = false;
            data.len() / 2
        } else {
            data.len()
        };

        let cursor = self.cursor;
        let file = state.files.entry(self.name.clone()).or_default();
        if file.len() < cursor + len {
            file.resize(cursor + len, 0);
        }
        file[cursor..cursor + len].copy_from_slice(&data[..len]);
        self.cursor += len;
        Ok(len)
    }

    fn sync(&mut self) -> Result<(), StorageError> {
        let mut state = self.inner.lock();
        state.ops += 1;
        if std::mem::take(&mut state.fail_sync_next) {
            return Err(StorageError::Sync(self.name.clone()));
        }
        state.syncs += 1;
        Ok(())
    }

    fn close(self) -> Result<(), StorageError> {
        let mut state = self.inner.lock();
        state.ops += 1;
        if std::mem::take(&mut state.fail_close_next) {
            return Err(StorageError::Close(self.name.clone()));
        }
        state.closed.insert(self.name.clone());
        Ok(())
    }
}

/// Real-time clock stuck at one time of day.
pub struct FixedClock(TimeOfDay);

impl FixedClock {
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self(TimeOfDay::new(hour, minute, second))
    }
}

impl Clock for FixedClock {
    fn time_of_day(&self) -> TimeOfDay {
        self.0
    }
}
