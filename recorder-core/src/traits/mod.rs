pub mod clock;
pub mod dma_engine;
pub mod event_sink;
pub mod storage_medium;
