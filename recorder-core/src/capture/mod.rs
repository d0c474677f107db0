pub mod buffer_pool;
pub mod channel;
pub mod manager;
