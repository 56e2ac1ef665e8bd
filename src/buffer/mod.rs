pub mod batch;

pub use batch::{BATCH_SIZE, Batch, BatchConfig, batch_count, partition};
