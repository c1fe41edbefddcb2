pub mod batch;
pub mod pool;

pub use batch::drain_batch;
pub use pool::WorkerPool;
