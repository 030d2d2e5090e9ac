pub mod chunking;

pub use chunking::{
    chunk_ranges,
    worker_pool,
};
