mod error;
#[cfg(test)]
pub(crate) mod fixtures;
mod seed;
mod store;

pub use seed::load_seed;
pub use store::{MemoryPoolStore, PoolData};
