/// Database model definitions.
pub mod models;
/// Pool persistence backends and the transactional storage contract.
pub mod pool_store;
/// Storage abstraction layer for database operations.
pub mod storage;
