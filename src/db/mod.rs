pub mod audit;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod queries;
pub(crate) mod rows;
pub mod settings;
pub mod stats;
