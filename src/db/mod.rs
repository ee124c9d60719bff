//! Database access

pub mod pool;
pub mod queries;
pub mod quotes;

pub use pool::{create_pool, run_migrations};
pub use queries::*;
pub use quotes::*;
