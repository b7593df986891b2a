pub mod pool;
pub mod usage;

pub use pool::create_pool;
pub use usage::*;
