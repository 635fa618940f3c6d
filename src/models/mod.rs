//! Data models

pub mod summary;
pub mod transaction;

pub use summary::*;
pub use transaction::*;
