//! In-process backends for tests and single-node development.

mod account_repo_memory;
mod expiring_store_memory;
mod rbac_repo_memory;

pub use account_repo_memory::*;
pub use expiring_store_memory::*;
pub use rbac_repo_memory::*;
