// store

mod expiring_store;

pub use expiring_store::*;

// repo

mod account_repo;
mod rbac_repo;

pub use account_repo::*;
pub use rbac_repo::*;
