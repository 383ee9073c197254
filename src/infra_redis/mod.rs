mod expiring_store_redis;

pub use expiring_store_redis::*;
