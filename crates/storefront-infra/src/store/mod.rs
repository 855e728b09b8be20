//! Key-value stores - in-memory, JSON file, and Redis.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisStore};
