//! Presence cache

mod user_presence;

pub use user_presence::{RedisPresenceStore, PRESENCE_TTL_SECS};
