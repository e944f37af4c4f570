//! # parley-cache
//!
//! Redis layer: the process-wide presence cache and the pub/sub transport
//! that carries domain events to realtime subscribers.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Presence**: TTL-backed user presence cache (the `PresenceStore` port)
//! - **Pub/Sub**: logical channel naming plus the `EventTransport` port
//!   implementation publishing domain events

pub mod pool;
pub mod presence;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export presence types
pub use presence::RedisPresenceStore;

// Re-export pubsub types
pub use pubsub::{Channel, RedisPublisher, GLOBAL_PRESENCE_CHANNEL};
