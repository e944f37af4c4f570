//! Pub/Sub - logical channel naming and the event publisher

mod channels;
mod publisher;

pub use channels::{
    Channel, CONVERSATION_CHANNEL_PREFIX, CONVERSATION_PRESENCE_PREFIX, GLOBAL_PRESENCE_CHANNEL,
    USER_CHANNEL_PREFIX,
};
pub use publisher::RedisPublisher;
