//! User entity - an account that participates in conversations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            is_online: false,
            last_seen_at: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the user online, stamping `last_seen_at`
    pub fn mark_online(&mut self, at: DateTime<Utc>) {
        self.is_online = true;
        self.last_seen_at = Some(at);
    }

    /// Mark the user offline, stamping `last_seen_at`
    pub fn mark_offline(&mut self, at: DateTime<Utc>) {
        self.is_online = false;
        self.last_seen_at = Some(at);
    }
}
