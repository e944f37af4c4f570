//! Reaction entity - an emoji reaction on a message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reaction entity
///
/// The (message, user, emoji) triple is unique: a user holds at most one
/// reaction of a given emoji per message, and toggling removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new Reaction
    pub fn new(message_id: Uuid, user_id: Uuid, emoji: String) -> Self {
        Self {
            message_id,
            user_id,
            emoji,
            created_at: Utc::now(),
        }
    }
}

/// Aggregated per-emoji summary for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSummary {
    pub emoji: String,
    pub count: i64,
    pub user_ids: Vec<Uuid>,
}

impl ReactionSummary {
    /// Group raw reactions by emoji into display summaries
    pub fn group(reactions: &[Reaction]) -> Vec<Self> {
        let mut summaries: Vec<Self> = Vec::new();
        for reaction in reactions {
            match summaries.iter_mut().find(|s| s.emoji == reaction.emoji) {
                Some(summary) => {
                    summary.count += 1;
                    summary.user_ids.push(reaction.user_id);
                }
                None => summaries.push(Self {
                    emoji: reaction.emoji.clone(),
                    count: 1,
                    user_ids: vec![reaction.user_id],
                }),
            }
        }
        summaries
    }
}
