//! Call entity - the video-call lifecycle state machine
//!
//! States: `ringing → active → ended`, with alternate terminals
//! `ringing → rejected` and the expiry path to `missed`. Exactly one
//! non-terminal call may exist per conversation at a time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Age after which a non-terminal call is treated as abandoned and purged
/// at the next `initiate` for the same conversation.
pub const CALL_STALE_AFTER: Duration = Duration::minutes(2);

/// Call lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ringing,
    Active,
    Ended,
    Rejected,
    Missed,
}

impl CallStatus {
    /// Check whether this status is terminal
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Rejected | Self::Missed)
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ringing => write!(f, "ringing"),
            Self::Active => write!(f, "active"),
            Self::Ended => write!(f, "ended"),
            Self::Rejected => write!(f, "rejected"),
            Self::Missed => write!(f, "missed"),
        }
    }
}

impl std::str::FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ringing" => Ok(Self::Ringing),
            "active" => Ok(Self::Active),
            "ended" => Ok(Self::Ended),
            "rejected" => Ok(Self::Rejected),
            "missed" => Ok(Self::Missed),
            _ => Err(format!("Invalid call status: {s}")),
        }
    }
}

/// WebRTC signal kind relayed between call participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl SignalKind {
    /// Whether the payload carries a session description that must validate
    #[inline]
    pub fn carries_session_description(&self) -> bool {
        matches!(self, Self::Offer | Self::Answer)
    }
}

/// Call entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Opaque unique token handed to clients
    pub call_id: Uuid,
    pub conversation_id: Uuid,
    pub caller_id: Uuid,
    pub receiver_id: Uuid,
    pub status: CallStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Call {
    /// Create a new ringing call
    pub fn new(conversation_id: Uuid, caller_id: Uuid, receiver_id: Uuid) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            conversation_id,
            caller_id,
            receiver_id,
            status: CallStatus::Ringing,
            started_at: None,
            ended_at: None,
            duration_secs: None,
            created_at: Utc::now(),
        }
    }

    /// Check whether a user is one of the two call parties
    #[inline]
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.caller_id == user_id || self.receiver_id == user_id
    }

    /// The counterpart of `user_id`, if they are a party to the call
    pub fn other_party(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.caller_id {
            Some(self.receiver_id)
        } else if user_id == self.receiver_id {
            Some(self.caller_id)
        } else {
            None
        }
    }

    /// Check whether a non-terminal call is stale at `now`
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && now.signed_duration_since(self.created_at) > CALL_STALE_AFTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(!CallStatus::Ringing.is_terminal());
        assert!(!CallStatus::Active.is_terminal());
        assert!(CallStatus::Ended.is_terminal());
        assert!(CallStatus::Rejected.is_terminal());
        assert!(CallStatus::Missed.is_terminal());
    }

    #[test]
    fn test_other_party() {
        let call = Call::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(call.other_party(call.caller_id), Some(call.receiver_id));
        assert_eq!(call.other_party(call.receiver_id), Some(call.caller_id));
        assert_eq!(call.other_party(Uuid::new_v4()), None);
    }

    #[test]
    fn test_staleness() {
        let mut call = Call::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let now = call.created_at;
        assert!(!call.is_stale(now + Duration::seconds(30)));
        assert!(call.is_stale(now + Duration::minutes(3)));

        call.status = CallStatus::Ended;
        assert!(!call.is_stale(now + Duration::minutes(3)));
    }

    #[test]
    fn test_status_round_trip() {
        for status in ["ringing", "active", "ended", "rejected", "missed"] {
            let parsed: CallStatus = status.parse().unwrap();
            assert_eq!(parsed.to_string(), status);
        }
        assert!("busy".parse::<CallStatus>().is_err());
    }
}
