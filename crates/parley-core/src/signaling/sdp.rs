//! Session description validation for WebRTC offer/answer payloads
//!
//! The payload is relayed verbatim and never stored; validation only keeps
//! obviously broken descriptions from reaching the peer. Required markers:
//! a version line (`v=0`), an origin (`o=`), a session name (`s=`), and at
//! least one media section (`m=`). An answer should declare an active or
//! passive connection role; the ambiguous `actpass` placeholder is logged
//! rather than rejected because clients correct it on their side.

use serde_json::Value;
use tracing::{debug, warn};

use crate::entities::SignalKind;
use crate::error::DomainError;

/// Validate an offer/answer payload of the shape `{"sdp": "...", "type": "..."}`.
///
/// Candidate payloads are opaque and must not be passed here.
pub fn validate_session_description(kind: SignalKind, payload: &Value) -> Result<(), DomainError> {
    let sdp = payload
        .get("sdp")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing or invalid sdp field"))?;

    let declared = payload
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing or invalid type field"))?;
    if declared != "offer" && declared != "answer" {
        return Err(malformed("type must be offer or answer"));
    }

    if !sdp.contains("v=0") {
        return Err(malformed("missing v=0 (version) line"));
    }
    if !sdp.contains("o=") {
        return Err(malformed("missing o= (origin) line"));
    }
    if !sdp.contains("s=") {
        return Err(malformed("missing s= (session name) line"));
    }
    if !sdp.contains("m=") {
        return Err(malformed("missing m= (media) section"));
    }

    if kind == SignalKind::Answer {
        check_answer_setup_role(sdp);
    }

    debug!(kind = ?kind, sdp_len = sdp.len(), "session description validated");
    Ok(())
}

/// An answerer must settle on `active` or `passive`; `actpass` is only valid
/// in offers. Ambiguity is tolerated here and corrected client-side.
fn check_answer_setup_role(sdp: &str) {
    for line in sdp.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(role) = line.strip_prefix("a=setup:") {
            match role {
                "active" | "passive" => return,
                "actpass" => {
                    warn!("answer declares setup:actpass, expected active or passive");
                    return;
                }
                other => {
                    warn!(role = other, "answer declares unknown setup role");
                    return;
                }
            }
        }
    }
}

fn malformed(reason: &str) -> DomainError {
    DomainError::MalformedPayload(format!("invalid session description: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID_SDP: &str = "v=0\r\no=- 46117317 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=setup:active\r\n";

    #[test]
    fn test_valid_offer() {
        let payload = json!({"sdp": VALID_SDP, "type": "offer"});
        assert!(validate_session_description(SignalKind::Offer, &payload).is_ok());
    }

    #[test]
    fn test_missing_sdp_field() {
        let payload = json!({"type": "offer"});
        let err = validate_session_description(SignalKind::Offer, &payload).unwrap_err();
        assert_eq!(err.code(), "MALFORMED_PAYLOAD");
    }

    #[test]
    fn test_missing_media_section() {
        let sdp = "v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\ns=-\r\n";
        let payload = json!({"sdp": sdp, "type": "offer"});
        let err = validate_session_description(SignalKind::Offer, &payload).unwrap_err();
        assert!(err.to_string().contains("m="));
    }

    #[test]
    fn test_bad_type_field() {
        let payload = json!({"sdp": VALID_SDP, "type": "candidate"});
        assert!(validate_session_description(SignalKind::Offer, &payload).is_err());
    }

    #[test]
    fn test_answer_with_actpass_is_tolerated() {
        let sdp = VALID_SDP.replace("a=setup:active", "a=setup:actpass");
        let payload = json!({"sdp": sdp, "type": "answer"});
        // Logged, not rejected
        assert!(validate_session_description(SignalKind::Answer, &payload).is_ok());
    }
}
