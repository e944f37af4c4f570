//! Call signaling helpers

mod sdp;

pub use sdp::validate_session_description;
