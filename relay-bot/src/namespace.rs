//! Per-(viewer, topic) namespace tokens for callback data.
//!
//! Buttons rendered for one viewer's paging session must not collide with
//! buttons of another session, so every callback payload is prefixed with a
//! short fingerprint of (viewer id, topic name). The token is not a security
//! boundary: a collision only routes a press to another session of the same
//! dispatcher, and the payload still carries the target page.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Bytes of digest kept; 8 bytes encode to an 11-char token, leaving room in
/// Telegram's 64-byte callback-data limit for the tag and page number.
const TOKEN_DIGEST_LEN: usize = 8;

/// Derives the deterministic namespace token for a (viewer, subject) pair.
/// Equal inputs always produce equal tokens, so re-rendering a keyboard keeps
/// its buttons routable to the same session.
pub fn derive_namespace(viewer_tg_id: i64, subject: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(viewer_tg_id.to_be_bytes());
    hasher.update(subject.as_bytes());
    let digest = hasher.finalize();

    URL_SAFE_NO_PAD.encode(&digest[..TOKEN_DIGEST_LEN])
}
