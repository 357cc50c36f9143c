//! Upload content decoding
//!
//! Clients send file content either as plain text or base64. There is no
//! flag in the payload, so base64 is detected heuristically.

use std::sync::OnceLock;

use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;

/// Content after decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedContent {
    pub bytes: Vec<u8>,
    pub was_base64: bool,
}

fn base64_alphabet() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("valid base64 pattern"))
}

/// Heuristic base64 detection.
///
/// Syntactically valid base64 is still treated as text when it is short and
/// has no uppercase letters or digits (`test`, `abcdefgh`).
pub fn looks_like_base64(s: &str) -> bool {
    if s.len() < 4 || s.len() % 4 != 0 {
        return false;
    }
    if s.chars().any(char::is_whitespace) || !base64_alphabet().is_match(s) {
        return false;
    }

    let mut upper = 0usize;
    let mut digits = 0usize;
    for c in s.chars().filter(|c| *c != '=') {
        if c.is_ascii_uppercase() {
            upper += 1;
        } else if c.is_ascii_digit() {
            digits += 1;
        }
    }
    if upper == 0 && digits == 0 && s.len() <= 8 {
        return false;
    }

    match STANDARD.decode(s) {
        Ok(bytes) => s.len() <= 12 || bytes.len() >= 4,
        Err(_) => false,
    }
}

/// Decode upload content, passing plain text through unchanged
pub fn decode_content(content: &str) -> DecodedContent {
    if looks_like_base64(content) {
        if let Ok(bytes) = STANDARD.decode(content) {
            return DecodedContent {
                bytes,
                was_base64: true,
            };
        }
    }
    DecodedContent {
        bytes: content.as_bytes().to_vec(),
        was_base64: false,
    }
}
