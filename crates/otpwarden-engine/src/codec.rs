//! Base32 (RFC 4648) Secret Codec
//!
//! Decoding is lenient: whitespace is stripped, letters are case-folded and any character that is
//! not part of the 32 symbol alphabet is skipped instead of rejected.  Trailing bits that do not
//! fill a whole byte are discarded.

use rand::RngCore;

/// The RFC 4648 Base32 alphabet, in symbol order
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Length (in bytes) of keys produced by [`generate_secret`]
pub const SECRET_LEN: usize = 20;

/// Returns the 5-bit value of a Base32 symbol, ignoring case
fn symbol_value(c: char) -> Option<u8> {
    match c.to_ascii_uppercase() {
        c @ 'A'..='Z' => Some(c as u8 - b'A'),
        c @ '2'..='7' => Some(c as u8 - b'2' + 26),
        _ => None,
    }
}

/// Decodes a Base32 encoded secret into raw key bytes
///
/// Never fails.  An empty or entirely invalid secret decodes to an empty key, and it is up to the
/// caller to decide whether the resulting key is usable.
///
/// # Arguments
/// * `secret` - Base32 encoded secret, as shown by an authenticator app during enrollment
pub fn decode(secret: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(secret.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    let mut skipped: usize = 0;

    for c in secret.chars().filter(|c| !c.is_whitespace()) {
        let value = match symbol_value(c) {
            Some(value) => value,
            None => {
                // padding is expected in some exports, anything else is worth a warning
                if c != '=' {
                    skipped += 1;
                }
                continue;
            }
        };

        buffer = (buffer << 5) | u32::from(value);
        bits += 5;

        if bits >= 8 {
            bits -= 8;
            key.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "ignored characters outside of the base32 alphabet");
    }

    key
}

/// Encodes raw key bytes as canonical (uppercase, unpadded) Base32
pub fn encode(key: impl AsRef<[u8]>) -> String {
    base32::encode(base32::Alphabet::RFC4648 { padding: false }, key.as_ref())
}

/// Generates a new random secret, returned in canonical Base32
pub fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let mut key = [0u8; SECRET_LEN];
    rng.fill_bytes(&mut key);
    encode(key)
}
