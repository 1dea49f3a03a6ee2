//! One Time Password Support
//!
//! HOTP (RFC 4226) and TOTP (RFC 6238) over HMAC-SHA-1, compatible with the common authenticator
//! apps.

use crate::{
    clock::{Clock, SystemClock},
    codec, Error,
};
use hmac::{Hmac, Mac, NewMac};
use sha1::Sha1;

/// Default time step, in seconds
pub const DEFAULT_STEP: u64 = 30;

/// Default number of digits in a code
pub const DEFAULT_DIGITS: u32 = 6;

/// Largest number of digits a 31-bit truncated value can fill
pub const MAX_DIGITS: u32 = 9;

/// Keys shorter than this (80 bits) are accepted but logged
const SHORT_KEY_LEN: usize = 10;

/// Ensures `digits` is within `1..=MAX_DIGITS`
pub(crate) fn check_digits(digits: u32) -> Result<(), Error> {
    match digits {
        1..=MAX_DIGITS => Ok(()),
        _ => Err(Error::Configuration(format!(
            "digits must be between 1 and {}, got {}",
            MAX_DIGITS, digits
        ))),
    }
}

/// Ensures the time step is non-zero
pub(crate) fn check_step(step: u64) -> Result<(), Error> {
    match step {
        0 => Err(Error::Configuration("time step must be at least one second".into())),
        _ => Ok(()),
    }
}

/// Computes a new Hash-Based One-Time Password (HOTP) from a set of parameters
///
/// # Arguments
/// * `k` - shared secret between client and server; each HOTP generator has a different and unique secret K.
/// * `c` - counter value, the moving factor. This counter MUST be synchronized between the HOTP generator (client) and the HOTP validator (server).
/// * `n` - number of digits in an HOTP value
///
/// # Errors
/// * `Error::Configuration` - if `n` is outside of `1..=9`
/// * `Error::InvalidSecret` - if `k` is empty
pub fn hotp(k: impl AsRef<[u8]>, c: u64, n: u32) -> Result<u32, Error> {
    check_digits(n)?;

    let k = k.as_ref();
    if k.is_empty() {
        return Err(Error::InvalidSecret);
    }

    // 1. generate HMAC-SHA-1(k, c)
    let mut mac = Hmac::<Sha1>::new_from_slice(k).map_err(|_| Error::InvalidSecret)?;
    mac.update(&c.to_be_bytes());
    let mac = mac.finalize().into_bytes();

    // 2. Generate a 4-byte (32-bit) string (Dynamic Truncation)
    // NOTE: indexing here is safe as long as mac is HMAC-SHA-1.  The output is guaranteed to be
    // 20-bytes long and the masking it with 0xf (15) ensures there is enough runway (+3, max of
    // 18) so we don't read past the end of the array.
    let offset: usize = (mac[19] & 0xf).into();
    let bin_code = u32::from_be_bytes([
        mac[offset] & 0x7f,
        mac[offset + 1],
        mac[offset + 2],
        mac[offset + 3],
    ]);

    // 3. Compute an HOTP value (mod N digits)
    Ok(bin_code % 10_u32.pow(n))
}

/// Returns the time counter for a Unix time, `floor(at / step)`
///
/// # Errors
/// * `Error::Configuration` - if `step` is zero
pub fn counter(at: u64, step: u64) -> Result<u64, Error> {
    check_step(step)?;
    Ok(at / step)
}

/// Computes the zero-padded code for a counter value
///
/// # Arguments
/// * `secret` - Base32 encoded shared secret
/// * `counter` - moving factor (time counter for TOTP)
/// * `digits` - number of digits in the code
pub fn generate_counter(secret: &str, counter: u64, digits: u32) -> Result<String, Error> {
    check_digits(digits)?;

    let key = codec::decode(secret);
    if key.is_empty() {
        return Err(Error::InvalidSecret);
    }
    if key.len() < SHORT_KEY_LEN {
        tracing::warn!(len = key.len(), "secret decodes to a short key");
    }

    let code = hotp(&key, counter, digits)?;
    tracing::debug!(counter, digits, "generated one-time code");

    Ok(format!("{:0width$}", code, width = digits as usize))
}

/// Computes a new Time-Based One-Time Password (TOTP) at a given time
///
/// Output is always exactly `digits` characters long, zero-padded on the left.
///
/// # Arguments
/// * `secret` - Base32 encoded shared secret
/// * `at` - Unix time (in seconds) to generate the code for
/// * `step` - represents the time step in seconds
/// * `digits` - number of digits in the code
///
/// # Errors
/// * `Error::Configuration` - `digits` outside of `1..=9` or a zero `step`
/// * `Error::InvalidSecret` - secret decodes to an empty key
pub fn generate(secret: &str, at: u64, step: u64, digits: u32) -> Result<String, Error> {
    check_digits(digits)?;
    let counter = counter(at, step)?;
    generate_counter(secret, counter, digits)
}

/// Computes the TOTP for the current time using the default step and digits
pub fn generate_now(secret: &str) -> Result<String, Error> {
    generate(secret, SystemClock.now(), DEFAULT_STEP, DEFAULT_DIGITS)
}

/// Checks a candidate code against the code for the current time
///
/// Only the current window is accepted; see [`TotpParams`](crate::TotpParams) to tolerate clock
/// drift.
pub fn validate(secret: &str, candidate: &str) -> Result<bool, Error> {
    validate_at(secret, candidate, SystemClock.now())
}

/// Checks a candidate code against the code for a given time
pub fn validate_at(secret: &str, candidate: &str, at: u64) -> Result<bool, Error> {
    let code = generate(secret, at, DEFAULT_STEP, DEFAULT_DIGITS)?;
    Ok(code == candidate)
}

/// Returns the number of seconds until the window containing `at` closes
///
/// The result is always within `1..=step`.
pub fn remaining_seconds(at: u64, step: u64) -> Result<u64, Error> {
    check_step(step)?;
    Ok(step - (at % step))
}

/// Returns the number of seconds left in the current default-sized window
pub fn remaining_now() -> u64 {
    DEFAULT_STEP - (SystemClock.now() % DEFAULT_STEP)
}

/// Returns the default time step, in seconds
pub fn time_step() -> u64 {
    DEFAULT_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "12345678901234567890";

    // base32 of SECRET
    const SECRET_B32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn hotp_count_0() {
        let code = hotp(SECRET, 0, 6).unwrap();
        assert_eq!(code, 755224);
    }

    #[test]
    fn hotp_count_1() {
        let code = hotp(SECRET, 1, 6).unwrap();
        assert_eq!(code, 287082);
    }

    #[test]
    fn hotp_count_2() {
        let code = hotp(SECRET, 2, 6).unwrap();
        assert_eq!(code, 359152);
    }

    #[test]
    fn hotp_count_3() {
        let code = hotp(SECRET, 3, 6).unwrap();
        assert_eq!(code, 969429);
    }

    #[test]
    fn hotp_count_4_to_9() {
        let expected = [338314, 254676, 287922, 162583, 399871, 520489];
        for (c, want) in (4..).zip(expected.iter()) {
            assert_eq!(hotp(SECRET, c, 6).unwrap(), *want, "counter {}", c);
        }
    }

    #[test]
    fn hotp_rejects_empty_key() {
        assert!(matches!(hotp(b"", 0, 6), Err(Error::InvalidSecret)));
    }

    #[test]
    fn hotp_rejects_bad_digits() {
        assert!(matches!(hotp(SECRET, 0, 0), Err(Error::Configuration(_))));
        assert!(matches!(hotp(SECRET, 0, 10), Err(Error::Configuration(_))));
    }

    #[test]
    fn totp_sha1_0() {
        let code = generate(SECRET_B32, 59, 30, 8).unwrap();
        assert_eq!(code, "94287082");
    }

    #[test]
    fn totp_sha1_1() {
        let code = generate(SECRET_B32, 1111111109, 30, 8).unwrap();
        assert_eq!(code, "07081804");
    }

    #[test]
    fn totp_sha1_2() {
        let code = generate(SECRET_B32, 1111111111, 30, 8).unwrap();
        assert_eq!(code, "14050471");
    }

    #[test]
    fn totp_sha1_3() {
        let code = generate(SECRET_B32, 1234567890, 30, 8).unwrap();
        assert_eq!(code, "89005924");
    }

    #[test]
    fn totp_sha1_4() {
        let code = generate(SECRET_B32, 2000000000, 30, 8).unwrap();
        assert_eq!(code, "69279037");
    }

    #[test]
    fn totp_sha1_5() {
        let code = generate(SECRET_B32, 20000000000, 30, 8).unwrap();
        assert_eq!(code, "65353130");
    }

    #[test]
    fn totp_keeps_leading_zeros() {
        let code = generate("JBSWY3DPEHPK3PXP", 4020, 30, 6).unwrap();
        assert_eq!(code, "008210");
    }

    #[test]
    fn totp_rejects_zero_step() {
        let r = generate(SECRET_B32, 59, 0, 6);
        assert!(matches!(r, Err(Error::Configuration(_))));
    }

    #[test]
    fn configuration_checked_before_secret() {
        let r = generate("", 59, 30, 10);
        assert!(matches!(r, Err(Error::Configuration(_))));
    }

    #[test]
    fn validate_at_exact_window_only() {
        let code = generate(SECRET_B32, 59, 30, 6).unwrap();
        assert!(validate_at(SECRET_B32, &code, 30).unwrap());
        assert!(validate_at(SECRET_B32, &code, 59).unwrap());
        assert!(!validate_at(SECRET_B32, &code, 60).unwrap());
        assert!(!validate_at(SECRET_B32, &code, 29).unwrap());
    }

    #[test]
    fn remaining_seconds_edges() {
        assert_eq!(remaining_seconds(0, 30).unwrap(), 30);
        assert_eq!(remaining_seconds(1, 30).unwrap(), 29);
        assert_eq!(remaining_seconds(29, 30).unwrap(), 1);
        assert_eq!(remaining_seconds(30, 30).unwrap(), 30);
        assert!(remaining_seconds(30, 0).is_err());
    }

    #[test]
    fn remaining_now_in_range() {
        let remaining = remaining_now();
        assert!((1..=time_step()).contains(&remaining));
    }
}
