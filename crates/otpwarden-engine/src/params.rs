//! TOTP Policy Parameters

use crate::{
    clock::{Clock, SystemClock},
    codec,
    otp::{self, DEFAULT_DIGITS, DEFAULT_STEP},
    Error,
};
use std::{fmt, str::FromStr};

/// Keyed hash used to derive codes
///
/// Only HMAC-SHA-1 is supported, which is what authenticator apps default to.  Any other name is
/// rejected when parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Sha1,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Sha1
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Sha1 => write!(f, "SHA1"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase().replace('-', "");
        match name.as_str() {
            "SHA1" | "HMACSHA1" => Ok(Algorithm::Sha1),
            _ => Err(Error::Configuration(format!(
                "unsupported hash algorithm `{}`",
                s
            ))),
        }
    }
}

/// The set of parameters shared between a code generator and its validator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TotpParams {
    /// Length of a time window, in seconds
    pub step: u64,

    /// Number of digits in a code
    pub digits: u32,

    /// Keyed hash used to derive codes
    pub algorithm: Algorithm,

    /// Number of windows either side of the current one accepted during validation
    pub skew: u8,
}

impl Default for TotpParams {
    /// Defaults:
    /// - step: `30 seconds`
    /// - digits: `6`
    /// - algorithm: `SHA1`
    /// - skew: `0` (current window only)
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            digits: DEFAULT_DIGITS,
            algorithm: Algorithm::Sha1,
            skew: 0,
        }
    }
}

impl TotpParams {
    /// Checks the parameters can be used to generate codes
    ///
    /// # Errors
    /// * `Error::Configuration` - `digits` outside of `1..=9` or a zero `step`
    pub fn validated(&self) -> Result<&Self, Error> {
        otp::check_digits(self.digits)?;
        otp::check_step(self.step)?;
        Ok(self)
    }

    /// Generates the code for a secret at a given Unix time
    pub fn generate_at(&self, secret: &str, at: u64) -> Result<String, Error> {
        self.validated()?;
        otp::generate(secret, at, self.step, self.digits)
    }

    /// Generates the code for a secret at the current time
    pub fn generate(&self, secret: &str) -> Result<String, Error> {
        self.generate_at(secret, SystemClock.now())
    }

    /// Validates a code against these parameters at a given Unix time
    ///
    /// Accepts the code for the window containing `at` and, when `skew` is set, the codes for
    /// the `skew` windows before and after it.
    ///
    /// # Arguments
    /// * `secret` - Base32 encoded shared secret
    /// * `candidate` - code provided by the user
    /// * `at` - Unix time (in seconds) to validate against
    pub fn validate_at(&self, secret: &str, candidate: &str, at: u64) -> Result<bool, Error> {
        self.validated()?;

        let current = otp::counter(at, self.step)?;
        let skew = u64::from(self.skew);
        let first = current.saturating_sub(skew);
        let last = current.saturating_add(skew);

        for counter in first..=last {
            if otp::generate_counter(secret, counter, self.digits)? == candidate {
                if counter != current {
                    let drift = counter as i64 - current as i64;
                    tracing::debug!(drift, "accepted code from adjacent window");
                }
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Validates a code against these parameters at the current time
    pub fn validate(&self, secret: &str, candidate: &str) -> Result<bool, Error> {
        self.validate_at(secret, candidate, SystemClock.now())
    }

    /// Seconds until the window containing `at` closes
    pub fn remaining_at(&self, at: u64) -> Result<u64, Error> {
        otp::remaining_seconds(at, self.step)
    }

    /// Seconds until the current window closes
    pub fn remaining(&self) -> Result<u64, Error> {
        self.remaining_at(SystemClock.now())
    }

    /// Returns a TOTP URL that can be embedded in a qrcode
    ///
    /// # Arguments
    /// * `secret` - Base32 encoded shared secret, re-encoded canonically in the uri
    /// * `label` - Label to embed in the uri
    pub fn uri(&self, secret: &str, label: &str) -> Result<String, Error> {
        self.validated()?;

        let key = codec::decode(secret);
        if key.is_empty() {
            return Err(Error::InvalidSecret);
        }

        Ok(format!(
            "otpauth://totp/{label}?secret={secret}&algorithm={algorithm}&digits={digits}&period={step}",
            label = label,
            secret = codec::encode(&key),
            algorithm = self.algorithm,
            digits = self.digits,
            step = self.step
        ))
    }
}
