//! Otpwarden Engine
//!
//! Generates and checks RFC 6238 time-based one-time passwords from Base32 encoded secrets.  All
//! code generation is a pure function of the secret, a point in time and the policy parameters;
//! the only place this crate ever waits is [`lifecycle::acquire_fresh_code`], which holds off
//! until a code has enough of its window left to be submitted safely.

pub mod clock;
pub mod codec;
pub mod lifecycle;
pub mod otp;
mod params;

pub use clock::{Clock, ManualClock, SystemClock};
pub use params::{Algorithm, TotpParams};

/// Errors raised while generating, validating or acquiring a code
///
/// Decoding a secret never fails by itself; an unusable secret is reported as
/// [`Error::InvalidSecret`] once something tries to hash with it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Secret was missing, blank or contained no Base32 characters
    #[error("secret is empty or decodes to an empty key")]
    InvalidSecret,

    /// Policy parameters are outside of what the engine supports
    #[error("invalid otp configuration: {0}")]
    Configuration(String),

    /// The wait for a fresh code was interrupted
    #[error("wait for a fresh code was cancelled")]
    Cancelled,
}
