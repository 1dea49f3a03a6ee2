//! Freshness-Aware Code Acquisition
//!
//! A code that is about to roll over is likely to be stale by the time it reaches the verifier.
//! Before handing a code out, check how much of its window is left and, if too little, wait for
//! the next window exactly once.

use crate::{clock::Clock, codec, params::TotpParams, Error};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default freshness threshold, in seconds
pub const DEFAULT_MIN_REMAINING: u64 = 5;

/// Acquires a code with at least `min_remaining` seconds of validity using the default parameters
///
/// See [`acquire_fresh_code_with`].
pub async fn acquire_fresh_code<C: Clock + ?Sized>(
    secret: &str,
    min_remaining: u64,
    clock: &C,
    cancel: &CancellationToken,
) -> Result<String, Error> {
    acquire_fresh_code_with(&TotpParams::default(), secret, min_remaining, clock, cancel).await
}

/// Acquires a code with at least `min_remaining` seconds of validity
///
/// If the current window has fewer than `min_remaining` seconds left, sleeps for the remainder of
/// the window plus one second and generates from the next window.  The wait happens at most once;
/// the clock is read again after waking but the freshness check is not repeated.
///
/// # Arguments
/// * `params` - TOTP parameters to generate with
/// * `secret` - Base32 encoded shared secret
/// * `min_remaining` - minimum number of seconds the returned code must still be valid for
/// * `clock` - source of the current time
/// * `cancel` - token that interrupts the wait
///
/// # Errors
/// * `Error::Configuration` - invalid parameters
/// * `Error::InvalidSecret` - secret decodes to an empty key (checked before any waiting)
/// * `Error::Cancelled` - `cancel` fired while waiting
pub async fn acquire_fresh_code_with<C: Clock + ?Sized>(
    params: &TotpParams,
    secret: &str,
    min_remaining: u64,
    clock: &C,
    cancel: &CancellationToken,
) -> Result<String, Error> {
    params.validated()?;
    if codec::decode(secret).is_empty() {
        return Err(Error::InvalidSecret);
    }

    let remaining = params.remaining_at(clock.now())?;
    if remaining < min_remaining {
        let wait = Duration::from_secs(remaining + 1);
        tracing::info!(
            remaining,
            wait = wait.as_secs(),
            "current code about to expire, waiting for a fresh code"
        );

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::warn!("wait for fresh code cancelled");
                return Err(Error::Cancelled);
            }
            _ = tokio::time::sleep(wait) => {}
        }
    }

    params.generate_at(secret, clock.now())
}
