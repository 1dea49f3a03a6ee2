//! Code Generation Properties

use otpwarden_engine::{
    codec,
    otp::{self, DEFAULT_DIGITS, DEFAULT_STEP},
    Clock, Error, ManualClock, SystemClock, TotpParams,
};
use std::{sync::Arc, thread};

const SECRET: &str = "JBSWY3DPEHPK3PXP";

#[test]
fn known_vector() {
    let code = otp::generate(SECRET, 1_234_567_890, DEFAULT_STEP, DEFAULT_DIGITS).unwrap();
    assert_eq!(code, "742275");

    let code = otp::generate(SECRET, 2_000_000_000, DEFAULT_STEP, DEFAULT_DIGITS).unwrap();
    assert_eq!(code, "890699");
}

#[test]
fn deterministic() {
    for &t in &[0u64, 59, 1_111_111_109, 1_234_567_890, 20_000_000_000] {
        let a = otp::generate(SECRET, t, 30, 6).unwrap();
        let b = otp::generate(SECRET, t, 30, 6).unwrap();
        assert_eq!(a, b, "generate not deterministic at t = {}", t);
    }
}

#[test]
fn width_matches_digits() {
    for digits in 1..=otp::MAX_DIGITS {
        for t in (0..3_000).step_by(30) {
            let code = otp::generate(SECRET, t, 30, digits).unwrap();
            assert_eq!(code.len(), digits as usize, "bad width for {:?}", code);
            assert!(code.chars().all(|c| c.is_ascii_digit()), "non-digit in {:?}", code);
        }
    }
}

#[test]
fn stable_within_window() {
    for &step in &[1u64, 30, 60] {
        let window_start = 1_700_000_000 / step * step;
        let first = otp::generate(SECRET, window_start, step, 6).unwrap();
        for t in window_start..window_start + step {
            assert_eq!(otp::generate(SECRET, t, step, 6).unwrap(), first);
        }
    }
}

#[test]
fn crossing_window_is_well_formed() {
    let before = otp::generate(SECRET, 1_700_000_009, 30, 6).unwrap();
    let after = otp::generate(SECRET, 1_700_000_010, 30, 6).unwrap();
    assert_eq!(before.len(), 6);
    assert_eq!(after.len(), 6);
}

#[test]
fn remaining_within_bounds() {
    for &step in &[1u64, 7, 30, 60] {
        for t in 0..200 {
            let remaining = otp::remaining_seconds(t, step).unwrap();
            assert!(
                remaining >= 1 && remaining <= step,
                "remaining {} out of range for t = {} step = {}",
                remaining,
                t,
                step
            );
        }
    }
}

#[test]
fn round_trip_validation() {
    let clock = ManualClock::new(SystemClock.now());
    let code = otp::generate(SECRET, clock.now(), DEFAULT_STEP, DEFAULT_DIGITS).unwrap();
    assert!(otp::validate_at(SECRET, &code, clock.now()).unwrap());
}

#[test]
fn round_trip_validation_now() {
    // a window boundary between the two calls is possible, so retry once
    let code = otp::generate_now(SECRET).unwrap();
    let valid = otp::validate(SECRET, &code).unwrap()
        || otp::validate(SECRET, &otp::generate_now(SECRET).unwrap()).unwrap();
    assert!(valid);
}

#[test]
fn wrong_code_rejected() {
    let code = otp::generate(SECRET, 59, 30, 6).unwrap();
    let wrong = if code == "000000" { "000001" } else { "000000" };
    assert!(!otp::validate_at(SECRET, wrong, 59).unwrap());
}

#[test]
fn empty_secret() {
    assert!(matches!(
        otp::generate("", 59, 30, 6),
        Err(Error::InvalidSecret)
    ));
    assert!(matches!(
        otp::generate("   ", 59, 30, 6),
        Err(Error::InvalidSecret)
    ));
    assert!(matches!(
        otp::generate("@#$!", 59, 30, 6),
        Err(Error::InvalidSecret)
    ));
    assert!(matches!(otp::validate("", "000000"), Err(Error::InvalidSecret)));
}

#[test]
fn invalid_characters_ignored() {
    let noisy = "JBSWY3DPEHPK3PXP!!!";
    assert_eq!(codec::decode(noisy), codec::decode(SECRET));
    assert_eq!(
        otp::generate(noisy, 1_234_567_890, 30, 6).unwrap(),
        otp::generate(SECRET, 1_234_567_890, 30, 6).unwrap()
    );
}

#[test]
fn lowercase_spaced_secret() {
    assert_eq!(
        otp::generate("jbsw y3dp ehpk 3pxp", 59, 30, 6).unwrap(),
        otp::generate(SECRET, 59, 30, 6).unwrap()
    );
}

#[test]
fn unsupported_digits() {
    assert!(matches!(
        otp::generate(SECRET, 59, 30, 0),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        otp::generate(SECRET, 59, 30, 10),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn concurrent_callers_agree() {
    let params = Arc::new(TotpParams::default());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let params = Arc::clone(&params);
            thread::spawn(move || params.generate_at(SECRET, 1_111_111_109).unwrap())
        })
        .collect();

    let codes: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(codes.iter().all(|c| c == "071271"), "codes differ: {:?}", codes);
}
