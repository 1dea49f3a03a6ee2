//! Otpwarden Config Format

use color_eyre::eyre;
use otpwarden_engine::{lifecycle::DEFAULT_MIN_REMAINING, Algorithm, Error, TotpParams};
use serde::Deserialize;
use std::{fs, path::Path};

/// Environment variable that overrides the configured secret
pub const SECRET_ENV: &str = "OTPWARDEN_SECRET";

/// Value shipped in sample configurations, never a real secret
const PLACEHOLDER_SECRET: &str = "YOUR_OTP_SECRET_HERE";

#[derive(Debug, Default, Deserialize)]
pub struct OtpwardenConfig {
    /// One time password settings
    #[serde(default)]
    pub otp: OtpConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OtpConfig {
    /// Whether code generation is allowed at all (defaults to disabled)
    pub enabled: Option<bool>,

    /// Base32 encoded shared secret
    pub secret: Option<String>,

    /// Length of a time window, in seconds
    pub step: Option<u64>,

    /// Number of digits in a code
    pub digits: Option<u32>,

    /// Name of the keyed hash (only `SHA1` is supported)
    pub algorithm: Option<String>,

    /// Windows either side of the current one accepted when validating
    pub skew: Option<u8>,

    /// Freshness threshold used when acquiring codes, in seconds
    pub min_remaining: Option<u64>,
}

impl OtpwardenConfig {
    /// Attempts to load and parse the configuration and secrets files
    ///
    /// Either file may be missing; values from the secrets file take precedence over the
    /// configuration file, and the `OTPWARDEN_SECRET` environment variable takes precedence over
    /// both.
    ///
    /// # Arguments
    /// * `config` - Path to the otpwarden configuration file
    /// * `secrets` - Path to the otpwarden secrets file
    pub fn load(config: impl AsRef<Path>, secrets: impl AsRef<Path>) -> eyre::Result<Self> {
        let cfg = match Self::read(config.as_ref())? {
            Some(cfg) => cfg,
            None => {
                tracing::warn!(path = ?config.as_ref(), "configuration file not found, using defaults");
                Self::default()
            }
        };

        let cfg = match Self::read(secrets.as_ref())? {
            Some(overlay) => cfg.overlay(overlay),
            None => {
                tracing::debug!(path = ?secrets.as_ref(), "no secrets file found");
                cfg
            }
        };

        Ok(cfg.with_secret(std::env::var(SECRET_ENV).ok()))
    }

    /// Reads a single file, returning `None` if it does not exist
    fn read(path: &Path) -> eyre::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        let cfg = Self::from_toml(&contents)?;
        tracing::info!(?path, "loaded configuration");
        Ok(Some(cfg))
    }

    /// Parses a configuration from a toml string
    pub fn from_toml(contents: &str) -> eyre::Result<Self> {
        let cfg: OtpwardenConfig = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Returns a configuration where every value set in `other` replaces the value in `self`
    pub fn overlay(self, other: Self) -> Self {
        let (base, top) = (self.otp, other.otp);
        Self {
            otp: OtpConfig {
                enabled: top.enabled.or(base.enabled),
                secret: top.secret.or(base.secret),
                step: top.step.or(base.step),
                digits: top.digits.or(base.digits),
                algorithm: top.algorithm.or(base.algorithm),
                skew: top.skew.or(base.skew),
                min_remaining: top.min_remaining.or(base.min_remaining),
            },
        }
    }

    /// Replaces the secret, if one is provided
    pub fn with_secret(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret {
            self.otp.secret = Some(secret);
        }
        self
    }
}

impl OtpConfig {
    /// Builds the TOTP parameters, filling anything unset with the defaults
    ///
    /// # Errors
    /// * `Error::Configuration` - unsupported algorithm, digits or step
    pub fn params(&self) -> Result<TotpParams, Error> {
        let defaults = TotpParams::default();
        let algorithm = match &self.algorithm {
            Some(name) => name.parse::<Algorithm>()?,
            None => defaults.algorithm,
        };

        let params = TotpParams {
            step: self.step.unwrap_or(defaults.step),
            digits: self.digits.unwrap_or(defaults.digits),
            algorithm,
            skew: self.skew.unwrap_or(defaults.skew),
        };

        params.validated()?;
        Ok(params)
    }

    /// Returns the configured secret
    ///
    /// # Errors
    /// * `Error::Configuration` - code generation is disabled
    /// * `Error::InvalidSecret` - no secret, a blank secret or the sample placeholder
    pub fn secret(&self) -> Result<&str, Error> {
        if !self.enabled.unwrap_or(false) {
            return Err(Error::Configuration(
                "otp generation is disabled, set `otp.enabled = true`".into(),
            ));
        }

        match self.secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() && secret != PLACEHOLDER_SECRET => Ok(secret),
            _ => Err(Error::InvalidSecret),
        }
    }

    /// Freshness threshold used when acquiring codes
    pub fn min_remaining(&self) -> u64 {
        self.min_remaining.unwrap_or(DEFAULT_MIN_REMAINING)
    }
}
