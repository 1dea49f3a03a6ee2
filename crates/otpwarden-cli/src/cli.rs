//! Command Line Options and Arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(name = "otpwarden", version)]
pub struct Opts {
    /// A level of verbosity, and can be used multiple times
    #[clap(short, long, parse(from_occurrences))]
    pub verbosity: u8,

    /// Path to the otpwarden configuration file
    #[clap(short, long, default_value = "otpwarden.toml")]
    pub config: PathBuf,

    /// Path to the optional secrets file, overrides values from the configuration file
    #[clap(short, long, default_value = "otpwarden.secrets.toml")]
    pub secrets: PathBuf,

    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Prints the code for the configured secret
    Generate {
        /// Unix time (in seconds) to generate the code for, defaults to now
        #[clap(long)]
        at: Option<u64>,
    },

    /// Checks a code against the configured secret
    Validate {
        /// Code to check
        code: String,
    },

    /// Prints the number of seconds left before the current code expires
    Remaining,

    /// Waits until a code with enough validity left is available, then prints it
    Acquire {
        /// Minimum number of seconds the printed code must remain valid for
        #[clap(short, long)]
        min_remaining: Option<u64>,
    },

    /// Creates a new secret and confirms an authenticator app was enrolled with it
    Provision {
        /// Label to embed in the provisioning uri
        #[clap(short, long, default_value = "otpwarden")]
        label: String,
    },
}
