//! Otpwarden Command Line

use clap::Parser;
use color_eyre::eyre;
use otpwarden_engine::{codec, lifecycle, Clock, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub mod cli;
pub mod config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    use cli::SubCommand;
    use dialoguer::Input;

    let opts = cli::Opts::parse();

    // init logging
    let level = match opts.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    FmtSubscriber::builder().with_max_level(level).init();

    // init error/panic handling
    color_eyre::install()?;

    let cfg = config::OtpwardenConfig::load(&opts.config, &opts.secrets)?;
    let params = cfg.otp.params()?;

    match opts.subcmd {
        SubCommand::Generate { at } => {
            let secret = cfg.otp.secret()?;
            let at = at.unwrap_or_else(|| SystemClock.now());

            let code = params.generate_at(secret, at)?;
            tracing::info!(remaining = params.remaining_at(at)?, "generated code");

            println!("{}", code);
        }
        SubCommand::Validate { code } => {
            let secret = cfg.otp.secret()?;

            if !params.validate(secret, code.trim())? {
                eyre::bail!("totp code mismatch");
            }

            println!("code valid");
        }
        SubCommand::Remaining => {
            println!("{}", params.remaining()?);
        }
        SubCommand::Acquire { min_remaining } => {
            let secret = cfg.otp.secret()?;
            let min_remaining = min_remaining.unwrap_or_else(|| cfg.otp.min_remaining());

            // ctrl-c interrupts the wait instead of killing the process mid-flight
            let cancel = CancellationToken::new();
            let token = cancel.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(_) => {
                        tracing::info!("caught ctrl-c, cancelling");
                        token.cancel();
                    }
                    Err(error) => tracing::error!(?error, "error registering ctrl-c handler"),
                }
            });

            let code = lifecycle::acquire_fresh_code_with(
                &params,
                secret,
                min_remaining,
                &SystemClock,
                &cancel,
            )
            .await?;

            println!("{}", code);
        }
        SubCommand::Provision { label } => {
            let theme = dialoguer::theme::ColorfulTheme::default();

            let secret = codec::generate_secret();
            let uri = params.uri(&secret, &label)?;

            println!("Secret: {}", secret);
            println!("TOTP:");
            qr2term::print_qr(&uri)?;
            println!();

            let code: String = Input::with_theme(&theme)
                .with_prompt("Confirm TOTP Code")
                .allow_empty(false)
                .interact_text()?;

            if !params.validate(&secret, code.trim())? {
                eyre::bail!("totp code mismatch, authenticator not enrolled");
            }

            println!("code validated, add the secret to your secrets file");
        }
    }

    Ok(())
}
