mod report;

use std::time::Duration;

use clap::Parser;
use desfire_uid::handle_card_present_with;
use desfire_uid::pcsc::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::report::{outcome_lines, step_lines, Report};

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("Error occurred on communicating with PC/SC: {0}")]
    Pcsc(#[from] desfire_uid::pcsc::Error),

    #[error("Failed to serialize the report: {0}")]
    Json(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Prints the UID of DESFire-style cards presented to a PC/SC reader.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Uses the first reader whose name contains this text.
    #[arg(short, long, env = "DESFIRE_UID_READER")]
    reader: Option<String>,

    /// Exits after the first card.
    #[arg(long, env = "DESFIRE_UID_ONCE")]
    once: bool,

    /// Seconds to wait for a card before giving up. Waits forever if omitted.
    #[arg(short, long, env = "DESFIRE_UID_TIMEOUT")]
    timeout: Option<u64>,

    /// Prints one JSON object per card instead of the progress.
    #[arg(long, env = "DESFIRE_UID_JSON")]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let print = |line: &str| {
        if !cli.json {
            println!("{}", line);
        }
    };

    print("Check for NFC support...");
    let ctx = Context::try_new()?;
    print("Ok. SmartCards are supported.");

    let device = ctx.open(cli.reader.as_deref())?;
    info!("Using reader: {}", device.name());
    print("Bring your card...");

    let timeout = cli.timeout.map(Duration::from_secs);
    while device.wait_for_card(&ctx, timeout)? {
        print("Ok. Got card. Processing...");

        let outcome = handle_card_present_with(&device.card(&ctx), |step| {
            step_lines(step).iter().for_each(|line| print(line));
        });

        if cli.json {
            println!("{}", serde_json::to_string(&Report::from(&outcome))?);
        } else {
            outcome_lines(&outcome).iter().for_each(|line| print(line));
        }

        if cli.once {
            return Ok(());
        }
    }

    info!("No card was presented");

    Ok(())
}
