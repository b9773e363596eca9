//! DRA818 CLI
//!
//! Configures a DRA818/SA818 module on start-up, or watches its carrier
//! detector. With no subcommand it runs the stock initialization.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dra818_core::core::radio::{ScanConfig, Scanner};
use dra818_core::core::transport::{SerialTransport, DEFAULT_PORT};
use dra818_core::cli::exit_code_description;
use dra818_core::{
    CliResult, ExchangePrinter, Frequency, OutputFormat, RadioInitializer, RadioSettings, Squelch,
    TransportTrait,
    Volume,
};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// DRA818 CLI
#[derive(Parser, Debug)]
#[command(
    name = "dra818",
    version,
    disable_version_flag = true,
    about = "Initialize and monitor a DRA818/SA818 radio module over a serial port",
    long_about = None
)]
struct Cli {
    /// Serial device the module is wired to
    #[arg(short, long, global = true, default_value = DEFAULT_PORT)]
    port: String,

    /// Reply output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print version
    #[arg(long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Verbose logging on stderr
    #[arg(short = 'V', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send the start-up sequence (the default)
    Init(InitArgs),

    /// Poll the carrier detector on one frequency
    Scan {
        /// Frequency, digits only (1443900 = 144.3900 MHz)
        frequency: Option<Frequency>,

        /// Pause between polls in milliseconds
        #[arg(long, default_value = "1000")]
        period: u64,

        /// Stop after this many polls
        #[arg(short = 'n', long)]
        count: Option<u64>,
    },
}

#[derive(Args, Debug, Default)]
struct InitArgs {
    /// Volume (1-8)
    #[arg(short, long, default_value_t = Volume::default())]
    volume: Volume,

    /// Squelch level (0-8)
    #[arg(short, long, default_value_t = Squelch::default())]
    squelch: Squelch,

    /// Transmit frequency, digits only (1443900 = 144.3900 MHz)
    tx: Option<Frequency>,

    /// Receive frequency, defaults to the transmit frequency
    #[arg(requires = "tx")]
    rx: Option<Frequency>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting {} v{}", dra818_core::NAME, dra818_core::VERSION);

    let result = match run(&cli).await {
        Ok(()) => CliResult::success(),
        Err(e) => CliResult::from_error(&e),
    };

    if let Some(msg) = result.message() {
        if !result.is_success() {
            tracing::error!("{} ({})", msg, exit_code_description(result.code()));
        }
    }
    result.to_exit_code()
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        None => init(cli, &InitArgs::default()).await,
        Some(Commands::Init(args)) => init(cli, args).await,
        Some(Commands::Scan {
            frequency,
            period,
            count,
        }) => {
            let config = ScanConfig {
                frequency: frequency.unwrap_or_default(),
                period: Duration::from_millis(*period),
                count: *count,
            };
            scan(cli, config).await
        }
    }
}

async fn init(cli: &Cli, args: &InitArgs) -> anyhow::Result<()> {
    let mut settings = RadioSettings::default()
        .port(&cli.port)
        .squelch(args.squelch)
        .volume(args.volume);
    if let Some(tx) = args.tx {
        settings = settings.frequencies(tx, args.rx);
    }
    settings.validate()?;

    tracing::debug!("Settings: {}", serde_json::to_string(&settings)?);

    let mut radio = RadioInitializer::connect(settings.serial.clone())
        .with_context(|| format!("opening {}", settings.serial.port))?;
    let mut printer = ExchangePrinter::stdout(cli.format);

    radio.run(&settings.command_sequence(), &mut printer).await?;

    tracing::debug!("Link stats: {:?}", radio.link().stats());
    Ok(())
}

async fn scan(cli: &Cli, config: ScanConfig) -> anyhow::Result<()> {
    let settings = RadioSettings::default().port(&cli.port);
    let link = SerialTransport::open(settings.serial.clone())
        .with_context(|| format!("opening {}", settings.serial.port))?;

    let stop = Arc::new(AtomicBool::new(false));
    let s = stop.clone();
    ctrlc::set_handler(move || {
        s.store(true, Ordering::SeqCst);
    })?;

    let mut printer = ExchangePrinter::stdout(cli.format);
    let summary = Scanner::new(link, config).run(&mut printer, &stop).await?;

    tracing::info!("{} polls, {} packets", summary.polls, summary.packets);
    Ok(())
}
