//! netpatch CLI - apply audio subscription presets to networked devices
//!
//! Resolve preset subscriptions against a device snapshot, apply them, and
//! browse the network for devices.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use netpatch_core::{CancellationToken, Pipeline, Report, Resolver, SubscriptionRequest};
use netpatch_discovery::{Browser, DiscoveryConfig, InventoryFileProvider};
use netpatch_preset::{load_preset, PresetFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod dry_run;
mod report;

use config::{FileConfig, Overrides};
use dry_run::DryRunApplier;

/// netpatch - declarative audio subscription routing
#[derive(Parser)]
#[command(name = "netpatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "NETPATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Debug logging and per-request progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print results as JSON instead of lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Preset file with subscription definitions (.xml, .toml, .json)
    #[arg(short, long, visible_alias = "xmlfile")]
    preset: PathBuf,

    /// Preset format, when the extension does not tell
    #[arg(long)]
    format: Option<PresetFormat>,

    /// Device inventory file (.json, .toml)
    #[arg(short, long)]
    inventory: Option<PathBuf>,

    /// Snapshot acquisition timeout in seconds
    #[arg(long)]
    discovery_timeout: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a preset and add its subscriptions
    Apply {
        #[command(flatten)]
        source: SourceArgs,

        /// Log subscriptions instead of sending them to devices
        #[arg(long)]
        dry_run: bool,

        /// Maximum concurrent apply operations
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-subscription apply timeout in seconds
        #[arg(long)]
        apply_timeout: Option<f64>,
    },

    /// Resolve a preset without applying anything
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List devices announced on the network
    Devices {
        /// Browse time in seconds
        #[arg(short, long, default_value = "1.5")]
        timeout: f64,
    },

    /// Show version and system info
    Info,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let file_config = FileConfig::load(cli.config.as_deref())?;

    // Setup logging
    let level = file_config.log_level(cli.log_level.as_deref(), cli.verbose);
    setup_logging(&level, cli.json_logs)?;
    if let Some(path) = &file_config.source {
        debug!("Loaded config from {}", path.display());
    }

    // Handle Ctrl+C
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                token.cancel();
            }
            Err(e) => warn!("Failed to listen for ctrl+c: {}", e),
        }
    });

    match cli.command {
        Commands::Apply {
            source,
            dry_run,
            concurrency,
            apply_timeout,
        } => {
            let overrides = Overrides {
                discovery_timeout: source.discovery_timeout,
                apply_timeout,
                concurrency,
                verbose: cli.verbose,
            };
            run_apply(source, dry_run, &file_config, &overrides, cancel, cli.json).await
        }

        Commands::Check { source } => {
            let overrides = Overrides {
                discovery_timeout: source.discovery_timeout,
                verbose: cli.verbose,
                ..Default::default()
            };
            run_check(source, &file_config, &overrides, cancel, cli.json).await
        }

        Commands::Devices { timeout } => run_devices(timeout, cancel, cli.json).await,

        Commands::Info => {
            print_info();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to parse log level")?;

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

async fn read_preset(source: &SourceArgs) -> Result<Vec<SubscriptionRequest>> {
    load_preset(&source.preset, source.format)
        .await
        .with_context(|| format!("Failed to load preset {}", source.preset.display()))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run_apply(
    source: SourceArgs,
    dry_run: bool,
    file_config: &FileConfig,
    overrides: &Overrides,
    cancel: CancellationToken,
    json: bool,
) -> Result<ExitCode> {
    if !dry_run {
        bail!("no device-control backend is configured; rerun with --dry-run to resolve and log the subscriptions");
    }

    let config = file_config.pipeline_config(overrides)?;
    let inventory = file_config.inventory(source.inventory.clone())?;
    let requests = read_preset(&source).await?;

    if requests.is_empty() {
        if json {
            let empty = report::report_json(&requests, &Report::default());
            println!("{}", serde_json::to_string_pretty(&empty)?);
        } else {
            println!("{} No subscriptions found", "netpatch".cyan().bold());
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !json {
        println!(
            "{} Applying {} subscription(s) from {} {}",
            "netpatch".cyan().bold(),
            requests.len(),
            source.preset.display(),
            "(dry run)".yellow()
        );
    }

    let pipeline =
        Pipeline::with_config(InventoryFileProvider::new(inventory), DryRunApplier, config)
            .with_cancellation(cancel);
    let report = pipeline
        .run(&requests)
        .await
        .context("Failed to acquire device snapshot")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::report_json(&requests, &report))?
        );
    } else {
        report::print_report(&requests, &report);
    }

    Ok(exit_code(report.all_applied()))
}

async fn run_check(
    source: SourceArgs,
    file_config: &FileConfig,
    overrides: &Overrides,
    cancel: CancellationToken,
    json: bool,
) -> Result<ExitCode> {
    let config = file_config.pipeline_config(overrides)?;
    let inventory = file_config.inventory(source.inventory.clone())?;
    let requests = read_preset(&source).await?;

    if requests.is_empty() {
        if json {
            println!("{}", serde_json::to_string_pretty(&report::check_json(&[], &[]))?);
        } else {
            println!("{} No subscriptions found", "netpatch".cyan().bold());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let pipeline =
        Pipeline::with_config(InventoryFileProvider::new(inventory), DryRunApplier, config)
            .with_cancellation(cancel);
    let snapshot = pipeline
        .acquire()
        .await
        .context("Failed to acquire device snapshot")?;

    let resolver = Resolver::new(&snapshot);
    let results = resolver.resolve_all(&requests);
    let unresolved = results.iter().filter(|r| r.is_err()).count();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::check_json(&requests, &results))?
        );
    } else {
        for (request, result) in requests.iter().zip(&results) {
            println!(
                "  {}",
                report::check_line(request, result.as_ref().map(|_| ()))
            );
        }
        println!();
        println!(
            "{} {} of {} subscription(s) resolved",
            "netpatch".cyan().bold(),
            requests.len() - unresolved,
            requests.len()
        );
    }

    Ok(exit_code(unresolved == 0))
}

async fn run_devices(timeout: f64, cancel: CancellationToken, json: bool) -> Result<ExitCode> {
    let config = DiscoveryConfig {
        browse_window: config::seconds("browse timeout", timeout)?,
        ..Default::default()
    };
    if !config.mdns {
        bail!("mDNS discovery is not available in this build");
    }

    if !json {
        println!(
            "{} Browsing {} for {:.1}s",
            "netpatch".cyan().bold(),
            config.service_type.green(),
            timeout
        );
    }

    let mut browser = Browser::with_config(config);
    let devices = tokio::select! {
        biased;
        _ = cancel.cancelled() => bail!("cancelled"),
        result = browser.browse() => result.context("Device discovery failed")?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else if devices.is_empty() {
        println!("  No devices found");
    } else {
        for device in &devices {
            let address = device
                .socket_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|| device.hostname.clone());
            println!("  {} {} ({})", "•".green(), device.name.bold(), address);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_info() {
    println!(
        "{}",
        "netpatch - declarative audio subscription routing"
            .cyan()
            .bold()
    );
    println!();
    println!("Version:    {}", env!("CARGO_PKG_VERSION"));
    println!("Platform:   {}", std::env::consts::OS);
    println!("Arch:       {}", std::env::consts::ARCH);
    println!("Config:     {}", config::default_config_file().display());
    println!();
    println!("{}", "Preset formats:".green());
    println!("  - XML controller preset export (.xml)");
    println!("  - Subscription list (.toml, .json)");
    println!();
    println!("{}", "Examples:".green());
    println!("  netpatch check --preset show.xml --inventory net.toml");
    println!("  netpatch apply --preset show.xml --inventory net.toml --dry-run");
    println!("  netpatch devices --timeout 3");
}
