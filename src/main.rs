// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clair_load_test::{
    ClairctlManifest, Collaborators, Config, DispatchProgress, Dispatcher, JsonExporter,
    OutputFormat, PskTokenSource, ReportConfig, TextExporter, build_client,
};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "clair_load_test")]
#[command(version = "0.1.0")]
#[command(about = "Drive synthetic report load against a Clair deployment", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = clair_load_test::config::DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request index and vulnerability reports for named containers
    Report(ReportArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Base address of the Clair API
    #[arg(long, env = "CLAIR_API")]
    host: Option<String>,

    /// Comma-separated container references, e.g. ubuntu:latest,mysql:latest
    #[arg(long, env = "CONTAINERS")]
    containers: Option<String>,

    /// Maximum number of reports in flight
    #[arg(long, env = "CONCURRENCY")]
    concurrency: Option<usize>,

    /// Base64 pre-shared key used to sign request tokens
    #[arg(long, env = "PSK", hide_env_values = true)]
    psk: Option<String>,

    /// Stop launching new reports after this long, e.g. 1m or 30s
    #[arg(long, env = "TIMEOUT", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Delete each index report after fetching its vulnerability report
    #[arg(
        long,
        env = "DELETE",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    delete: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Show a live task spinner on stderr
    #[arg(long, action = ArgAction::SetTrue)]
    progress: bool,
}

impl ReportArgs {
    fn apply(&self, report: &mut ReportConfig) {
        if let Some(host) = &self.host {
            report.host = host.clone();
        }
        if let Some(containers) = &self.containers {
            report.containers = containers.clone();
        }
        if let Some(concurrency) = self.concurrency {
            report.concurrency = concurrency;
        }
        if let Some(psk) = &self.psk {
            report.psk = psk.clone();
        }
        if let Some(timeout) = self.timeout {
            report.timeout = timeout;
        }
        report.delete |= self.delete;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    clair_load_test::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    let config = if cli.config.exists() {
        info!("Loading configuration from: {}", cli.config.display());
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using built-in defaults",
            cli.config.display()
        );
        Config::load(None).context("Failed to load configuration")?
    };

    match cli.command {
        Commands::Report(args) => {
            cmd_report(config, args, cli.color).await?;
        }
    }

    Ok(())
}

async fn cmd_report(mut config: Config, args: ReportArgs, color: bool) -> Result<()> {
    args.apply(&mut config.report);

    let run = config
        .run_config()
        .context("Invalid report configuration")?;

    if config.report.psk.is_empty() {
        warn!("No PSK configured, every report will fail at the token stage");
    }

    let collaborators = Collaborators {
        client: build_client(&config.http).context("Failed to create HTTP client")?,
        manifests: Arc::new(ClairctlManifest::new(&config.manifest)),
        tokens: Arc::new(PskTokenSource::new(
            config.report.psk.clone(),
            &config.auth,
        )),
    };

    let dispatcher = Dispatcher::new(run, collaborators)
        .with_progress(DispatchProgress::new(args.progress, color));

    let cancel = dispatcher.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling report run");
            cancel.cancel();
        }
    });

    let snapshot = dispatcher.run().await.context("Report run failed")?;

    let stdout = std::io::stdout();
    match args.format {
        OutputFormat::Json => {
            JsonExporter::new(true)
                .write(&snapshot, stdout.lock())
                .context("Failed to write summary")?;
        }
        OutputFormat::Text => {
            print!("{}", TextExporter::new(color).render(&snapshot));
        }
    }

    Ok(())
}
