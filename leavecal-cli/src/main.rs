mod commands;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use leavecal_core::config::{LeavecalConfig, LogFormat};
use leavecal_core::sync::SyncMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "leavecal")]
#[command(about = "Export approved leave and office holidays as an iCalendar file")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the calendar and email it, or write it out with --download
    Export {
        /// Recipient email address
        #[arg(long)]
        to: Option<String>,

        /// Which leave to include: "new-only" (never sent) or "all"
        #[arg(short, long, default_value = "new-only")]
        mode: SyncMode,

        /// Leave out leave records
        #[arg(long)]
        no_leaves: bool,

        /// Leave out office holidays
        #[arg(long)]
        no_holidays: bool,

        /// Only include this office location
        #[arg(short, long)]
        location: Option<String>,

        /// Don't email; write the calendar to --output or stdout
        #[arg(long)]
        download: bool,

        /// File to write with --download
        #[arg(short, long, requires = "download")]
        output: Option<PathBuf>,

        /// Tenant id (defaults to default_tenant from the config)
        #[arg(short, long)]
        tenant: Option<String>,
    },
    /// Show how much leave is waiting to be sent
    Status {
        #[arg(short, long)]
        tenant: Option<String>,

        #[arg(short, long)]
        location: Option<String>,
    },
    /// Write a default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Export {
            to,
            mode,
            no_leaves,
            no_holidays,
            location,
            download,
            output,
            tenant,
        } => {
            let config = load_config()?;
            commands::export::run(
                &config,
                commands::export::ExportArgs {
                    to,
                    mode,
                    include_leaves: !no_leaves,
                    include_holidays: !no_holidays,
                    location,
                    download,
                    output,
                    tenant,
                },
            )
            .await
        }
        Commands::Status { tenant, location } => {
            let config = load_config()?;
            commands::status::run(&config, tenant.as_deref(), location.as_deref()).await
        }
    }
}

fn load_config() -> Result<LeavecalConfig> {
    let config = LeavecalConfig::load()?;
    init_tracing(config.log_format);

    if config.tenants.is_empty() {
        anyhow::bail!(
            "No tenants configured.\n\n\
            Create a config file with:\n  \
            leavecal init\n\n\
            then add a [[tenants]] entry."
        );
    }

    Ok(config)
}

/// Logs go to stderr so a downloaded calendar on stdout stays clean.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
