use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod overlay;
mod replay;

use config::{ReplayConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "scratchcard-replay")]
#[command(about = "Replay recorded host messages through the scratch-card overlay", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./scratchcard.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,
    /// Post every envelope of a JSON Lines recording
    Play {
        file: PathBuf,

        /// Override the configured delay between envelopes
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    match cli.command {
        Commands::Init => init_config(cli.config).await,
        Commands::Play { file, delay_ms } => play(cli.config, file, delay_ms).await,
    }
}

async fn init_config(path: Option<PathBuf>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = path.unwrap_or_else(|| cwd.join(CONFIG_FILE));

    ReplayConfig::default().write_new(&path).await?;

    println!("Wrote {}", path.display());
    Ok(())
}

async fn play(config_path: Option<PathBuf>, file: PathBuf, delay_ms: Option<u64>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let mut config = ReplayConfig::load(config_path.as_deref(), &cwd).await?;
    if let Some(delay_ms) = delay_ms {
        config.replay.delay_ms = delay_ms;
    }

    tracing::info!(
        file = %file.display(),
        init_event = %config.replay.init_event,
        close_event = %config.replay.close_event,
        "Loading recording"
    );

    let envelopes = replay::read_envelopes(&file).await?;
    let summary = replay::play(envelopes, &config.replay)
        .await
        .context("Replay failed")?;

    println!();
    println!("Envelopes:   {}", summary.envelopes);
    println!("Invocations: {}", summary.invocations);
    println!();
    println!("{}", serde_json::to_string_pretty(&summary.final_state)?);

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scratchcard_replay=info,events=info".into()),
        )
        .init();
}
