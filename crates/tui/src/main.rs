mod preview;
mod renderer;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use scrollstage_core::{ScrollTrace, Stage, StageConfig, replay};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scroll-driven page effects, in the terminal.
#[derive(Parser, Debug)]
#[command(name = "scrollstage")]
#[command(version, about = "Preview and replay scroll-driven page effects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive preview of a simulated page
    Preview {
        /// Total document height in pixels
        #[arg(long, default_value = "6000")]
        document_height: f64,

        /// Viewport height in pixels
        #[arg(long, default_value = "1000")]
        viewport_height: f64,

        /// Stage config JSON
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write logs here (the terminal is taken by the preview)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Feed a scroll trace through the tracker and print one JSON line per tick
    Replay {
        /// Trace JSON: { document_height, viewport_height, samples: [{ time_ms, offset }] }
        trace: PathBuf,

        /// Stage config JSON
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for glitch timing and random clips
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,scrollstage_core=debug".into())
}

fn load_config(path: Option<&Path>) -> Result<StageConfig> {
    let Some(path) = path else {
        return Ok(StageConfig::default());
    };
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    StageConfig::from_json(&data).with_context(|| format!("loading config {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Preview {
            document_height,
            viewport_height,
            config,
            log_file,
        } => {
            if let Some(path) = &log_file {
                let file = File::create(path)
                    .with_context(|| format!("creating log file {}", path.display()))?;
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter())
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
            let config = load_config(config.as_deref())?;
            preview::run(
                preview::PageSize {
                    document_height,
                    viewport_height,
                },
                config,
            )
        }
        Commands::Replay {
            trace,
            config,
            seed,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();

            let data = std::fs::read(&trace).with_context(|| format!("reading {}", trace.display()))?;
            let trace_data = ScrollTrace::from_json(&data)
                .with_context(|| format!("parsing trace {}", trace.display()))?;
            let mut stage = Stage::new(load_config(config.as_deref())?)?;
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            let mut rng = SmallRng::seed_from_u64(seed);
            info!(seed, samples = trace_data.samples.len(), "replaying trace");

            let frames = replay(trace_data, &mut stage, &mut rng);
            let mut out = BufWriter::new(std::io::stdout().lock());
            for frame in &frames {
                serde_json::to_writer(&mut out, frame)?;
                writeln!(out)?;
            }
            out.flush()?;
            Ok(())
        }
    }
}
