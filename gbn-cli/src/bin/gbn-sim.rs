//! GBN Simulator - runs two Go-Back-N endpoints over an unreliable link
//!
//! Parameters come from an optional TOML file and are overridden by flags.

use clap::Parser;
use gbn_cli::{display_report, display_summary, Config};
use gbn::sim::{FaultProfile, Simulation};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gbn-sim")]
#[command(about = "Go-Back-N ARQ simulator", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Payloads generated by each sending entity
    #[arg(short, long)]
    messages: Option<usize>,

    /// Sender window size
    #[arg(short, long)]
    window_size: Option<usize>,

    /// Retransmission timer interval in milliseconds
    #[arg(long)]
    timer_interval_ms: Option<u64>,

    /// Loss probability applied to every frame
    #[arg(long)]
    loss: Option<f64>,

    /// Bit-flip probability applied to every frame
    #[arg(long)]
    corruption: Option<f64>,

    /// Print only a one-line summary
    #[arg(short, long)]
    quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_example_config: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        let sim = &mut config.simulation;
        if let Some(seed) = self.seed {
            sim.seed = seed;
        }
        if let Some(messages) = self.messages {
            sim.workload.messages = messages;
        }
        if let Some(window_size) = self.window_size {
            sim.endpoint.window_size = window_size;
        }
        if let Some(interval) = self.timer_interval_ms {
            sim.endpoint.timer_interval_ms = interval;
        }
        if self.loss.is_some() || self.corruption.is_some() {
            for profile in [&mut sim.link.data, &mut sim.link.ack] {
                *profile = FaultProfile::new(
                    self.loss.unwrap_or(profile.loss_probability),
                    self.corruption.unwrap_or(profile.corruption_probability),
                );
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_example_config {
        print!("{}", Config::example().to_toml()?);
        return Ok(());
    }

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let report = Simulation::new(config.simulation)?.run();

    if args.quiet {
        println!("{}", display_summary(&report));
    } else {
        display_report(&report);
    }

    if !report.is_complete() {
        anyhow::bail!("Not every payload was delivered in order before the time limit");
    }
    Ok(())
}
