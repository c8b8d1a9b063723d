//! Charm Event Simulator
//!
//! Generates a lifecycle-valid event trace and prints it as text or JSON.

use charm_sim::{CharmEventSimulator, Platform, Result, SimulatorConfig};
use clap::Parser;

/// Charm Event Simulator - pseudorandom lifecycle traces for charm tests
#[derive(Parser, Debug)]
#[command(name = "charm_sim")]
#[command(about = "Generate a pseudorandom, lifecycle-valid charm event trace")]
struct Args {
    /// TOML file with the simulator configuration
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Use the built-in demo deployment instead of the default one
    #[arg(long, conflicts_with = "config")]
    demo: bool,

    /// Random seed for reproducible traces
    #[arg(long)]
    seed: Option<u64>,

    /// Override the operation phase length (actions run = value + 1)
    #[arg(long)]
    max_operation_length: Option<u32>,

    /// Platform: k8s or lxd
    #[arg(long, value_parser = ["k8s", "lxd"])]
    platform: Option<String>,

    /// Output format: text or json
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulatorConfig::load(path)?,
        None if args.demo => SimulatorConfig::demo(),
        None => SimulatorConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(length) = args.max_operation_length {
        config.max_operation_length = length;
    }
    match args.platform.as_deref() {
        Some("lxd") => config.platform = Platform::Lxd,
        Some("k8s") => config.platform = Platform::K8s,
        _ => {}
    }

    let mut sim = CharmEventSimulator::new(config)?;
    sim.run()?;
    tracing::info!(seed = sim.seed(), "trace generated");

    if args.format == "json" {
        println!("{}", sim.scenario().to_json()?);
    } else {
        println!("seed: {}", sim.seed());
        println!("{}", sim.scenario());
    }
    Ok(())
}
