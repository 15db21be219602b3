use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use gossip_convergence::manager::config::{
    DEFAULT_RNG_SEED_MULTIPLIER, DEFAULT_SEED_COUNT, SimulationConfig,
};
use gossip_convergence::manager::report::SimulationReport;
use gossip_convergence::manager::service::GossipManager;
use gossip_convergence::member::selection::{DedupKey, TargetBound};
use gossip_convergence::sim::scheduler::SequentialSimulation;
use std::time::Duration;

const USAGE: &str = "Usage: gossip-sim <interval-ms> <max-iterations> <cluster-size>";

#[derive(Parser)]
#[command(
    name = "gossip-sim",
    version,
    about = "Anti-entropy gossip membership convergence simulator",
    override_usage = "gossip-sim <interval-ms> <max-iterations> <cluster-size> [OPTIONS]"
)]
struct Cli {
    /// Wait between gossip rounds, in milliseconds.
    #[arg(value_name = "interval-ms")]
    interval_ms: u64,

    /// Round budget per member.
    #[arg(value_name = "max-iterations")]
    max_iterations: u32,

    /// Number of members in the cluster.
    #[arg(value_name = "cluster-size")]
    cluster_size: usize,

    /// Number of seed members whose ids bootstrap every view.
    #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
    seed_count: usize,

    /// How the random gossip target position is bounded.
    #[arg(long, value_enum, default_value_t = TargetBoundArg::ExcludeSelf)]
    target_bound: TargetBoundArg,

    /// What the visited history remembers.
    #[arg(long, value_enum, default_value_t = DedupArg::Peer)]
    dedup: DedupArg,

    /// Each member seeds its RNG with `id * seed-multiplier`.
    #[arg(long, default_value_t = DEFAULT_RNG_SEED_MULTIPLIER)]
    seed_multiplier: u64,

    /// Abort the run after this many seconds; unfinished members count as failed.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Run on the single-threaded reference scheduler instead of one task per member.
    #[arg(long)]
    deterministic: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Log level for diagnostics written to stderr.
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetBoundArg {
    /// Draw from every position except the last one in the view.
    ExcludeLast,
    /// Draw from every peer except the member itself.
    ExcludeSelf,
}

#[derive(Clone, Copy, ValueEnum)]
enum DedupArg {
    /// Remember drawn view positions.
    Index,
    /// Remember contacted peers.
    Peer,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            seed_count: self.seed_count,
            target_bound: match self.target_bound {
                TargetBoundArg::ExcludeLast => TargetBound::ExcludeLast,
                TargetBoundArg::ExcludeSelf => TargetBound::ExcludeSelf,
            },
            dedup_key: match self.dedup {
                DedupArg::Index => DedupKey::Index,
                DedupArg::Peer => DedupKey::PeerIdentity,
            },
            rng_seed_multiplier: self.seed_multiplier,
            convergence_timeout: self.timeout_secs.map(Duration::from_secs),
            ..SimulationConfig::new(
                Duration::from_millis(self.interval_ms),
                self.max_iterations,
                self.cluster_size,
            )
        }
    }
}

/// Parses the command line. Anything but exactly three positionals is rejected.
fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Exit status for a parse failure: help and version requests succeed, all else is a usage error.
fn exit_status(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) if exit_status(&e) == 0 => e.exit(),
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            std::process::exit(exit_status(&e));
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    tracing::info!("Starting simulation: {:?}", config);

    let report = if cli.deterministic {
        SequentialSimulation::new(config)?.run()?
    } else {
        let manager = GossipManager::new(config)?;

        let cancel = manager.cancel_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling simulation");
                cancel.cancel();
            }
        });

        manager.run().await?
    };

    print_report(&report, cli.json)
}

fn print_report(report: &SimulationReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
