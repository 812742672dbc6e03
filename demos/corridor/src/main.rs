//! corridor: load a small signalized crossing with every loading strategy.
//!
//! Usage: `corridor [config.json]`.  The optional JSON file holds a
//! `LoadingConfig`; missing fields take their defaults.  Cumulative link
//! curves and step summaries are written to `output/corridor/<strategy>/`.
//! Set `RUST_LOG=debug` for per-step logging.

mod network;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dnl_core::{LinkId, LoadingConfig};
use dnl_loading::{BasicDnl, FastSweepingIltm, IltmDnl, LoadingBuilder, LoadingStrategy, PqfsIltm};
use dnl_output::{CsvWriter, LoadingOutputObserver};

use network::{build_network, demand, turning_fractions};

// ── Constants ─────────────────────────────────────────────────────────────────

/// One hour of 6 s steps.
const DEFAULT_STEPS: usize = 600;
const OUTPUT_DIR:    &str  = "output/corridor";

/// Sink connectors of the crossing, see [`network::build_network`].
const SINKS: [LinkId; 2] = [LinkId(6), LinkId(7)];

// ── Configuration ─────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<LoadingConfig> {
    let Some(path) = path else {
        return Ok(LoadingConfig { total_steps: DEFAULT_STEPS, ..LoadingConfig::default() });
    };
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn strategies() -> Vec<Box<dyn LoadingStrategy>> {
    vec![
        Box::new(BasicDnl),
        Box::new(IltmDnl::default()),
        Box::new(FastSweepingIltm::default()),
        Box::new(PqfsIltm::default()),
    ]
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    let odm = demand(config.total_steps, config.step_secs);
    info!(
        steps = config.total_steps,
        step_secs = config.step_secs,
        vehicles = odm.total_vehicles(config.step_hours()),
        "corridor demo"
    );

    println!("{:<22} {:>6} {:>10} {:>9} {:>9} {:>9}", "Strategy", "Steps", "Iterations", "To D0", "To D1", "Time (s)");
    println!("{}", "-".repeat(70));

    for strategy in strategies() {
        let name = strategy.name();
        let mut loader = LoadingBuilder::new(config.clone(), build_network()?, odm.clone(), strategy)
            .turning_fractions(turning_fractions(config.total_steps)?)
            .build()?;

        let dir = Path::new(OUTPUT_DIR).join(name);
        std::fs::create_dir_all(&dir)?;
        let mut obs = LoadingOutputObserver::new(CsvWriter::new(&dir)?, &config);

        let t0 = Instant::now();
        let report = loader.load_network_with(&mut obs)?;
        let elapsed = t0.elapsed();

        if let Some(e) = obs.take_error() {
            eprintln!("output error: {e}");
        }
        for diagnostic in loader.check_destination_inflows() {
            warn!(%diagnostic, "impure sink");
        }

        let arrived = SINKS.map(|l| {
            let link = loader.network().link(l);
            link.cumulative_outflow[link.steps()]
        });
        println!(
            "{:<22} {:>6} {:>10} {:>9.1} {:>9.1} {:>9.3}",
            name,
            report.steps_simulated,
            report.iterations,
            arrived[0],
            arrived[1],
            elapsed.as_secs_f64(),
        );
        if !loader.diagnostics().is_empty() {
            println!("  {} diagnostics", loader.diagnostics().len());
        }
    }

    Ok(())
}
