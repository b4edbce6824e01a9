//! factorlab CLI.
//!
//! Usage: `factorlab run [--config PATH] [--data DIR] [--results DIR]`
//!        `factorlab composites [--weight-method METHOD|all] [--criterion METRIC] [--recompute]`

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use factorlab::{
    composite::WeightScheme,
    config::{DEFAULT_CONFIG_PATH, Settings},
    pipeline::{Orchestrator, WeightInputs},
    store::{ArtifactStore, FileDataSource},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "factorlab")]
#[command(about = "Factor analytics and composite construction", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    paths: Paths,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Paths {
    /// Configuration file (defaults apply when absent)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory of input parquet datasets
    #[arg(long, global = true, default_value = "data")]
    data: PathBuf,

    /// Directory for persisted artifacts
    #[arg(long, global = true, default_value = "results")]
    results: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute factors, analytics, correlations and rolling IC
    Run,

    /// Build and analyze composites
    Composites {
        /// Weighting method (equal, inv_vol, ic_ir or all); the configured method when absent
        #[arg(short, long)]
        weight_method: Option<String>,

        /// Summary metric used to pick the best method
        #[arg(short, long, default_value = "ic_ir")]
        criterion: String,

        /// Recompute factors and analytics instead of loading persisted ones
        #[arg(long)]
        recompute: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.paths.config)
        .with_context(|| format!("loading {}", cli.paths.config.display()))?;
    let orchestrator = Orchestrator::new(
        Arc::new(settings),
        Arc::new(FileDataSource::new(&cli.paths.data)),
        ArtifactStore::new(&cli.paths.results),
    );

    match cli.command {
        Commands::Run => run(&orchestrator),
        Commands::Composites { weight_method, criterion, recompute } => {
            composites(&orchestrator, weight_method.as_deref(), &criterion, recompute)
        }
    }
}

fn run(orchestrator: &Orchestrator) -> Result<()> {
    let report = orchestrator.run_all()?;
    println!("\n{:<28} {:>10} {:>10} {:>10} {:>10}", "factor", "mean_ic", "ic_ir", "ls_sharpe", "ff_alpha");
    for (name, bundle) in &report.analytics {
        let summary = &bundle.summary;
        println!(
            "{:<28} {:>10.4} {:>10.3} {:>10.3} {:>10.5}",
            name,
            summary.ic.mean_ic,
            summary.ic.ic_ir,
            summary.metric("ls_sharpe").unwrap_or(f64::NAN),
            summary.metric("ff_alpha").unwrap_or(f64::NAN),
        );
    }
    println!("\nresults in {}", orchestrator.store().root().display());
    Ok(())
}

fn composites(
    orchestrator: &Orchestrator,
    weight_method: Option<&str>,
    criterion: &str,
    recompute: bool,
) -> Result<()> {
    let (run, inputs) = if recompute {
        let run = orchestrator.compute_factors()?;
        let bundles = orchestrator.run_analytics(&run)?;
        (run, WeightInputs::from_bundles(&bundles))
    } else {
        let run = orchestrator.load_factors().context("no persisted factors, run `factorlab run` first")?;
        (run, orchestrator.registry_weight_inputs()?)
    };

    let schemes: Vec<WeightScheme> = match weight_method {
        None => {
            let pass = orchestrator.run_composites(&run, &inputs, None)?;
            for name in &pass.skipped {
                println!("{name}: skipped, too few valid dates");
            }
            for (name, bundle) in &pass.analytics {
                println!("{name}: {criterion} = {:.4}", bundle.summary.metric(criterion).unwrap_or(f64::NAN));
            }
            return Ok(());
        }
        Some(method) if method.eq_ignore_ascii_case("all") => WeightScheme::ALL.to_vec(),
        Some(method) => vec![method.parse()?],
    };

    info!(schemes = schemes.len(), criterion, "selecting weighting schemes");
    let selection = orchestrator.select_weights(&run, &inputs, &schemes, criterion)?;
    println!("\n{:<32} {:>10} {:>12}", "composite", "best", criterion);
    for (name, scheme) in &selection.best {
        let value = selection
            .runs
            .get(scheme)
            .and_then(|pass| pass.analytics.get(name))
            .and_then(|bundle| bundle.summary.metric(criterion))
            .unwrap_or(f64::NAN);
        println!("{name:<32} {:>10} {value:>12.4}", scheme.to_string());
    }
    Ok(())
}
