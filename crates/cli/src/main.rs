//! specdex CLI - spectral indices from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array1, ArrayD, Axis};
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use specdex_algorithms::imagery::{ComputeOptions, Computed, Output, SpectralEngine};
use specdex_catalog::{Catalog, CatalogSource, IndexFilter, RefreshOutcome, RemoteOptions};
use specdex_core::Params;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "specdex")]
#[command(author, version, about = "Spectral indices over the Awesome Spectral Indices catalog", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Load the upstream catalog instead of the bundled one
    #[arg(long, global = true)]
    online: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List spectral indices
    Indices {
        /// Application domain (vegetation, water, burn, ...)
        #[arg(short, long)]
        domain: Option<String>,
        /// Platform the index must support (e.g. Sentinel-2)
        #[arg(short, long)]
        platform: Option<String>,
        /// Only indices computable from these symbols, e.g. N,R,G
        #[arg(short, long, value_delimiter = ',')]
        bands: Option<Vec<String>>,
    },
    /// Describe an index or kernel
    Show {
        /// Index or kernel name
        name: String,
    },
    /// List standard bands
    Bands,
    /// List constants and their defaults
    Constants,
    /// Compute one or more indices
    Compute {
        /// Index names, comma separated
        names: String,
        /// Inputs as SYMBOL=VALUE; VALUE may be a comma separated series
        #[arg(required = true)]
        inputs: Vec<String>,
        /// Return one result per index instead of a stacked array
        #[arg(long)]
        no_origin: bool,
    },
    /// Compute a kernel
    Kernel {
        /// Kernel name (linear, RBF, poly)
        name: String,
        /// Inputs as SYMBOL=VALUE
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Check whether the upstream catalog can be fetched
    Refresh {
        /// Per-request timeout in seconds
        #[arg(short, long, default_value = "30")]
        timeout: u64,
        /// Retries on timeouts and connection errors
        #[arg(short, long, default_value = "3")]
        retries: u32,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn load_engine(online: bool) -> SpectralEngine {
    if !online {
        return SpectralEngine::bundled();
    }
    let pb = spinner("Fetching catalog...");
    let engine = SpectralEngine::load(&CatalogSource::Online(RemoteOptions::default()));
    pb.finish_and_clear();
    engine
}

/// A command-line input: one number or a series.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Scalar(f64),
    Series(Vec<f64>),
}

fn parse_input(s: &str) -> Result<(String, Input)> {
    let (name, value) = s
        .split_once('=')
        .with_context(|| format!("Input must be SYMBOL=VALUE, got: {}", s))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Missing symbol in: {}", s);
    }
    let parse = |v: &str| -> Result<f64> {
        v.trim()
            .parse()
            .with_context(|| format!("Invalid number for {}: {}", name, v))
    };
    let input = if value.contains(',') {
        Input::Series(value.split(',').map(parse).collect::<Result<_>>()?)
    } else {
        Input::Scalar(parse(value)?)
    };
    Ok((name.to_string(), input))
}

fn split_names(names: &str) -> Vec<String> {
    names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect()
}

fn parse_inputs(inputs: &[String]) -> Result<Vec<(String, Input)>> {
    inputs.iter().map(|s| parse_input(s)).collect()
}

fn has_series(inputs: &[(String, Input)]) -> bool {
    inputs.iter().any(|(_, i)| matches!(i, Input::Series(_)))
}

fn scalar_params(inputs: Vec<(String, Input)>) -> Params<f64> {
    inputs
        .into_iter()
        .fold(Params::new(), |params, (name, input)| match input {
            Input::Scalar(v) => params.value(name, v),
            Input::Series(_) => params,
        })
}

fn array_params(inputs: Vec<(String, Input)>) -> Params<ArrayD<f64>> {
    inputs
        .into_iter()
        .fold(Params::new(), |params, (name, input)| match input {
            Input::Scalar(v) => params.scalar(name, v),
            Input::Series(v) => params.value(name, Array1::from(v).into_dyn()),
        })
}

fn print_scalars(computed: &Computed<f64>) {
    match computed.output() {
        Output::Single(v) => println!("{} = {}", computed.names()[0], v),
        Output::Sequence(values) => {
            for (name, v) in computed.names().iter().zip(values) {
                println!("{} = {}", name, v);
            }
        }
        Output::Stacked(never) => match *never {},
    }
}

fn print_arrays(computed: &Computed<ArrayD<f64>>) {
    match computed.output() {
        Output::Single(v) => println!("{} = {}", computed.names()[0], v),
        Output::Sequence(values) => {
            for (name, v) in computed.names().iter().zip(values) {
                println!("{} = {}", name, v);
            }
        }
        Output::Stacked(stacked) => {
            println!("stacked {:?}", stacked.shape());
            for (name, row) in computed.names().iter().zip(stacked.axis_iter(Axis(0))) {
                println!("  {} = {}", name, row);
            }
        }
    }
}

fn show_definition(catalog: &Catalog, name: &str) -> Result<()> {
    let (kind, def) = match catalog.indices().get(name) {
        Some(def) => ("Index", def),
        None => (
            "Kernel",
            catalog
                .lookup_kernel(name)
                .with_context(|| format!("{} is neither an index nor a kernel", name))?,
        ),
    };
    println!("{}: {}", kind, def.name);
    if !def.long_name.is_empty() {
        println!("  Name: {}", def.long_name);
    }
    println!("  Formula: {}", def.formula().source());
    println!("  Symbols:");
    for symbol in def.symbols() {
        match catalog.constants().get(symbol) {
            Some(c) => match c.default {
                Some(default) => println!("    {} (constant, default {})", symbol, default),
                None => println!("    {} (constant, required)", symbol),
            },
            None => println!("    {}", symbol),
        }
    }
    if !def.application_domain.is_empty() {
        println!("  Domain: {}", def.application_domain);
    }
    if !def.platforms.is_empty() {
        println!("  Platforms: {}", def.platforms.join(", "));
    }
    if !def.reference.is_empty() {
        println!("  Reference: {}", def.reference);
    }
    if !def.contributor.is_empty() {
        println!("  Contributor: {}", def.contributor);
    }
    if !def.date_of_addition.is_empty() {
        println!("  Added: {}", def.date_of_addition);
    }
    Ok(())
}

fn wavelength_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("{}-{} nm", lo, hi),
        _ => "-".to_string(),
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Indices {
            domain,
            platform,
            bands,
        } => {
            let engine = load_engine(cli.online);
            let catalog = engine.catalog();
            let mut filter = IndexFilter::new();
            if let Some(domain) = domain {
                filter = filter.domain(domain);
            }
            if let Some(platform) = platform {
                filter = filter.platform(platform);
            }
            if let Some(bands) = bands {
                filter = filter.computable_from(bands);
            }
            let found = catalog.list_indices(&filter);
            for def in &found {
                println!(
                    "{:<12} {:<12} {}",
                    def.name, def.application_domain, def.long_name
                );
            }
            println!("\n{} of {} indices", found.len(), catalog.indices().len());
        }

        Commands::Show { name } => {
            let engine = load_engine(cli.online);
            show_definition(&engine.catalog(), &name)?;
        }

        Commands::Bands => {
            let engine = load_engine(cli.online);
            for (name, band) in engine.catalog().bands().iter() {
                let platforms: Vec<&str> = band.platforms.keys().map(String::as_str).collect();
                println!(
                    "{:<5} {:<12} {:<14} {}",
                    name,
                    band.common_name,
                    wavelength_range(band.min_wavelength, band.max_wavelength),
                    platforms.join(", ")
                );
            }
        }

        Commands::Constants => {
            let engine = load_engine(cli.online);
            for (name, constant) in engine.catalog().constants().iter() {
                let default = constant
                    .default
                    .map_or_else(|| "required".to_string(), |d| d.to_string());
                println!("{:<6} {:<10} {}", name, default, constant.description);
            }
        }

        Commands::Compute {
            names,
            inputs,
            no_origin,
        } => {
            let names = split_names(&names);
            let inputs = parse_inputs(&inputs)?;
            let engine = load_engine(cli.online);
            let options = ComputeOptions::default().return_origin(!no_origin);
            let start = Instant::now();
            if has_series(&inputs) {
                let params = array_params(inputs);
                let computed = engine
                    .compute_index(names, &params, &Params::new(), &options)
                    .context("Failed to compute indices")?;
                print_arrays(&computed);
            } else {
                let params = scalar_params(inputs);
                let computed = engine
                    .compute_index(names, &params, &Params::new(), &options)
                    .context("Failed to compute indices")?;
                print_scalars(&computed);
            }
            println!("  Processing time: {:.2?}", start.elapsed());
        }

        Commands::Kernel { name, inputs } => {
            let inputs = parse_inputs(&inputs)?;
            let engine = load_engine(cli.online);
            let options = ComputeOptions::default();
            let start = Instant::now();
            if has_series(&inputs) {
                let params = array_params(inputs);
                let computed = engine
                    .compute_kernel(name, &params, &Params::new(), &options)
                    .context("Failed to compute kernel")?;
                print_arrays(&computed);
            } else {
                let params = scalar_params(inputs);
                let computed = engine
                    .compute_kernel(name, &params, &Params::new(), &options)
                    .context("Failed to compute kernel")?;
                print_scalars(&computed);
            }
            println!("  Processing time: {:.2?}", start.elapsed());
        }

        Commands::Refresh { timeout, retries } => {
            let options = RemoteOptions {
                request_timeout: Duration::from_secs(timeout),
                max_retries: retries,
                ..RemoteOptions::default()
            };
            let engine = SpectralEngine::bundled();
            let pb = spinner("Fetching catalog...");
            let start = Instant::now();
            let outcome = engine.refresh(&options);
            pb.finish_and_clear();
            match outcome {
                RefreshOutcome::Updated(catalog) => {
                    info!("Remote catalog is usable");
                    println!(
                        "Fetched {} indices, {} bands, {} constants",
                        catalog.indices().len(),
                        catalog.bands().len(),
                        catalog.constants().len()
                    );
                }
                RefreshOutcome::Unchanged(reason) => {
                    println!("Remote catalog unavailable: {}", reason);
                    println!("Keeping bundled catalog ({} indices)", engine.catalog().indices().len());
                }
            }
            println!("  Processing time: {:.2?}", start.elapsed());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_input() {
        let (name, input) = parse_input("N=0.6723").unwrap();
        assert_eq!(name, "N");
        assert_eq!(input, Input::Scalar(0.6723));
    }

    #[test]
    fn parses_series_input() {
        let (name, input) = parse_input("R= 0.1, 0.2,0.3").unwrap();
        assert_eq!(name, "R");
        assert_eq!(input, Input::Series(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_input("N").is_err());
        assert!(parse_input("=0.5").is_err());
        assert!(parse_input("N=abc").is_err());
        assert!(parse_input("N=0.1,,0.2").is_err());
    }

    #[test]
    fn scalars_in_series_mode_are_broadcast() {
        let inputs = parse_inputs(&["N=0.6,0.8".to_string(), "L=0.5".to_string()]).unwrap();
        assert!(has_series(&inputs));
        let params = array_params(inputs);
        assert!(params.get("L").is_some_and(|op| op.is_scalar()));
        assert!(params.get("N").is_some_and(|op| !op.is_scalar()));
    }

    #[test]
    fn cli_parses_comma_separated_names() {
        let cli = Cli::try_parse_from(["specdex", "compute", "NDVI,SAVI", "N=0.6", "R=0.1"]).unwrap();
        match cli.command {
            Commands::Compute { names, inputs, no_origin } => {
                assert_eq!(split_names(&names), vec!["NDVI", "SAVI"]);
                assert_eq!(inputs.len(), 2);
                assert!(!no_origin);
            }
            _ => panic!("expected compute"),
        }
    }
}
