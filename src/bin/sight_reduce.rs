//! Sight reduction tool
//!
//! Reads a JSON request with an assumed position and one or three
//! observations, and prints the line of position or fix as JSON.
//!
//! ```text
//! {
//!   "assumed": {"latitude_deg": 49.5, "longitude_deg": 0.1, "convention": "west_positive"},
//!   "observations": [
//!     {"utc": "2025-05-17 21:59:31", "ra_deg": 208.488, "dec_deg": 4.968, "observed_altitude_deg": 35.22}
//!   ]
//! }
//! ```
//!
//! Usage:
//!   cargo run --bin sight_reduce -- [--method least-squares] [--pretty] request.json
//!   cargo run --bin sight_reduce -- --demo

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use log::{error, info};
use serde::{Deserialize, Serialize};
use sightfix::coordinates::{CelestialTarget, GeodeticPosition};
use sightfix::fix::FixStrategy;
use sightfix::navigator::{
    NavigationFailure, Navigator, NavigatorConfig, ObservationInput, ProcessedObservation,
};
use sightfix::sight::synthetic::SyntheticSightConfig;
use sightfix::time::Instant;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Celestial sight reduction and position fixing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Request file; reads stdin when omitted
    request: Option<PathBuf>,

    /// Navigator configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the fix method from the configuration
    #[arg(short, long, value_enum)]
    method: Option<Method>,

    /// Indent the JSON output
    #[arg(short, long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Reduce three synthetic sights instead of reading a request
    #[arg(long, action = ArgAction::SetTrue)]
    demo: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Method {
    Relaxation,
    LeastSquares,
}

#[derive(Serialize, Deserialize, Debug)]
struct Request {
    assumed: GeodeticPosition,
    observations: Vec<ObservationInput>,
}

#[derive(Serialize, Debug)]
struct FailureReport<'a> {
    error: String,
    observations: &'a [ProcessedObservation],
}

fn load_config(args: &Args) -> Result<NavigatorConfig> {
    let mut config = match &args.config {
        Some(path) => NavigatorConfig::from_json_file(path)?,
        None => NavigatorConfig::default(),
    };

    match args.method {
        Some(Method::LeastSquares) => config.strategy = FixStrategy::LeastSquares,
        // Keep configured relaxation parameters when the method already matches
        Some(Method::Relaxation) if !matches!(config.strategy, FixStrategy::Relaxation(_)) => {
            config.strategy = FixStrategy::default();
        }
        _ => {}
    }

    Ok(config)
}

fn load_request(args: &Args) -> Result<Request> {
    let content = match &args.request {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(serde_json::from_str(&content)?)
}

/// Sights of Arcturus, Vega and Regulus taken about 20 NM from the assumed position
fn demo_request() -> Result<Request> {
    let assumed = GeodeticPosition::west_positive(49.5, 0.1)?;
    let truth = GeodeticPosition::west_positive(49.8, 0.3)?;
    let instant = Instant::parse("2025-05-17 21:59:31")?;
    let targets = [
        CelestialTarget::new(213.915, 19.182)?,
        CelestialTarget::new(279.234, 38.784)?,
        CelestialTarget::new(152.093, 11.967)?,
    ];

    let observations = SyntheticSightConfig::new()
        .with_seed(42)
        .with_altitude_noise_arcmin(0.2)
        .generate(&truth, instant, &targets)?;

    Ok(Request {
        assumed,
        observations: observations.iter().map(ObservationInput::from).collect(),
    })
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn report_failure(failure: &NavigationFailure, pretty: bool) -> Result<()> {
    error!("{}", failure);
    let report = FailureReport {
        error: failure.to_string(),
        observations: &failure.observations,
    };
    println!("{}", to_json(&report, pretty)?);
    Ok(())
}

fn run(args: &Args) -> Result<bool> {
    let config = load_config(args)?;
    let request = if args.demo {
        demo_request()?
    } else {
        load_request(args)?
    };

    info!(
        "Reducing {} observation(s) from {}",
        request.observations.len(),
        request.assumed
    );

    let navigator = Navigator::new(config);
    match navigator.reduce_inputs(&request.observations, &request.assumed) {
        Ok(report) => {
            println!("{}", to_json(&report, args.pretty)?);
            Ok(true)
        }
        Err(failure) => {
            report_failure(&failure, args.pretty)?;
            Ok(false)
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
