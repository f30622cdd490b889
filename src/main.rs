use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;

use sattrack::predict::{
    check_window_hours, generate_ephemeris, predict_passes, Satellite, SatelliteConfig, TleLoader,
};
use sattrack::web::api::parse_time;
use sattrack::web::{self, Config};

#[derive(Parser)]
#[command(name = "sattrack")]
#[command(about = "Satellite pass prediction and ground-track ephemeris")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(long, default_value = "config.yaml")]
        config: String,
    },
    /// Print upcoming passes as JSON
    Passes {
        #[arg(long, default_value = "config.yaml")]
        config: String,
        /// Window start (RFC 3339), defaults to now
        #[arg(long, value_parser = parse_time)]
        start: Option<DateTime<Utc>>,
        /// Window length in hours
        #[arg(long)]
        hours: Option<f64>,
    },
    /// Print the ground-track ephemeris as JSON
    Ephemeris {
        #[arg(long, default_value = "config.yaml")]
        config: String,
        /// Window center (RFC 3339), defaults to now
        #[arg(long, value_parser = parse_time)]
        center: Option<DateTime<Utc>>,
        #[arg(long)]
        hours_radius: Option<f64>,
        /// Sample spacing in seconds
        #[arg(long)]
        step: Option<u32>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config),
        Commands::Passes {
            config,
            start,
            hours,
        } => passes(&config, start, hours),
        Commands::Ephemeris {
            config,
            center,
            hours_radius,
            step,
        } => ephemeris(&config, center, hours_radius, step),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            None
        }
    }
}

fn load_satellites(config: &Config) -> Option<Vec<Satellite>> {
    let mut catalog = TleLoader::new(config.tle.file.clone());
    if let Err(e) = catalog.load_all() {
        eprintln!("Error loading TLEs: {}", e);
        return None;
    }

    let satellite_config = match SatelliteConfig::load(&config.satellites_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading satellite config: {}", e);
            return None;
        }
    };

    Some(satellite_config.enrich(&catalog, config.predict.default_transmission_radius_km))
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let observer = match config.observer() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config, observer)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn passes(path: &str, start: Option<DateTime<Utc>>, hours: Option<f64>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let observer = match config.observer() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(satellites) = load_satellites(&config) else {
        return ExitCode::FAILURE;
    };

    let hours = match check_window_hours(hours.unwrap_or(config.predict.window_hours)) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("--hours: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let passes = predict_passes(&satellites, &observer, start.unwrap_or_else(Utc::now), hours);
    log::info!("{} passes for {} satellites", passes.len(), satellites.len());
    print_json(&passes)
}

fn ephemeris(
    path: &str,
    center: Option<DateTime<Utc>>,
    hours_radius: Option<f64>,
    step: Option<u32>,
) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(satellites) = load_satellites(&config) else {
        return ExitCode::FAILURE;
    };

    let step = step.unwrap_or(config.ephemeris.step_seconds);
    if step == 0 {
        eprintln!("--step must be at least 1 second");
        return ExitCode::FAILURE;
    }

    let hours_radius = match check_window_hours(hours_radius.unwrap_or(config.ephemeris.hours_radius)) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("--hours-radius: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ephemeris = generate_ephemeris(&satellites, center.unwrap_or_else(Utc::now), hours_radius, step);
    print_json(&ephemeris)
}
