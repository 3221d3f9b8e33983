#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the UK crime dashboard.
//!
//! Loads the configured incident, district and boundary files once, then
//! either answers a single query as JSON on stdout or, with no subcommand,
//! runs the interactive prompt loop.
//!
//! Uses `indicatif-log-bridge` (via [`uk_crime_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the loading progress bar never fight for the terminal.

use std::io::Read as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use uk_crime_analytics_models::CrimeTypeSelection;
use uk_crime_cli_utils::IndicatifProgress;
use uk_crime_dashboard::Dashboard;
use uk_crime_dashboard::config::{CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH, DashboardConfig};
use uk_crime_dashboard_models::{ControlState, ViewMode};
use uk_crime_dataset_models::Granularity;
use uk_crime_geocoder::PostcodeLookup;
use uk_crime_geocoder::postcodes_io::PostcodesIoClient;

#[derive(Parser)]
#[command(name = "uk_crime", about = "UK street crime dashboard", version)]
struct Cli {
    /// Dashboard configuration file
    #[arg(long, global = true, env = CONFIG_ENV_VAR, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Never call the postcode lookup service
    #[arg(long, global = true)]
    offline: bool,

    /// Print compact instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print control options and defaults
    Controls,
    /// Per-region counts and rates for a year
    Aggregate {
        /// Occurrence year
        #[arg(long)]
        year: i32,
        /// Crime type to include (repeatable, all types if omitted)
        #[arg(long = "crime-type")]
        crime_types: Vec<String>,
        /// Aggregation level (`district` or `small_area`)
        #[arg(long, default_value = "district")]
        granularity: Granularity,
        /// Postcode to center the map on
        #[arg(long)]
        postcode: Option<String>,
    },
    /// Individual incidents for a year and month
    Incidents {
        /// Occurrence year
        #[arg(long)]
        year: i32,
        /// Occurrence month (1-12)
        #[arg(long)]
        month: u8,
        /// Crime type to include (repeatable, all types if omitted)
        #[arg(long = "crime-type")]
        crime_types: Vec<String>,
        /// Postcode to center the map on
        #[arg(long)]
        postcode: Option<String>,
    },
    /// Compute the view for a JSON control state
    View {
        /// File holding the control state, `-` for stdin
        #[arg(default_value = "-")]
        state: PathBuf,
    },
    /// Prompt for controls and print views
    Interactive,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = uk_crime_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = DashboardConfig::load(&cli.config)?;

    let lookup: Option<Box<dyn PostcodeLookup>> = if cli.offline {
        None
    } else {
        Some(Box::new(PostcodesIoClient::from_registry()?))
    };

    let progress = IndicatifProgress::rows_bar(&multi, "Loading incidents");
    let dashboard = Dashboard::load(&config, lookup, &progress)?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Controls => print_json(&dashboard.controls()?, cli.compact)?,
        Commands::Aggregate {
            year,
            crime_types,
            granularity,
            postcode,
        } => {
            let state = ControlState {
                mode: ViewMode::Aggregate,
                year,
                month: 1,
                crime_types: selection(crime_types),
                granularity,
                postcode,
            };
            print_json(&dashboard.update(&state).await?, cli.compact)?;
        }
        Commands::Incidents {
            year,
            month,
            crime_types,
            postcode,
        } => {
            let state = ControlState {
                mode: ViewMode::Individual,
                year,
                month,
                crime_types: selection(crime_types),
                granularity: Granularity::District,
                postcode,
            };
            print_json(&dashboard.update(&state).await?, cli.compact)?;
        }
        Commands::View { state } => {
            let text = if state.as_os_str() == "-" {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                text
            } else {
                std::fs::read_to_string(&state)?
            };
            let state: ControlState = serde_json::from_str(&text)?;
            print_json(&dashboard.update(&state).await?, cli.compact)?;
        }
        Commands::Interactive => uk_crime_dashboard::interactive::run(&dashboard).await?,
    }

    Ok(())
}

/// No `--crime-type` flags means "select all".
fn selection(crime_types: Vec<String>) -> CrimeTypeSelection {
    if crime_types.is_empty() {
        CrimeTypeSelection::All
    } else {
        CrimeTypeSelection::Only(crime_types.into_iter().collect())
    }
}

fn print_json(value: &impl Serialize, compact: bool) -> Result<(), serde_json::Error> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_aggregate_flags() {
        let cli = Cli::parse_from([
            "uk_crime",
            "--offline",
            "aggregate",
            "--year",
            "2020",
            "--crime-type",
            "Burglary",
            "--crime-type",
            "Robbery",
            "--granularity",
            "small_area",
        ]);
        assert!(cli.offline);
        let Some(Commands::Aggregate {
            year,
            crime_types,
            granularity,
            postcode,
        }) = cli.command
        else {
            panic!("expected aggregate");
        };
        assert_eq!(year, 2020);
        assert_eq!(crime_types, ["Burglary", "Robbery"]);
        assert_eq!(granularity, Granularity::SmallArea);
        assert!(postcode.is_none());
    }

    #[test]
    fn no_subcommand_is_interactive() {
        let cli = Cli::parse_from(["uk_crime", "--config", "other.toml"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }

    #[test]
    fn empty_crime_type_list_selects_all() {
        assert_eq!(selection(Vec::new()), CrimeTypeSelection::All);
        assert!(matches!(
            selection(vec!["Drugs".to_string()]),
            CrimeTypeSelection::Only(types) if types.len() == 1
        ));
    }
}
