use std::io;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use kidfund::api::{
    self, AllocationArgs, BondArgs, CalculatorArgs, SeriesArgs, parse_consent_level,
};
use kidfund::core::{ConsentLevel, SessionConfig};
use kidfund::prompt::{WizardOutcome, run_wizard};

#[derive(Parser, Debug)]
#[command(
    name = "kidfund",
    about = "Long-horizon savings calculator and investment wizard for a child's future"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(
            long,
            env = "KIDFUND_CONSENT_LEVEL",
            value_parser = parse_consent_level,
            help = "Stored cookie consent: all or necessary"
        )]
        consent_level: Option<ConsentLevel>,
    },
    /// Project savings until the child turns 18
    Project(CalculatorArgs),
    /// Invested vs saved vs inflation-adjusted comparison series
    Series(SeriesArgs),
    /// Simulate a treasury bond with monthly deposits
    Bonds(BondArgs),
    /// Split a monthly amount into stocks, bonds and gold
    Allocate(AllocationArgs),
    /// Walk the investment wizard in the terminal
    Wizard,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn run_wizard_on_stdio() -> Result<(), String> {
    let stdin = io::stdin();
    let outcome = run_wizard(stdin.lock(), io::stdout()).map_err(|e| e.to_string())?;
    if outcome == WizardOutcome::Exited {
        println!("Bye.");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kidfund=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            consent_level,
        } => api::run_http_server(port, SessionConfig::new(consent_level))
            .await
            .map_err(|e| format!("Server error: {e}")),
        Commands::Project(args) => api::build_projection_request(&args)
            .and_then(|r| api::projection_report(&r))
            .and_then(|report| print_json(&report)),
        Commands::Series(args) => api::build_series_request(&args)
            .and_then(|r| api::series_report(&r))
            .and_then(|report| print_json(&report)),
        Commands::Bonds(args) => api::build_bond_request(&args)
            .and_then(|r| api::bond_report(&r))
            .and_then(|report| print_json(&report)),
        Commands::Allocate(args) => api::build_allocation_request(&args)
            .and_then(|r| api::allocation_report(&r))
            .and_then(|split| print_json(&split)),
        Commands::Wizard => run_wizard_on_stdio(),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
