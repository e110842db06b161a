//! Hearth CLI
//!
//! Records the movements of a ledger snapshot and reports who owes whom.

mod snapshot;

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hearth_core::movement::{
    Consolidation, CreateMovementInput, InMemoryLedger, MovementService, Provenance, YearMonth,
};
use hearth_shared::config::LogConfig;
use hearth_shared::types::{Currency, Money, UserId};
use hearth_shared::AppConfig;

use snapshot::Snapshot;

type LedgerService<'a> =
    MovementService<'a, InMemoryLedger, InMemoryLedger, InMemoryLedger, InMemoryLedger>;

#[derive(Parser, Debug)]
#[command(name = "hearth", version, about = "Household movement ledger")]
struct Cli {
    /// Ledger snapshot (JSON)
    #[arg(short = 's', long = "snapshot")]
    snapshot: PathBuf,

    /// Member to act as (defaults to the first member of the snapshot)
    #[arg(long = "as")]
    acting_user: Option<UserId>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and authorize every movement of the snapshot
    Validate,
    /// Print net balances between people
    Consolidate {
        /// Only movements of this month (YYYY-MM)
        #[arg(long)]
        month: Option<YearMonth>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log.level.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let snapshot = Snapshot::read(&cli.snapshot)?;
    let currency = snapshot
        .currency
        .unwrap_or(config.ledger.default_currency);
    let acting_user = snapshot.acting_user(cli.acting_user)?;

    let ledger = InMemoryLedger::new();
    snapshot.seed(&ledger).await;
    let service = MovementService::new(&ledger, &ledger, &ledger, &ledger, currency);

    match cli.command {
        Command::Validate => {
            let rejected = record_movements(&service, acting_user, &snapshot.movements, true).await;
            if rejected > 0 {
                bail!(
                    "{rejected} of {} movements rejected",
                    snapshot.movements.len()
                );
            }
            println!("All {} movements accepted", snapshot.movements.len());
        }
        Command::Consolidate { month, json } => {
            record_movements(&service, acting_user, &snapshot.movements, false).await;
            let consolidation = service.consolidate(acting_user, month).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&consolidation)?);
            } else {
                print_consolidation(&consolidation, currency);
            }
        }
    }

    Ok(())
}

/// Records each movement through the service and returns how many were rejected.
async fn record_movements(
    service: &LedgerService<'_>,
    acting_user: UserId,
    movements: &[CreateMovementInput],
    report: bool,
) -> usize {
    let mut rejected = 0;
    for (index, input) in movements.iter().enumerate() {
        match service.create(acting_user, input.clone()).await {
            Ok(movement) => {
                if report {
                    println!("#{index} {}: ok ({})", input.description, movement.id);
                }
            }
            Err(err) => {
                rejected += 1;
                if report {
                    println!("#{index} {}: [{}] {err}", input.description, err.error_code());
                } else {
                    warn!(index, code = err.error_code(), error = %err, "Movement rejected");
                }
            }
        }
    }
    info!(
        recorded = movements.len() - rejected,
        rejected, "Snapshot movements recorded"
    );
    rejected
}

fn print_consolidation(consolidation: &Consolidation, currency: Currency) {
    if consolidation.balances.is_empty() {
        println!("Nobody owes anything");
    }

    for balance in &consolidation.balances {
        if balance.amount.is_zero() {
            println!("{} and {} are settled", balance.debtor, balance.creditor);
        } else {
            println!(
                "{} owes {} {}",
                balance.debtor,
                balance.creditor,
                Money::new(balance.amount, currency)
            );
        }
        for entry in &balance.provenance {
            println!("{}", provenance_line(entry, currency));
        }
    }

    if let Some(summary) = consolidation.summary {
        println!();
        println!("We owe:      {}", Money::new(summary.we_owe, currency));
        println!("They owe us: {}", Money::new(summary.they_owe_us, currency));
        println!("Net:         {}", Money::new(summary.net(), currency));
    }

    if consolidation.skipped > 0 {
        println!("Skipped {} movements that cannot carry debt", consolidation.skipped);
    }
}

fn provenance_line(entry: &Provenance, currency: Currency) -> String {
    format!(
        "    {} {:<12} {:>20} {}",
        entry.movement_date,
        entry.kind,
        Money::new(entry.amount, currency).to_string(),
        entry.description
    )
}
