//! Afslag CLI - Run descending-price auctions from the terminal
//!
//! # Quick Start
//!
//! ```bash
//! # One market day with the defaults (2 sellers, 3 buyers)
//! afslag run
//!
//! # Bigger market, reproducible lots
//! afslag run --sellers 3 --buyers 6 --lots 5 --seed 42
//!
//! # Buyer decisions through an OpenAI-compatible backend
//! AFSLAG_LLM_PROVIDER=openai_compat afslag run --llm
//!
//! # See what the buyers are made of
//! afslag personalities
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use afslag_brain::{MerchantBrain, Personality};
use afslag_session::{write_reports, AuctionSession, SessionConfig, SessionOutcome};
use afslag_types::Credits;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Afslag - Descending-price auctions between message-passing agents
#[derive(Parser)]
#[command(name = "afslag")]
#[command(author = "Afslag Contributors")]
#[command(version)]
#[command(about = "Sellers call prices down, buyers pick their moment", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one market day and print the settlement
    Run(RunArgs),

    /// List the built-in buyer personalities
    Personalities,
}

#[derive(Args)]
struct RunArgs {
    /// Number of sellers
    #[arg(long, default_value = "2")]
    sellers: usize,

    /// Number of buyers
    #[arg(long, default_value = "3")]
    buyers: usize,

    /// Lots per seller
    #[arg(long, default_value = "4")]
    lots: usize,

    /// Starting budget per buyer (in credits)
    #[arg(long, default_value = "100")]
    budget: u64,

    /// Lowest possible start price
    #[arg(long, default_value = "40")]
    start_min: u64,

    /// Highest possible start price
    #[arg(long, default_value = "60")]
    start_max: u64,

    /// Lowest possible reserve price
    #[arg(long, default_value = "5")]
    reserve_min: u64,

    /// Highest possible reserve price
    #[arg(long, default_value = "15")]
    reserve_max: u64,

    /// Price step per round (in credits)
    #[arg(long, default_value = "5")]
    step: u64,

    /// Bid collection window per round (in milliseconds)
    #[arg(long, default_value = "200")]
    window_ms: u64,

    /// Deadline for one buyer decision (in milliseconds)
    #[arg(long, default_value = "2000")]
    decision_timeout_ms: u64,

    /// Seed for lot generation and preference draws
    #[arg(long)]
    seed: Option<u64>,

    /// Route buyer decisions through the configured LLM backend
    #[arg(long)]
    llm: bool,

    /// Directory for the session CSV reports
    #[arg(long, default_value = "auction-results")]
    out_dir: PathBuf,

    /// Skip writing CSV reports
    #[arg(long)]
    no_report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    print_banner();

    match cli.command {
        Commands::Run(args) => run_market(args).await?,
        Commands::Personalities => list_personalities(),
    }

    Ok(())
}

async fn run_market(args: RunArgs) -> anyhow::Result<()> {
    if args.llm {
        let brain = MerchantBrain::from_env();
        match brain.provider_kind() {
            Some(kind) => {
                if brain.is_llm_available().await {
                    println!("  {} {} backend ready", "●".bright_green(), kind);
                } else {
                    println!(
                        "  {} {} backend not reachable, decisions will wait out their deadline",
                        "○".yellow(),
                        kind
                    );
                }
            }
            None => {
                println!(
                    "  {} no LLM provider configured, buyers fall back to their rule tables",
                    "○".yellow()
                );
            }
        }
        println!();
    }

    let config = SessionConfig {
        sellers: args.sellers,
        buyers: args.buyers,
        lots_per_seller: args.lots,
        starting_budget: Credits::new(args.budget),
        start_price_min: Credits::new(args.start_min),
        start_price_max: Credits::new(args.start_max),
        reserve_price_min: Credits::new(args.reserve_min),
        reserve_price_max: Credits::new(args.reserve_max),
        price_step: Credits::new(args.step),
        collection_window: Duration::from_millis(args.window_ms),
        decision_timeout: Duration::from_millis(args.decision_timeout_ms),
        seed: args.seed,
        llm: args.llm,
    };

    let outcome = AuctionSession::new(config)
        .run()
        .await
        .context("Failed to run the market session")?;
    print_settlement(&outcome);

    if !args.no_report {
        let paths = write_reports(&args.out_dir, &outcome.setup, &outcome.transactions)
            .context("Failed to write the session reports")?;
        println!(
            "  {} setup report: {}",
            "●".bright_cyan(),
            paths.setup.display()
        );
        println!(
            "  {} auction log:  {}",
            "●".bright_cyan(),
            paths.log.display()
        );
        println!();
    }

    Ok(())
}

fn print_settlement(outcome: &SessionOutcome) {
    println!("{}", "Settlement".bright_white().bold());
    println!("{}", "─".repeat(66));
    for record in &outcome.transactions {
        match (&record.winner, record.sale_price) {
            (Some(winner), Some(price)) => {
                println!(
                    "  {} {:<5} {}  {:>4} credits  to {}",
                    "●".bright_green(),
                    record.kind.to_string(),
                    short(&record.lot_id),
                    price.to_string().bright_white(),
                    short(winner).bright_cyan()
                );
            }
            _ => {
                println!(
                    "  {} {:<5} {}  {}",
                    "○".yellow(),
                    record.kind.to_string(),
                    short(&record.lot_id),
                    "discarded at the reserve".bright_black()
                );
            }
        }
    }
    println!();

    println!("{}", "Buyers".bright_white().bold());
    println!("{}", "─".repeat(66));
    for buyer in &outcome.buyers {
        let spent = buyer.starting_budget.0 - buyer.budget.0;
        let kinds: Vec<&str> = buyer.purchases.iter().map(|p| p.kind.code()).collect();
        println!(
            "  {} {:<14} {:<18} likes {:<5} spent {:>4}, kept {:>4}  [{}]",
            "●".bright_cyan(),
            short(&buyer.buyer_id),
            buyer.personality,
            buyer.preference.to_string(),
            spent,
            buyer.budget.to_string(),
            kinds.join(" ")
        );
    }
    println!();

    let revenue: u64 = outcome
        .transactions
        .iter()
        .filter_map(|t| t.sale_price)
        .map(|p| p.0)
        .sum();
    println!(
        "  {} lots sold, {} discarded, {} credits moved",
        outcome.sold.to_string().bright_green(),
        outcome.discarded.to_string().yellow(),
        revenue.to_string().bright_white()
    );
    println!();
}

fn list_personalities() {
    println!("{}", "Built-in personalities".bright_white().bold());
    println!("{}", "─".repeat(58));
    for personality in &Personality::BUILTIN {
        let policy = match personality {
            Personality::Balanced => "spreads its budget to cover every kind",
            Personality::Cautious => "only moves on cheap lots",
            Personality::Greedy => "takes anything it can pay for",
            Personality::PreferenceDriven => "chases its favourite kind",
            Personality::Custom(_) => "caller-supplied policy",
        };
        println!("  {:<18} {}", personality.label().bright_cyan(), policy);
    }
    println!();
    println!(
        "  {}",
        "Buyers cycle through these in order at session setup".bright_black()
    );
    println!();
}

fn short(id: &dyn fmt::Display) -> String {
    id.to_string().chars().take(12).collect()
}

fn print_banner() {
    println!();
    println!(
        "{}",
        "╔══════════════════════════════════════════════════════╗".bright_cyan()
    );
    println!(
        "{}{}{}",
        "║  ".bright_cyan(),
        "Afslag".bright_white().bold(),
        " - the descending-price fish market           ║".bright_cyan()
    );
    println!(
        "{}",
        "║  Sellers call prices down, buyers pick their moment  ║".bright_cyan()
    );
    println!(
        "{}",
        "╚══════════════════════════════════════════════════════╝".bright_cyan()
    );
    println!();
}
