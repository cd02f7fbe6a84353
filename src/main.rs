//! Chartbook command-line entry point

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use chartbook_config::Config;
use chartbook_core::{AccountKind, AccountStore, ChartView, CoreResult, RootType};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chartbook")]
#[command(version = "0.1.0")]
#[command(about = "Maintain a hierarchical chart of accounts", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the chart as an indented table with balances
    Show {
        /// Expand every group before printing
        #[arg(long)]
        expand_all: bool,
    },
    /// Add an account under an existing group
    Add {
        parent: String,
        name: String,
        /// Create a group instead of a detail account
        #[arg(long)]
        group: bool,
    },
    /// Add a top-level group account
    AddRoot {
        name: String,
        #[arg(long)]
        root_type: RootType,
    },
    /// Remove an account that has no children
    Remove { name: String },
    /// Rename an account
    Rename { from: String, to: String },
    /// List detail accounts, optionally of one root type
    Accounts {
        #[arg(long)]
        root_type: Option<RootType>,
    },
    /// Print the default configuration template
    InitConfig,
}

fn init_logging(config: &Config) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.logging.level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn print_chart(chart: &ChartView) {
    let width = chart
        .rows()
        .iter()
        .map(|r| r.level * 2 + 2 + r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Account".len());

    println!(
        "{:<width$}  {:>20}",
        "Account",
        format!("Balance ({})", chart.currency().default_currency),
        width = width
    );
    for row in chart.rows() {
        let marker = match (row.is_group, row.expanded) {
            (true, true) => "- ",
            (true, false) => "+ ",
            (false, _) => "  ",
        };
        let label = format!("{}{}{}", "  ".repeat(row.level), marker, row.name);
        println!("{:<width$}  {:>20}", label, row.balance_display, width = width);
    }
}

fn run(chart: &mut ChartView, command: Command) -> CoreResult<()> {
    match command {
        Command::Show { expand_all } => {
            if expand_all {
                chart.expand_all();
            }
            print_chart(chart);
        }
        Command::Add {
            parent,
            name,
            group,
        } => {
            let kind = if group {
                AccountKind::Group
            } else {
                AccountKind::Detail
            };
            chart.begin_add(&parent, kind)?;
            chart.commit_add(&name)?;
            println!("Added {} '{}' under '{}'", kind, name.trim(), parent);
        }
        Command::AddRoot { name, root_type } => {
            chart.add_root(&name, root_type)?;
            println!("Added {} root '{}'", root_type, name.trim());
        }
        Command::Remove { name } => {
            chart.remove(&name)?;
            println!("Removed '{}'", name);
        }
        Command::Rename { from, to } => {
            chart.rename(&from, &to)?;
            println!("Renamed '{}' to '{}'", from, to.trim());
        }
        Command::Accounts { root_type } => {
            for name in chart.account_options(root_type) {
                println!("{}", name);
            }
        }
        Command::InitConfig => {}
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Command::InitConfig = args.command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, notice) = Config::load_or_default(&args.config).map_err(|e| {
        anyhow!(
            "Failed to load configuration from {}\n{}",
            args.config.display(),
            e.to_details()
        )
    })?;
    init_logging(&config);
    if let Some(notice) = notice {
        log::warn!("Using default configuration. {}", notice);
    }
    log::debug!(
        "Using {} store, accounts at {}",
        config.storage.backend,
        config.document_path(&config.storage.accounts_key).display()
    );

    let store = AccountStore::from_config(&config).context("Failed to open account store")?;
    let mut chart = ChartView::open(&config, store);

    if let Err(e) = run(&mut chart, args.command) {
        eprintln!("{}", e.to_details());
        std::process::exit(1);
    }

    Ok(())
}
