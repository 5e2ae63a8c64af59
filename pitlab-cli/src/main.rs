//! PitLab CLI — seed, inspect, query, and ledger commands.
//!
//! Commands:
//! - `seed` — create a deterministic synthetic database for demos
//! - `schema` — dump the field catalog (field → owning tables)
//! - `calendar` — per-table date-index summary
//! - `get` — windowed field query printed as a wide table
//! - `ledger add|remove|show` — record and inspect point-in-time valuations

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pitlab_core::access::{AsOf, DataReader, EmptyReason, WindowStatus};
use pitlab_core::config::ReaderConfig;
use pitlab_core::domain::{ObservationMatrix, Snapshot};
use pitlab_core::ledger::EquityLedger;
use pitlab_core::store::SqliteStore;
use pitlab_core::synthetic::{seed_database, SeedSpec};

#[derive(Parser)]
#[command(name = "pitlab", about = "PitLab CLI — point-in-time time-series access")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a synthetic demo database (price + fundamentals tables).
    Seed {
        /// Database file to create or reseed.
        #[arg(long, default_value = "data/pitlab.db")]
        db: PathBuf,

        /// First calendar date (YYYY-MM-DD).
        #[arg(long, default_value = "2018-01-02")]
        start: String,

        /// Trading days to generate.
        #[arg(long, default_value_t = 250)]
        days: usize,

        /// RNG seed; the same seed reproduces the same database.
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
    /// Dump the field catalog.
    Schema {
        #[arg(long, default_value = "data/pitlab.db")]
        db: PathBuf,

        /// Optional reader config TOML.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Per-table date-index summary.
    Calendar {
        #[arg(long, default_value = "data/pitlab.db")]
        db: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Fetch the last N observations of a field as of a date.
    Get {
        /// Field name, bare ("close") or qualified ("price.close").
        field: String,

        /// Lookback count.
        #[arg(long, short, default_value_t = 5)]
        n: usize,

        /// Cutoff date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Disable the frame cache regardless of config.
        #[arg(long, default_value_t = false)]
        no_cache: bool,

        #[arg(long, default_value = "data/pitlab.db")]
        db: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Equity ledger commands.
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },
}

#[derive(Subcommand)]
enum LedgerAction {
    /// Value a snapshot as of a date and append it to the ledger.
    Add {
        /// Valuation date (YYYY-MM-DD).
        #[arg(long)]
        date: String,

        /// Snapshot TOML file ([positions] table, optional cash/lot_size).
        #[arg(long)]
        snapshot: PathBuf,

        /// Price field used for valuation.
        #[arg(long, default_value = "close")]
        field: String,

        /// Ledger file.
        #[arg(long, default_value = "data/ledger.json")]
        file: PathBuf,

        #[arg(long, default_value = "data/pitlab.db")]
        db: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Remove the entry recorded for a date.
    Remove {
        #[arg(long)]
        date: String,

        #[arg(long, default_value = "data/ledger.json")]
        file: PathBuf,
    },
    /// Print the ledger.
    Show {
        #[arg(long, default_value = "data/ledger.json")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Seed {
            db,
            start,
            days,
            seed,
        } => run_seed(&db, &start, days, seed),
        Commands::Schema { db, config } => run_schema(&db, config.as_deref()),
        Commands::Calendar { db, config } => run_calendar(&db, config.as_deref()),
        Commands::Get {
            field,
            n,
            as_of,
            no_cache,
            db,
            config,
        } => run_get(&field, n, as_of.as_deref(), no_cache, &db, config.as_deref()),
        Commands::Ledger { action } => match action {
            LedgerAction::Add {
                date,
                snapshot,
                field,
                file,
                db,
                config,
            } => run_ledger_add(&date, &snapshot, &field, &file, &db, config.as_deref()),
            LedgerAction::Remove { date, file } => run_ledger_remove(&date, &file),
            LedgerAction::Show { file } => run_ledger_show(&file),
        },
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn load_config(path: Option<&std::path::Path>) -> Result<ReaderConfig> {
    match path {
        Some(path) => {
            ReaderConfig::from_file(path).with_context(|| format!("load {}", path.display()))
        }
        None => Ok(ReaderConfig::default()),
    }
}

fn open_reader(
    db: &std::path::Path,
    config_path: Option<&std::path::Path>,
    no_cache: bool,
) -> Result<DataReader<SqliteStore>> {
    let mut config = load_config(config_path)?;
    if no_cache {
        config.cache.enabled = false;
    }
    let store = SqliteStore::open(db, &config.storage)
        .with_context(|| format!("open database {}", db.display()))?;
    Ok(DataReader::open(store, &config)?)
}

fn run_seed(db: &std::path::Path, start: &str, days: usize, seed: u64) -> Result<()> {
    if days == 0 {
        bail!("--days must be positive");
    }
    let start = parse_date(start)?;
    if let Some(parent) = db.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = rusqlite::Connection::open(db)?;
    let spec = SeedSpec::demo(start, days, seed);
    seed_database(&mut conn, &spec)?;

    let last = *spec.trading_days().last().expect("days > 0");
    println!(
        "Seeded {} with {} entities x {} trading days ({} .. {})",
        db.display(),
        spec.entities.len(),
        days,
        start,
        last
    );
    Ok(())
}

fn run_schema(db: &std::path::Path, config: Option<&std::path::Path>) -> Result<()> {
    let reader = open_reader(db, config, true)?;
    println!("{} fields:", reader.catalog().field_count());
    for (field, tables) in reader.catalog().fields() {
        if tables.len() == 1 {
            println!("  {field:<16} -> {}", tables[0]);
        } else {
            println!(
                "  {field:<16} -> AMBIGUOUS {:?} (qualify as 'table.{field}')",
                tables
            );
        }
    }
    Ok(())
}

fn run_calendar(db: &std::path::Path, config: Option<&std::path::Path>) -> Result<()> {
    let reader = open_reader(db, config, true)?;
    for (table, dates) in reader.calendar().tables() {
        match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => {
                println!("{table:<16} {} dates ({first} .. {last})", dates.len())
            }
            _ => println!("{table:<16} 0 dates"),
        }
    }
    Ok(())
}

fn run_get(
    field: &str,
    n: usize,
    as_of: Option<&str>,
    no_cache: bool,
    db: &std::path::Path,
    config: Option<&std::path::Path>,
) -> Result<()> {
    let asof = match as_of {
        Some(s) => AsOf::at(parse_date(s)?),
        None => AsOf::today(),
    };

    let mut reader = open_reader(db, config, no_cache)?;
    let window = reader.get(field, n, &asof)?;

    match window.status {
        WindowStatus::Complete => {}
        WindowStatus::Partial {
            requested,
            available,
        } => eprintln!("warning: only {available} of {requested} requested dates available"),
        WindowStatus::Empty(EmptyReason::UnknownField) => {
            bail!("field '{field}' is not registered in the catalog")
        }
        WindowStatus::Empty(EmptyReason::NoHistory) => {
            bail!("no observations for '{field}' at or before {}", asof.cutoff())
        }
    }

    print_matrix(&window.matrix);
    Ok(())
}

fn print_matrix(matrix: &ObservationMatrix) {
    print!("{:<12}", "date");
    for entity in matrix.entities() {
        print!(" {entity:>12}");
    }
    println!();

    for (date, cells) in matrix.rows() {
        print!("{:<12}", date.to_string());
        for cell in cells {
            match cell {
                Some(value) => print!(" {value:>12.2}"),
                None => print!(" {:>12}", "-"),
            }
        }
        println!();
    }
}

fn run_ledger_add(
    date: &str,
    snapshot_path: &std::path::Path,
    field: &str,
    file: &std::path::Path,
    db: &std::path::Path,
    config: Option<&std::path::Path>,
) -> Result<()> {
    let date = parse_date(date)?;
    let content = std::fs::read_to_string(snapshot_path)
        .with_context(|| format!("read snapshot {}", snapshot_path.display()))?;
    let snapshot: Snapshot = toml::from_str(&content)
        .with_context(|| format!("parse snapshot {}", snapshot_path.display()))?;

    let mut reader = open_reader(db, config, false)?;
    let window = reader.get(field, 1, &AsOf::at(date))?;
    let Some(row_date) = window.matrix.last_date() else {
        bail!("no '{field}' observation at or before {date}");
    };
    let prices = window
        .matrix
        .date_row(row_date)
        .expect("last_date row exists");

    if row_date != date {
        eprintln!("warning: valuing with prices from {row_date} (no observation on {date})");
    }

    let equity = snapshot.market_value(&prices);
    let mut ledger = EquityLedger::open(file)?;
    ledger.add(date, &snapshot, equity)?;

    println!("{date}: equity {equity:.2} ({} positions)", snapshot.positions.len());
    Ok(())
}

fn run_ledger_remove(date: &str, file: &std::path::Path) -> Result<()> {
    let date = parse_date(date)?;
    let mut ledger = EquityLedger::open(file)?;
    ledger.remove(date)?;
    println!("removed entry for {date}");
    Ok(())
}

fn run_ledger_show(file: &std::path::Path) -> Result<()> {
    let ledger = EquityLedger::open(file)?;
    if ledger.entries().is_empty() {
        println!("ledger is empty");
        return Ok(());
    }

    println!("{:<12} {:>14} {:>12} {:>10}", "date", "equity", "cash", "positions");
    for entry in ledger.entries() {
        println!(
            "{:<12} {:>14.2} {:>12.2} {:>10}",
            entry.date.to_string(),
            entry.equity,
            entry.cash,
            entry.positions.len()
        );
    }
    Ok(())
}
