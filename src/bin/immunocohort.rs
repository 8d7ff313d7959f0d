//! immunocohort - clinical trial cohort explorer CLI
//!
//! Entry points: one-time store initialization, the text dashboard, the
//! baseline subset report, and the responder statistics table.

use clap::{Args, Parser, Subcommand};
use immunocohort::display::DisplayFilter;
use immunocohort::error::Result;
use immunocohort::explore::Explorer;
use immunocohort::query::CohortFilter;
use immunocohort::render;
use immunocohort::store::Store;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Clinical-trial immune cell population explorer
#[derive(Parser)]
#[command(name = "immunocohort")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Cohort selection predicates shared by the analytical subcommands.
#[derive(Args)]
struct FilterArgs {
    /// Subject condition to select
    #[arg(long, default_value = "melanoma")]
    condition: String,

    /// Sample type to select
    #[arg(long, default_value = "PBMC")]
    sample_type: String,

    /// Treatment arm to select
    #[arg(long, default_value = "miraclib")]
    treatment: String,
}

impl From<FilterArgs> for CohortFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            condition: args.condition,
            sample_type: args.sample_type,
            treatment: args.treatment,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the store from a cell-count CSV
    Init {
        /// Path to the wide-format cell-count CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Path for the SQLite database
        #[arg(short, long, default_value = "trial.db")]
        db: PathBuf,
    },

    /// Render the full dashboard to stdout
    Dashboard {
        /// Path to the SQLite database
        #[arg(short, long, default_value = "trial.db")]
        db: PathBuf,

        /// Source CSV for one-time initialization if the store is missing
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show only frequency rows whose sample ID contains this substring
        #[arg(long)]
        sample_contains: Option<String>,

        /// Show only these populations (repeatable); omitting selects all
        #[arg(long = "population")]
        populations: Vec<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print the baseline subset report (debug entry point)
    Report {
        /// Path to the SQLite database
        #[arg(short, long, default_value = "trial.db")]
        db: PathBuf,

        /// Source CSV for one-time initialization if the store is missing
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print the responder vs non-responder test table
    Stats {
        /// Path to the SQLite database
        #[arg(short, long, default_value = "trial.db")]
        db: PathBuf,

        /// Source CSV for one-time initialization if the store is missing
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write results to this TSV file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format for stdout: text or json
        #[arg(short, long, default_value = "text")]
        format: String,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

fn open_store(db: &Path, input: Option<&Path>) -> Result<Store> {
    match input {
        Some(source) => {
            let (store, summary) = Store::open_or_init(db, source)?;
            if let Some(s) = summary {
                eprintln!(
                    "Initialized store: {} subjects, {} samples, {} measurements",
                    s.subjects, s.samples, s.measurements
                );
            }
            Ok(store)
        }
        None => Store::open(db),
    }
}

fn cmd_init(input: &Path, db: &Path) -> Result<()> {
    if db.exists() {
        eprintln!("Store already initialized at {}", db.display());
        return Ok(());
    }
    let (_, summary) = Store::open_or_init(db, input)?;
    if let Some(s) = summary {
        eprintln!(
            "Initialized {}: {} subjects, {} samples, {} measurements",
            db.display(),
            s.subjects,
            s.samples,
            s.measurements
        );
    }
    Ok(())
}

fn cmd_dashboard(
    db: &Path,
    input: Option<&Path>,
    sample_contains: Option<String>,
    populations: Vec<String>,
    filter: CohortFilter,
) -> Result<()> {
    let store = open_store(db, input)?;
    let mut explorer = Explorer::new(store, filter);

    let display = DisplayFilter {
        sample_contains,
        populations: if populations.is_empty() {
            None
        } else {
            Some(populations.into_iter().collect::<BTreeSet<String>>())
        },
    };

    print!("{}", render::dashboard(&mut explorer, &display)?);
    Ok(())
}

fn cmd_report(db: &Path, input: Option<&Path>, filter: CohortFilter) -> Result<()> {
    let store = open_store(db, input)?;
    let mut explorer = Explorer::new(store, filter);
    print!("{}", render::subset_report(&mut explorer)?);
    Ok(())
}

fn cmd_stats(
    db: &Path,
    input: Option<&Path>,
    output: Option<&Path>,
    format: &str,
    filter: CohortFilter,
) -> Result<()> {
    let store = open_store(db, input)?;
    let mut explorer = Explorer::new(store, filter);
    let tests = explorer.response_tests()?;

    if let Some(path) = output {
        tests.to_tsv(path)?;
        eprintln!("Results written to {}", path.display());
        return Ok(());
    }
    match format {
        "json" => println!("{}", tests.to_json()?),
        _ => print!("{}", render::stats_section(&tests)),
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { input, db } => cmd_init(&input, &db),

        Commands::Dashboard {
            db,
            input,
            sample_contains,
            populations,
            filter,
        } => cmd_dashboard(
            &db,
            input.as_deref(),
            sample_contains,
            populations,
            filter.into(),
        ),

        Commands::Report { db, input, filter } => cmd_report(&db, input.as_deref(), filter.into()),

        Commands::Stats {
            db,
            input,
            output,
            format,
            filter,
        } => cmd_stats(
            &db,
            input.as_deref(),
            output.as_deref(),
            &format,
            filter.into(),
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
