use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Clean weekly store sales CSV exports and aggregate them into monthly summaries.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to a YAML config file with column aliases and output settings
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pipeline on the given CSV files
    Run {
        /// Sales CSV files, one or more per store
        #[clap(required = true)]
        files: Vec<PathBuf>,

        /// SQLite file to upsert the monthly summaries into
        #[clap(long)]
        database: Option<PathBuf>,

        /// Directory the CSV and Excel reports are written to
        #[clap(long)]
        reports_dir: Option<PathBuf>,

        /// Don't write CSV and Excel reports
        #[clap(long)]
        no_export: bool,
    },

    /// Print the monthly summaries stored in the database
    ListSummaries {
        /// SQLite file the summaries were upserted into
        #[clap(long)]
        database: Option<PathBuf>,

        /// Only show one month, formatted as YYYY-MM
        #[clap(long)]
        month: Option<String>,
    },

    /// Write sample store CSV files with inconsistent column names and formatting
    GenerateSample {
        #[clap(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Seed for the random generator, to get reproducible files
        #[clap(long, default_value_t = 42)]
        seed: u64,
    },
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn verify_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn parse_run() {
        let args = Args::try_parse_from([
            "store-sales-etl",
            "--config",
            "etl.yaml",
            "run",
            "a.csv",
            "b.csv",
            "--database",
            "sales.db",
            "--no-export",
        ])
        .unwrap();
        assert_eq!(Some(PathBuf::from("etl.yaml")), args.config);
        match args.command {
            Command::Run {
                files,
                database,
                reports_dir,
                no_export,
            } => {
                assert_eq!(vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")], files);
                assert_eq!(Some(PathBuf::from("sales.db")), database);
                assert_eq!(None, reports_dir);
                assert!(no_export);
            }
            command => panic!("Unexpected command {command:?}"),
        }
    }

    #[test]
    fn run_requires_files() {
        assert!(Args::try_parse_from(["store-sales-etl", "run"]).is_err());
    }
}
