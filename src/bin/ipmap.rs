mod cli_utils;
mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::{cmd_inspect, cmd_match, cmd_query};

#[derive(Parser)]
#[command(name = "ipmap")]
#[command(
    about = "Look up IPv4 addresses against exact entries and CIDR ranges",
    long_about = "ipmap - Look up IPv4 addresses against a list of exact addresses and CIDR ranges\n\n\
    Entries are loaded from a text or CSV file (optionally gzip-compressed) and each\n\
    can carry attached data. Exact addresses take priority over enclosing ranges.\n\n\
    Examples:\n\
      ipmap query blocklist.txt 10.1.2.3\n\
      ipmap query -f csv ranges.csv 192.168.1.1 --all\n\
      ipmap match blocklist.txt access-ips.txt.gz --stats\n\
      ipmap inspect blocklist.txt --json"
)]
#[command(version)]
struct Cli {
    /// Increase log output on stderr (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query a single address
    Query {
        /// Entry file with addresses and CIDR ranges
        #[arg(value_name = "ENTRIES")]
        entries: PathBuf,

        /// IPv4 address to look up
        #[arg(value_name = "ADDRESS")]
        address: String,

        /// Entry file format: text (default) or csv
        #[arg(short = 'f', long, default_value = "text", value_name = "FORMAT")]
        format: String,

        /// Report every matching entry instead of the first
        #[arg(short, long)]
        all: bool,

        /// Quiet mode - no output, only exit code (0 = found, 1 = not found)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Match addresses from files or stdin, one per line
    Match {
        /// Entry file with addresses and CIDR ranges
        #[arg(value_name = "ENTRIES")]
        entries: PathBuf,

        /// Address files (one per line, .gz supported), or "-" for stdin
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Entry file format: text (default) or csv
        #[arg(short = 'f', long, default_value = "text", value_name = "FORMAT")]
        format: String,

        /// Show line, match and skip counts on stderr
        #[arg(short, long)]
        stats: bool,
    },

    /// Inspect an entry file
    Inspect {
        /// Entry file with addresses and CIDR ranges
        #[arg(value_name = "ENTRIES")]
        entries: PathBuf,

        /// Entry file format: text (default) or csv
        #[arg(short = 'f', long, default_value = "text", value_name = "FORMAT")]
        format: String,

        /// Output statistics as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Query {
            entries,
            address,
            format,
            all,
            quiet,
        } => {
            let found = cmd_query(entries, address, format, all, quiet)?;
            // Exit with appropriate code
            std::process::exit(if found { 0 } else { 1 });
        }
        Commands::Match {
            entries,
            inputs,
            format,
            stats,
        } => cmd_match(entries, inputs, format, stats),
        Commands::Inspect {
            entries,
            format,
            json,
        } => cmd_inspect(entries, format, json),
    }
}
