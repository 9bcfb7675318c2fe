mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "casmatch",
    version,
    about = "Match CAS numbers in material declaration reports against reference lists"
)]
struct Cli {
    /// Directory holding processed reference lists
    #[arg(long, global = true, env = "CASMATCH_STORE", default_value = "standards")]
    store: PathBuf,

    /// Directory receiving output workbooks
    #[arg(long = "out-dir", global = true, env = "CASMATCH_OUTPUT", default_value = "outputs")]
    out_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage reference (standard) lists
    Reference {
        #[command(subcommand)]
        action: ReferenceAction,
    },
    /// Print the leveled records found in a report (without matching)
    Extract {
        /// Path to a .docx or .pdf report
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Match reports against a stored reference list and write one workbook per report
    Run {
        /// Stored reference list name (see `casmatch reference list`)
        #[arg(short, long)]
        reference: String,

        /// Reports to process (.docx or .pdf)
        #[arg(required = true)]
        input_files: Vec<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// List output workbooks with at least one matching CAS number
    List {
        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

#[derive(Subcommand)]
enum ReferenceAction {
    /// Normalize and store reference list workbook(s)
    Add {
        /// xlsx file(s) with "CAS Number" and "Chemical Name" columns
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List stored reference lists
    List,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Reference { action } => match action {
            ReferenceAction::Add { files } => commands::reference::add(&cli.store, &files),
            ReferenceAction::List => commands::reference::list(&cli.store),
        },
        Commands::Extract { input_file, output } => commands::extract::run(&input_file, &output),
        Commands::Run {
            reference,
            input_files,
            output,
        } => commands::run::run(&cli.store, &cli.out_dir, &reference, &input_files, &output),
        Commands::List { output } => commands::list::run(&cli.out_dir, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
