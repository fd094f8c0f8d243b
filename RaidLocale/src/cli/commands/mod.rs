pub mod disambiguate;
pub mod execute;
pub mod generate;
pub mod inspect;

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Bring timelineReplace tables up to date
    Generate {
        /// Only process the file whose path ends with this (e.g. "07-dt/raid/r12s")
        target: Option<String>,

        /// Raidboss data directory
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Directory with the structured-API sheet dumps (Action.json, BNpcName.json)
        #[arg(long)]
        api_dir: Option<PathBuf>,

        /// Directory with community tables (<locale>/Action.csv)
        #[arg(long)]
        community_dir: Option<PathBuf>,

        /// Config file (defaults to ./raidlocale.toml, then the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Ability id window padding around each file's StartsUsing ids
        #[arg(long)]
        padding: Option<u32>,

        /// Process at most this many files
        #[arg(long)]
        limit: Option<usize>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show what a trigger file references and what its table holds
    Inspect {
        /// Trigger file (.ts/.js); the sibling .txt timeline is read too
        file: PathBuf,
    },

    /// Print the guarded form of each key against the others
    Disambiguate {
        /// replaceText keys
        #[arg(required = true)]
        keys: Vec<String>,
    },
}
