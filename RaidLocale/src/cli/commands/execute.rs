//! Command execution implementations

use super::Commands;
use super::generate::GenerateArgs;
use super::{disambiguate, generate, inspect};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, verbose: bool) -> anyhow::Result<()> {
        match self {
            Commands::Generate {
                target,
                root,
                api_dir,
                community_dir,
                config,
                padding,
                limit,
                dry_run,
                quiet,
            } => generate::execute(&GenerateArgs {
                target: target.as_deref(),
                root: root.as_deref(),
                api_dir: api_dir.as_deref(),
                community_dir: community_dir.as_deref(),
                config: config.as_deref(),
                padding: *padding,
                limit: *limit,
                dry_run: *dry_run,
                quiet: *quiet,
                verbose,
            }),
            Commands::Inspect { file } => inspect::execute(file),
            Commands::Disambiguate { keys } => {
                disambiguate::execute(keys);
                Ok(())
            }
        }
    }
}
