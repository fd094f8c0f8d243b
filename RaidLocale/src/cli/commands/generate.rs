//! CLI command for regenerating timelineReplace tables

use std::path::Path;
use std::time::Instant;

use console::style;
use indicatif::ProgressBar;

use crate::catalog::{CatalogData, default_sources};
use crate::cli::progress::{GEAR, LOOKING_GLASS, PACKAGE, bar_style, print_done, print_step};
use crate::config::Config;
use crate::discovery::find_target_files;
use crate::timeline_replace::{BatchSummary, run_batch};

/// Flags for `generate`; anything left `None` comes from the config file
pub struct GenerateArgs<'a> {
    pub target: Option<&'a str>,
    pub root: Option<&'a Path>,
    pub api_dir: Option<&'a Path>,
    pub community_dir: Option<&'a Path>,
    pub config: Option<&'a Path>,
    pub padding: Option<u32>,
    pub limit: Option<usize>,
    pub dry_run: bool,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn execute(args: &GenerateArgs<'_>) -> anyhow::Result<()> {
    let started = Instant::now();

    let mut config = Config::load(args.config)?;
    if let Some(root) = args.root {
        config.root = root.to_path_buf();
    }
    if let Some(dir) = args.api_dir {
        config.api_dir = dir.to_path_buf();
    }
    if let Some(dir) = args.community_dir {
        config.community_dir = dir.to_path_buf();
    }
    if let Some(padding) = args.padding {
        config.padding = padding;
    }
    if args.limit.is_some() {
        config.limit = args.limit;
    }

    print_step(1, 3, LOOKING_GLASS, "Finding raidboss files...");
    let mut files = find_target_files(&config.root, args.target, &config.exclude)?;
    if let Some(limit) = config.limit {
        files.truncate(limit);
    }
    if files.is_empty() {
        println!("No raidboss files found in: {}", config.root.display());
        return Ok(());
    }

    print_step(2, 3, PACKAGE, "Loading catalogs...");
    let sources = default_sources(&config.api_dir, &config.community_dir, &config.locales);
    let data = CatalogData::load(&sources)?;
    let stats = data.stats();
    if args.verbose {
        println!(
            "  {} action names, {} actor names, {} locale tables",
            stats.action_names, stats.actor_names, stats.locale_tables
        );
    }

    let verb = if args.dry_run { "Checking" } else { "Updating" };
    print_step(3, 3, GEAR, &format!("{verb} {} files...", files.len()));

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(bar_style());
        pb
    };

    let options = config.to_options();
    let summary = run_batch(&files, &data, &options, !args.dry_run, |progress| {
        let name = Path::new(&progress.file)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| progress.file.clone());
        pb.set_message(name);
        pb.set_position(progress.current as u64);
    });
    pb.finish_and_clear();

    print_results(&summary, args.verbose);
    print_done(started.elapsed());

    Ok(())
}

fn print_results(summary: &BatchSummary, verbose: bool) {
    for line in &summary.results {
        let shown = verbose || !(line.starts_with("Unchanged") || line.starts_with("Skipped"));
        if shown {
            println!("  {line}");
        }
    }

    println!(
        "{} {}, {} {}, {} {}, {} {}",
        style("Updated:").green().bold(),
        summary.updated,
        style("Unchanged:").dim(),
        summary.unchanged,
        style("Skipped:").yellow(),
        summary.skipped,
        style("Failed:").red().bold(),
        summary.failed
    );
}
