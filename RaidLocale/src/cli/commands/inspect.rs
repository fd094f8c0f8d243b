//! CLI command for inspecting one trigger file

use std::fs;
use std::path::Path;

use console::style;

use crate::discovery::timeline_path;
use crate::error::Error;
use crate::timeline_replace::{TableKind, TableSpan, extract_references, extract_table};

pub fn execute(file: &Path) -> anyhow::Result<()> {
    let timeline = timeline_path(file);
    if !timeline.is_file() {
        return Err(Error::TimelineMissing { path: timeline }.into());
    }
    let trigger_text = fs::read_to_string(file)?;
    let timeline_text = fs::read_to_string(&timeline)?;

    let refs = extract_references(&trigger_text, &timeline_text);
    let existing = extract_table(&trigger_text);

    println!("{}", style(file.display()).bold());
    println!();

    match refs.bounds {
        Some(bounds) => println!(
            "Ability ids: {} ({:X}..={:X})",
            refs.codes.len(),
            bounds.min,
            bounds.max
        ),
        None => println!("Ability ids: none"),
    }

    println!("Sync names ({}):", refs.sync_names.len());
    for name in &refs.sync_names {
        println!("  {name}");
    }
    println!("Timeline names ({}):", refs.text_names.len());
    for name in &refs.text_names {
        println!("  {name}");
    }
    println!();

    let span = match &existing.span {
        TableSpan::Absent => "absent".to_string(),
        TableSpan::Located(range) => format!("bytes {}..{}", range.start, range.end),
        TableSpan::Unlocatable => "unlocatable".to_string(),
    };
    println!("timelineReplace: {span}");
    if let Some(reason) = &existing.degraded {
        println!("  {} {reason}", style("degraded:").yellow());
    }

    for entry in &existing.blocks {
        let review = if entry.block.needs_review {
            style(" (needs review)").yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:3} {} sync, {} text{review}",
            entry.locale_code,
            entry.block.table(TableKind::Sync).len(),
            entry.block.table(TableKind::Text).len()
        );
    }

    Ok(())
}
