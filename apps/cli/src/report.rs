//! Console rendering of the extraction summary and frequency report.

use colored::Colorize;
use modtext_core::aggregate::FrequentTag;
use modtext_core::pipeline::ExtractionOutcome;

pub fn print_extraction_summary(outcome: &ExtractionOutcome, threshold: usize) {
    let stats = &outcome.stats;

    println!();
    println!("{}", "Extraction summary".bold());
    println!(
        "  indexed {} existing keys across {} mods ({} markup files)",
        stats.index.keys_indexed, stats.index.mods_indexed, stats.index.files_visited
    );
    println!(
        "  scanned {} source files, {} raw text occurrences",
        stats.files_scanned, stats.raw_entries
    );
    println!(
        "  dropped {} already-translated, {} duplicates",
        stats.suppressed_translated, stats.suppressed_duplicates
    );
    println!(
        "  {} {}",
        stats.worklist_entries.to_string().green().bold(),
        "entries in the worklist"
    );

    if !outcome.diagnostics.is_empty() {
        println!();
        println!(
            "{} {} file(s) skipped:",
            "warning:".yellow().bold(),
            outcome.diagnostics.len()
        );
        for diagnostic in &outcome.diagnostics {
            println!("  {}", diagnostic.dimmed());
        }
    }

    print_frequent_tags(&outcome.frequent_tags, threshold);
}

fn print_frequent_tags(tags: &[FrequentTag], threshold: usize) {
    println!();
    if tags.is_empty() {
        println!(
            "No tags met the frequency threshold of {threshold} occurrences per mod."
        );
        return;
    }

    println!(
        "{}",
        format!("Frequent tags (>= {threshold} occurrences per tag per mod)").bold()
    );
    println!(
        "Review these keys; recurring non-text tags are candidates for the exclusion list."
    );

    for tag in tags {
        println!();
        println!("  Mod: {}", tag.mod_name.cyan());
        println!("    Tag: '{}'", tag.key);
        println!("    Occurrences: {}", tag.count.to_string().yellow());
        println!(
            "    {} unique text(s) in {} file(s). Samples:",
            tag.unique_texts, tag.unique_files
        );
        for (text, path) in &tag.samples {
            println!("      - \"{}\" ({})", text, path.dimmed());
        }
    }
}
