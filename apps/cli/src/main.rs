//! `modtext` — extracts untranslated text from a mod collection, drives a
//! batch translation engine over the worklist, and normalizes the result.

mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use modtext_core::translate::driver::{run_translation, TranslateStageConfig};
use modtext_core::translate::engine_or_passthrough;
use modtext_core::{run_clean, worklist, ExtractionPipeline, PipelineConfig};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "modtext", version, about, long_about = None)]
struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a mod collection and build the untranslated-text worklist
    Extract(ExtractArgs),
    /// Run the worklist through a translation engine
    Translate(TranslateArgs),
    /// Normalize punctuation in a translated document
    Clean(CleanArgs),
}

#[derive(Debug, Args)]
struct CommonConfig {
    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Root directory of the mod collection
    mods_dir: PathBuf,

    /// Output worklist path
    #[arg(short, long, default_value = "translation_output/worklist.xml")]
    output: PathBuf,

    /// Source language to extract
    #[arg(long)]
    source_lang: Option<String>,

    /// Language that marks a key as already translated
    #[arg(long)]
    existing_lang: Option<String>,

    /// Target language attribute for the worklist document
    #[arg(long)]
    target_lang: Option<String>,

    /// `translatedname` attribute for the worklist document
    #[arg(long)]
    translated_name: Option<String>,

    /// Frequency-report threshold (occurrences per tag per mod)
    #[arg(long)]
    threshold: Option<usize>,

    /// Exclusion file replacing the built-in excluded-tag list
    #[arg(long)]
    exclusions: Option<PathBuf>,

    #[command(flatten)]
    common: CommonConfig,
}

#[derive(Debug, Args)]
struct TranslateArgs {
    /// Worklist document produced by `extract`
    input: PathBuf,

    /// Output document with combined translated + original text
    #[arg(short, long, default_value = "translation_output/translated.xml")]
    output: PathBuf,

    /// Translation service endpoint; omit for passthrough
    #[arg(long)]
    endpoint: Option<String>,

    /// Force passthrough even when an endpoint is configured
    #[arg(long)]
    passthrough: bool,

    /// Texts per translation request
    #[arg(long)]
    batch_size: Option<usize>,

    /// Separator between translated and original text
    #[arg(long)]
    separator: Option<String>,

    #[command(flatten)]
    common: CommonConfig,
}

#[derive(Debug, Args)]
struct CleanArgs {
    /// Translated document produced by `translate`
    input: PathBuf,

    /// Output path for the cleaned document
    #[arg(short, long, default_value = "translation_output/cleaned.xml")]
    output: PathBuf,

    /// Separator between translated and original text
    #[arg(long)]
    separator: Option<String>,

    #[command(flatten)]
    common: CommonConfig,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    match Arguments::parse().command {
        Command::Extract(args) => run_extract(args),
        Command::Translate(args) => run_translate(args),
        Command::Clean(args) => run_clean_cmd(args),
    }
}

fn load_config(common: &CommonConfig) -> Result<PipelineConfig> {
    match &common.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;
    if let Some(lang) = args.source_lang {
        config.source_language = lang;
    }
    if let Some(lang) = args.existing_lang {
        config.existing_language = lang;
    }
    if let Some(lang) = args.target_lang {
        config.target_language = lang;
    }
    if let Some(name) = args.translated_name {
        config.translated_name = name;
    }
    if let Some(threshold) = args.threshold {
        config.frequent_tag_threshold = threshold;
    }
    if let Some(path) = args.exclusions {
        config.exclusions_file = Some(path);
    }

    let threshold = config.frequent_tag_threshold;
    let target_language = config.target_language.clone();
    let translated_name = config.translated_name.clone();

    println!(
        "Extracting '{}' texts from {} (existing translations: '{}')",
        config.source_language,
        args.mods_dir.display(),
        config.existing_language
    );

    let pipeline = ExtractionPipeline::new(config)?;
    let outcome = pipeline
        .run(&args.mods_dir)
        .context("extraction failed")?;

    if outcome.worklist.is_empty() {
        report::print_extraction_summary(&outcome, threshold);
        println!("\nNo new texts found needing translation.");
        return Ok(());
    }

    worklist::write_worklist(
        &outcome.worklist,
        &args.output,
        &target_language,
        &translated_name,
    )
    .with_context(|| format!("writing worklist {}", args.output.display()))?;

    report::print_extraction_summary(&outcome, threshold);
    println!("\nWorklist saved to {}", args.output.display());
    Ok(())
}

fn run_translate(args: TranslateArgs) -> Result<()> {
    let config = load_config(&args.common)?;

    let endpoint = if args.passthrough {
        None
    } else {
        args.endpoint.as_deref()
    };
    let mut engine = engine_or_passthrough(
        endpoint,
        &config.source_language,
        &config.target_language,
    );

    let stage = TranslateStageConfig {
        batch_size: args.batch_size.unwrap_or(config.batch_size),
        separator: args.separator.unwrap_or(config.separator),
        target_language: config.target_language.clone(),
        translated_name: config.translated_name.clone(),
    };

    let summary = run_translation(&args.input, &args.output, engine.as_mut(), &stage)
        .context("translation stage failed")?;

    println!(
        "Translated {} texts in {} batch(es) with engine '{}' ({} failed batch(es))",
        summary.entries, summary.batches, summary.engine, summary.failed_batches
    );
    println!("Output saved to {}", args.output.display());
    Ok(())
}

fn run_clean_cmd(args: CleanArgs) -> Result<()> {
    let config = load_config(&args.common)?;
    let separator = args.separator.unwrap_or(config.separator);

    let summary = run_clean(&args.input, &args.output, &separator)
        .context("clean stage failed")?;

    println!(
        "Cleaned {} of {} text entries",
        summary.changed, summary.nodes
    );
    println!("Output saved to {}", args.output.display());
    Ok(())
}
