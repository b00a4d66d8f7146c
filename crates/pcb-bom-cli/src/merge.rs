use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use indicatif::ProgressBar;
use pcb_bom::manifest::MANIFEST_FILE;
use pcb_bom::run::RunSummary;
use pcb_bom::{Manifest, RunOptions};

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum SummaryFormat {
    #[default]
    Human,
    Json,
}

impl std::fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryFormat::Human => write!(f, "human"),
            SummaryFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Merge project BOMs into the master BOM")]
pub struct MergeArgs {
    /// Manifest listing the projects to merge
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = MANIFEST_FILE,
        value_hint = clap::ValueHint::FilePath
    )]
    pub manifest: PathBuf,

    /// Decode and merge, but do not write any file
    #[arg(long)]
    pub dry_run: bool,

    /// Summary format
    #[arg(short, long, default_value_t = SummaryFormat::Human)]
    pub format: SummaryFormat,
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

pub fn execute(args: MergeArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Failed to load {}", args.manifest.display()))?;

    let options = RunOptions {
        dry_run: args.dry_run,
        ..RunOptions::default()
    };

    let spinner = create_spinner(&format!("Merging {} projects", manifest.projects.len()));
    let result = pcb_bom::run::run(&manifest, &options);
    spinner.finish_and_clear();
    let summary = result.context("BOM merge failed")?;

    match args.format {
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        SummaryFormat::Human => print_summary(&summary, args.dry_run),
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    for project in &summary.projects {
        let filled = if project.backfilled > 0 {
            format!(", {} filled from sample", project.backfilled)
        } else {
            String::new()
        };
        println!(
            "{} {}: {} rows ({} layout){filled}",
            "✓".green(),
            project.name.bold(),
            project.rows,
            project.layout
        );
    }

    let verb = if dry_run { "Would write" } else { "Wrote" };
    println!(
        "{verb} {}: {} parts, {} total",
        summary.output.display(),
        summary.master.len(),
        summary.total_quantity()
    );
}
