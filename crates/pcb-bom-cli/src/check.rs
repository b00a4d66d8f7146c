use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pcb_bom::io::read_table;
use pcb_bom::{BomError, BomSchema, Layout, decode_table};

#[derive(Args, Debug, Clone)]
#[command(about = "Validate BOM files without writing anything")]
pub struct CheckArgs {
    /// BOM files to validate
    #[arg(value_name = "FILES", required = true, value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,
}

fn check_file(path: &Path, schema: &BomSchema) -> Result<(Layout, usize), BomError> {
    let raw = read_table(path)?;
    let (layout, records) = decode_table(&raw, schema).map_err(|e| e.at(path))?;
    Ok((layout, records.len()))
}

pub fn execute(args: CheckArgs) -> Result<()> {
    let schema = BomSchema::default();
    let mut failed = 0;

    for path in &args.files {
        match check_file(path, &schema) {
            Ok((layout, rows)) => {
                println!(
                    "{} {}: {rows} rows ({layout} layout)",
                    "✓".green(),
                    path.display()
                );
            }
            Err(err) => {
                println!("{} {err}", "✗".red());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} BOM files failed validation", args.files.len());
    }
    Ok(())
}
