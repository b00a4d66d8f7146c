use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use pcb_bom::io::read_table;
use pcb_bom::{BomSchema, BomTable, decode_table, fold_into_master};

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum BomFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::fmt::Display for BomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BomFormat::Table => write!(f, "table"),
            BomFormat::Json => write!(f, "json"),
            BomFormat::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Print a BOM file in the output layout")]
pub struct ShowArgs {
    /// BOM file in either layout
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, default_value_t = BomFormat::Table)]
    pub format: BomFormat,

    /// Merge rows that differ only by designator
    #[arg(long)]
    pub by_part: bool,
}

pub fn execute(args: ShowArgs) -> Result<()> {
    let schema = BomSchema::default();

    let raw = read_table(&args.file)?;
    let (layout, records) = decode_table(&raw, &schema).map_err(|e| e.at(&args.file))?;
    log::debug!("{}: {layout} layout", args.file.display());

    let mut bom = BomTable::from_records(records)?;
    if args.by_part {
        let mut merged = BomTable::new();
        fold_into_master(&mut merged, &bom, &schema)?;
        bom = merged;
    }

    let mut writer = io::stdout().lock();
    match args.format {
        BomFormat::Json => writeln!(writer, "{}", serde_json::to_string_pretty(&bom)?)?,
        BomFormat::Csv => write!(writer, "{}", pcb_bom::io::render_table(&bom, &schema)?)?,
        BomFormat::Table => bom.write_table(&schema, writer)?,
    };

    Ok(())
}
