//! Reading and writing `;`-separated BOM files.
//!
//! Files are line oriented: the first line is the layout header, kept verbatim
//! for [`crate::detect_layout`]; every other non-empty line is one row whose
//! quoted fields are split with the `csv` crate.

use std::fs;
use std::io::Write;
use std::path::Path;

use atomicwrites::{AtomicFile, OverwriteBehavior};

use crate::codec::encode_row;
use crate::merge::BomTable;
use crate::schema::BomSchema;
use crate::BomError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line in the source file.
    pub line: usize,
    pub fields: Vec<String>,
}

/// A BOM file split into its header line and raw rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub header: String,
    pub rows: Vec<RawRow>,
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b';')
        .quote(b'"')
        .has_headers(false)
        .flexible(true);
    builder
}

fn split_line(line: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = reader_builder().from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record.iter().map(str::to_string).collect())
}

pub fn parse_table(text: &str) -> Result<RawTable, BomError> {
    let mut lines = text.lines();
    let header = lines.next().unwrap_or_default();

    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = i + 2;
        let fields = split_line(line).map_err(|err| {
            log::debug!("Line {line_no}: {err}");
            err
        })?;
        rows.push(RawRow {
            line: line_no,
            fields,
        });
    }

    Ok(RawTable {
        header: header.strip_suffix('\r').unwrap_or(header).to_string(),
        rows,
    })
}

pub fn read_table(path: &Path) -> Result<RawTable, BomError> {
    log::debug!("Reading BOM {}", path.display());
    let text = fs::read_to_string(path).map_err(|e| BomError::from(e).at(path))?;
    parse_table(&text).map_err(|e| e.at(path))
}

/// Render a table in the output layout: header, then one quoted row per entry.
pub fn render_table(table: &BomTable, schema: &BomSchema) -> Result<String, BomError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(Vec::new());

    for (record, quantity) in table.iter() {
        writer.write_record(encode_row(record, quantity, schema))?;
    }

    let body = writer
        .into_inner()
        .map_err(|err| BomError::Io(err.into_error()))?;

    let mut out = String::with_capacity(body.len() + schema.output_layout.header.len() + 1);
    out.push_str(&schema.output_layout.header);
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(&body));
    Ok(out)
}

/// Replace `path` with the rendered table.
pub fn write_table(path: &Path, table: &BomTable, schema: &BomSchema) -> Result<(), BomError> {
    let contents = render_table(table, schema)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BomError::from(e).at(path))?;
    }

    // Temporary file goes next to the target, so the parent must be explicit
    let target = std::path::absolute(path).map_err(|e| BomError::from(e).at(path))?;
    AtomicFile::new(&target, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(contents.as_bytes())?;
            f.flush()
        })
        .map_err(|err| {
            let err = match err {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
            };
            BomError::from(err).at(path)
        })?;

    log::debug!("Wrote {} entries to {}", table.len(), path.display());
    Ok(())
}
