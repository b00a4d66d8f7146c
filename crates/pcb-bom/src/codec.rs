use serde::{Deserialize, Serialize};

use crate::io::RawTable;
use crate::schema::{BomSchema, Layout};
use crate::BomError;

/// A BOM row normalized to the output field order, without its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalRecord(Vec<String>);

impl CanonicalRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// A record of `len` empty fields.
    pub fn empty(len: usize) -> Self {
        Self(vec![String::new(); len])
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn field(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or_default()
    }

    pub fn set_field(&mut self, index: usize, value: impl Into<String>) {
        self.0[index] = value.into();
    }

    pub fn into_fields(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for CanonicalRecord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for CanonicalRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(";"))
    }
}

/// Identify the layout of a BOM file from its header line.
pub fn detect_layout(header: &str, schema: &BomSchema) -> Result<Layout, BomError> {
    let header = header.strip_suffix('\r').unwrap_or(header);
    [Layout::Default, Layout::Output]
        .into_iter()
        .find(|&layout| schema.layout(layout).header == header)
        .ok_or_else(|| BomError::UnrecognizedFormat {
            header: header.to_string(),
        })
}

/// Decode one data row of a file with the given layout.
///
/// `line` is the 1-based source line, reported in errors.
pub fn decode_row<S: AsRef<str>>(
    fields: &[S],
    layout: Layout,
    schema: &BomSchema,
    line: usize,
) -> Result<(CanonicalRecord, u64), BomError> {
    let spec = schema.layout(layout);

    let expected = spec.required_fields();
    if fields.len() < expected {
        return Err(BomError::SchemaMismatch {
            line,
            expected,
            found: fields.len(),
        });
    }

    let raw_quantity = fields[spec.quantity_column].as_ref();
    let quantity = raw_quantity
        .trim()
        .parse::<u64>()
        .map_err(|_| BomError::MalformedQuantity {
            line,
            value: raw_quantity.to_string(),
        })?;

    let record = spec
        .columns
        .iter()
        .map(|column| column.map_or("", |c| fields[c].as_ref()))
        .collect();

    Ok((record, quantity))
}

/// Fields of an output-layout row for `record`.
pub fn encode_row(record: &CanonicalRecord, quantity: u64, schema: &BomSchema) -> Vec<String> {
    let mut fields = record.fields().to_vec();
    let at = schema.output_layout.quantity_column.min(fields.len());
    fields.insert(at, quantity.to_string());
    fields
}

/// Decode every row of a table, detecting its layout from the header.
pub fn decode_table(
    table: &RawTable,
    schema: &BomSchema,
) -> Result<(Layout, Vec<(CanonicalRecord, u64)>), BomError> {
    let layout = detect_layout(&table.header, schema)?;
    let records = table
        .rows
        .iter()
        .map(|row| decode_row(&row.fields, layout, schema, row.line))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("Decoded {} rows ({layout} layout)", records.len());
    Ok((layout, records))
}
