//! Consolidation of per-project BOM exports into a single master BOM.
//!
//! Every project BOM is decoded into canonical records ([`codec`]), has its
//! supplier part numbers filled from a trusted sample BOM ([`backfill`]) and
//! is folded into a master table ([`merge`]). Whether two rows describe the
//! same part is decided by their [`identity::IdentityKey`]: all fields except
//! the designator and the supplier part numbers.
//!
//! All stages take the same [`BomSchema`], which describes the record shape
//! and both on-disk layouts.

pub mod backfill;
#[cfg(feature = "table")]
mod bom_table;
pub mod codec;
pub mod identity;
pub mod io;
pub mod manifest;
pub mod merge;
pub mod run;
pub mod schema;

use std::path::{Path, PathBuf};

pub use backfill::{SampleIndex, backfill};
pub use codec::{CanonicalRecord, decode_row, decode_table, detect_layout, encode_row};
pub use identity::{IdentityKey, IdentityPayload, from_identity, to_identity};
pub use manifest::Manifest;
pub use merge::{BomTable, fold_into_master, merge_row};
pub use run::{RunOptions, RunSummary};
pub use schema::{BomSchema, Layout, LayoutSpec};

/// Errors raised while decoding, merging or writing BOM files
#[derive(Debug, thiserror::Error)]
pub enum BomError {
    #[error("Unrecognized BOM format, header: {header}")]
    UnrecognizedFormat { header: String },

    #[error("Line {line}: invalid quantity '{value}'")]
    MalformedQuantity { line: usize, value: String },

    #[error("Line {line}: expected at least {expected} fields, found {found}")]
    SchemaMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Quantity overflow while merging '{key}'")]
    QuantityOverflow { key: String },

    #[error("Invalid BOM schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Failed to parse manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {error}", .path.display())]
    File { path: PathBuf, error: Box<BomError> },
}

impl BomError {
    /// Attach the file the error came from.
    pub fn at(self, path: impl AsRef<Path>) -> Self {
        match self {
            // Keep the innermost path
            err @ BomError::File { .. } => err,
            err => BomError::File {
                path: path.as_ref().to_path_buf(),
                error: Box::new(err),
            },
        }
    }

    /// Source line of the failing row, if the error points at one.
    pub fn line(&self) -> Option<usize> {
        match self {
            BomError::MalformedQuantity { line, .. } | BomError::SchemaMismatch { line, .. } => {
                Some(*line)
            }
            BomError::File { error, .. } => error.line(),
            _ => None,
        }
    }
}
