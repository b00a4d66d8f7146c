use serde::{Deserialize, Serialize};

use crate::BomError;

/// Header of a KiCad BOM export (note the trailing separator).
pub const DEFAULT_BOM_HEADER: &str =
    r##""Id";"Designator";"Footprint";"Quantity";"Designation";"Supplier and ref";"##;

/// Header of a consolidated BOM, also used for every file this crate writes.
pub const OUTPUT_BOM_HEADER: &str =
    r##""Comment";"Designator";"Footprint";"JLCPCB Part #";"Mouser Part #";"Quantity""##;

/// On-disk column layout of a BOM file, identified by its header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Default,
    Output,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Default => write!(f, "default"),
            Layout::Output => write!(f, "output"),
        }
    }
}

/// Where a layout keeps each canonical field and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSpec {
    /// Header line, matched verbatim.
    pub header: String,
    /// Source column for each canonical slot, `None` if the layout has no such column.
    pub columns: Vec<Option<usize>>,
    pub quantity_column: usize,
}

impl LayoutSpec {
    /// Minimum number of fields a data row must carry.
    pub fn required_fields(&self) -> usize {
        self.columns
            .iter()
            .flatten()
            .copied()
            .chain(std::iter::once(self.quantity_column))
            .max()
            .map_or(0, |max| max + 1)
    }
}

/// Fixed record schema shared by the codec, identity, backfill and merge stages.
///
/// Canonical records always follow the output column order; `field_count` is
/// the number of canonical string fields (the quantity is carried separately).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomSchema {
    pub field_count: usize,
    /// Per-instance field that never takes part in identity (the designator).
    pub ignored: usize,
    /// Fields that are not part of the identity and may be filled from a sample BOM.
    pub backfillable: Vec<usize>,
    pub default_layout: LayoutSpec,
    pub output_layout: LayoutSpec,
}

impl Default for BomSchema {
    fn default() -> Self {
        Self {
            field_count: 5,
            ignored: 1,
            backfillable: vec![3, 4],
            default_layout: LayoutSpec {
                header: DEFAULT_BOM_HEADER.to_string(),
                // Designation, Designator, Footprint; no supplier part columns
                columns: vec![Some(4), Some(1), Some(2), None, None],
                quantity_column: 3,
            },
            output_layout: LayoutSpec {
                header: OUTPUT_BOM_HEADER.to_string(),
                columns: vec![Some(0), Some(1), Some(2), Some(3), Some(4)],
                quantity_column: 5,
            },
        }
    }
}

impl BomSchema {
    pub fn layout(&self, layout: Layout) -> &LayoutSpec {
        match layout {
            Layout::Default => &self.default_layout,
            Layout::Output => &self.output_layout,
        }
    }

    pub fn is_backfillable(&self, index: usize) -> bool {
        self.backfillable.contains(&index)
    }

    /// Number of fragments in an identity key.
    pub fn identity_len(&self) -> usize {
        self.field_count - self.backfillable.len()
    }

    pub fn validate(&self) -> Result<(), BomError> {
        let invalid = |msg: String| Err(BomError::InvalidSchema(msg));

        if self.field_count == 0 {
            return invalid("schema must have at least one field".to_string());
        }
        if self.ignored >= self.field_count {
            return invalid(format!(
                "ignored field {} is outside a {}-field schema",
                self.ignored, self.field_count
            ));
        }
        for (i, &index) in self.backfillable.iter().enumerate() {
            if index >= self.field_count {
                return invalid(format!(
                    "backfillable field {index} is outside a {}-field schema",
                    self.field_count
                ));
            }
            if index == self.ignored {
                return invalid(format!(
                    "field {index} cannot be both ignored and backfillable"
                ));
            }
            if self.backfillable[..i].contains(&index) {
                return invalid(format!("backfillable field {index} listed twice"));
            }
        }

        for (layout, spec) in [
            (Layout::Default, &self.default_layout),
            (Layout::Output, &self.output_layout),
        ] {
            if spec.columns.len() != self.field_count {
                return invalid(format!(
                    "{layout} layout maps {} columns, schema has {} fields",
                    spec.columns.len(),
                    self.field_count
                ));
            }
            if spec.columns.iter().flatten().any(|&c| c == spec.quantity_column) {
                return invalid(format!(
                    "{layout} layout maps a field onto its quantity column {}",
                    spec.quantity_column
                ));
            }
        }

        // Encoding writes canonical fields in order with the quantity spliced in
        let identity: Vec<Option<usize>> = (0..self.field_count).map(Some).collect();
        if self.output_layout.columns != identity
            || self.output_layout.quantity_column > self.field_count
        {
            return invalid("output layout must follow canonical field order".to_string());
        }
        if self.default_layout.header == self.output_layout.header {
            return invalid("default and output layouts share a header".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_is_valid() {
        let schema = BomSchema::default();
        schema.validate().unwrap();
        assert_eq!(schema.identity_len(), 3);
        assert_eq!(schema.default_layout.required_fields(), 5);
        assert_eq!(schema.output_layout.required_fields(), 6);
    }

    #[test]
    fn test_rejects_ignored_backfillable_overlap() {
        let schema = BomSchema {
            backfillable: vec![1, 4],
            ..BomSchema::default()
        };
        assert!(matches!(
            schema.validate(),
            Err(BomError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_rejects_column_count_mismatch() {
        let mut schema = BomSchema::default();
        schema.default_layout.columns.pop();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_backfillable() {
        let schema = BomSchema {
            backfillable: vec![3, 3],
            ..BomSchema::default()
        };
        assert!(schema.validate().is_err());
    }
}
