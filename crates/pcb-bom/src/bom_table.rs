use std::io::{self, Write};

use comfy_table::{Cell, CellAlignment, Color, Table};

use crate::merge::BomTable;
use crate::schema::BomSchema;

impl BomTable {
    /// Write the table for terminal display.
    ///
    /// Rows with no supplier part numbers at all are highlighted, since they
    /// cannot be ordered as-is.
    pub fn write_table<W: Write>(&self, schema: &BomSchema, mut writer: W) -> io::Result<()> {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(comfy_table::ContentArrangement::DynamicFullWidth);

        let header: Vec<&str> = schema
            .output_layout
            .header
            .split(';')
            .map(|h| h.trim_matches('"'))
            .filter(|h| !h.is_empty())
            .collect();
        table.set_header(header);

        for (record, quantity) in self.iter() {
            let unsourced = !schema.backfillable.is_empty()
                && schema
                    .backfillable
                    .iter()
                    .all(|&i| record.field(i).is_empty());

            let mut cells: Vec<Cell> = record
                .fields()
                .iter()
                .map(|field| {
                    let cell = Cell::new(field);
                    if unsourced {
                        cell.fg(Color::Yellow)
                    } else {
                        cell
                    }
                })
                .collect();

            let at = schema.output_layout.quantity_column.min(cells.len());
            cells.insert(
                at,
                Cell::new(quantity.to_string()).set_alignment(CellAlignment::Right),
            );
            table.add_row(cells);
        }

        writeln!(writer, "{table}")?;
        writeln!(
            writer,
            "{} parts, {} total",
            self.len(),
            self.total_quantity()
        )?;
        Ok(())
    }
}
