use std::io::{self, Write};

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::bom::{Bom, HEADERS};

impl Bom {
    /// Write the BOM as a formatted table, preceded by the document title.
    pub fn write_table<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let heading = [&self.title_block.number, &self.title_block.title]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if !heading.is_empty() {
            writeln!(writer, "{heading}")?;
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::DynamicFullWidth);
        table.set_header(HEADERS.to_vec());

        for row in &self.rows {
            if row.is_heading() {
                // Group heading: centered in the name column.
                let mut cells: Vec<Cell> = (0..HEADERS.len()).map(|_| Cell::new("")).collect();
                cells[1] = Cell::new(&row.name)
                    .add_attribute(Attribute::Underlined)
                    .set_alignment(CellAlignment::Center);
                table.add_row(cells);
                continue;
            }

            let mut cells: Vec<Cell> = row.cells().into_iter().map(Cell::new).collect();
            cells[6] = Cell::new(row.quantity.unwrap_or_default()).set_alignment(CellAlignment::Right);
            table.add_row(cells);
        }

        writeln!(writer, "{table}")?;
        writeln!(writer, "Total: {}", self.quantity())?;
        Ok(())
    }
}
