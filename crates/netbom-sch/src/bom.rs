//! Flattening of component groups into printable BOM rows.

use std::io::Write;

use serde::Serialize;

use crate::component::BomContext;
use crate::group::{CompGroup, CompRange};
use crate::schematic::{Schematic, TitleBlock};
use crate::settings::{BomField, Settings};
use crate::template::Number;

/// Column headings of the purchased parts list.
pub const HEADERS: [&str; 8] = [
    "Обозначение",
    "Наименование",
    "Код продукции",
    "Обозначение документа на поставку",
    "Поставщик",
    "Куда входит (обозначение)",
    "Количество",
    "Примечание",
];

/// One line of the BOM. A group heading has only a name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BomRow {
    pub designators: String,
    pub name: String,
    pub code: String,
    pub doc: String,
    pub dealer: String,
    pub for_what: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<usize>,
    pub comment: String,
}

impl BomRow {
    /// Heading printed above the ranges of a group.
    pub fn heading(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_heading(&self) -> bool {
        self.quantity.is_none()
    }

    fn from_range(range: &CompRange, name: String, ctx: &BomContext) -> Self {
        let value = |field| range.bom_value(field, Number::AsIs, ctx);
        Self {
            designators: range.designator_range(),
            name,
            code: value(BomField::Code),
            doc: value(BomField::Doc),
            dealer: value(BomField::Dealer),
            for_what: value(BomField::ForWhat),
            quantity: Some(range.len()),
            comment: value(BomField::Comment),
        }
    }

    /// Cells in [`HEADERS`] order.
    pub fn cells(&self) -> [String; 8] {
        [
            self.designators.clone(),
            self.name.clone(),
            self.code.clone(),
            self.doc.clone(),
            self.dealer.clone(),
            self.for_what.clone(),
            self.quantity.map(|q| q.to_string()).unwrap_or_default(),
            self.comment.clone(),
        ]
    }
}

fn join_name(kind: &str, name: &str) -> String {
    match (kind.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => kind.to_string(),
        (false, false) => format!("{kind} {name}"),
    }
}

/// Rows for `groups` in order.
///
/// A group with a single range is one row named `type name` (type in singular).
/// A typed group with several ranges gets a heading with the plural type followed
/// by one row per range carrying only the name.
pub fn bom_rows(groups: &[CompGroup], ctx: &BomContext) -> Vec<BomRow> {
    let mut rows = Vec::new();
    for group in groups {
        let first = group.first();
        let kind = first.bom_value(BomField::Type, Number::AsIs, ctx);

        if group.len() == 1 {
            let singular = first.bom_value(BomField::Type, Number::Singular, ctx);
            let name = first.bom_value(BomField::Name, Number::AsIs, ctx);
            rows.push(BomRow::from_range(first, join_name(&singular, &name), ctx));
            continue;
        }

        if !kind.is_empty() {
            rows.push(BomRow::heading(
                first.bom_value(BomField::Type, Number::Plural, ctx),
            ));
        }
        for range in group {
            let name = range.bom_value(BomField::Name, Number::AsIs, ctx);
            rows.push(BomRow::from_range(range, name, ctx));
        }
    }
    rows
}

/// A complete bill of materials: title block and rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bom {
    #[serde(flatten)]
    pub title_block: TitleBlock,
    pub rows: Vec<BomRow>,
}

impl Bom {
    pub fn new(schematic: &Schematic, settings: &Settings) -> Self {
        let ctx = schematic.context(settings);
        let groups = schematic.grouped_components(settings);
        Self {
            title_block: schematic.title_block.clone(),
            rows: bom_rows(&groups, &ctx),
        }
    }

    /// Total number of parts listed.
    pub fn quantity(&self) -> usize {
        self.rows.iter().filter_map(|row| row.quantity).sum()
    }

    /// Write the title block and rows as pretty-printed JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }

    /// Write rows as CSV with a header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(HEADERS)?;
        for row in &self.rows {
            wtr.write_record(row.cells())?;
        }
        wtr.flush()?;
        Ok(())
    }
}
