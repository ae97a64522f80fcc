//! Purchased parts list ("ведомость покупных изделий") generation for KiCad designs.
//!
//! The pipeline is:
//!
//! * [`kicad_netlist`] reads a netlist export into a [`Schematic`];
//! * [`Component`] resolves BOM values through the configured field names and
//!   [`template`]s, normalizing component [`value`]s on the way;
//! * [`group`] collects components into ranges and groups and [`sort`]s them;
//! * [`bom`] flattens the groups into rows, with [`refdes`] compressing designator
//!   lists, and writes them as CSV, JSON or a table (`table` feature).
//!
//! Nothing in the grouping pipeline fails: values that cannot be parsed are shown
//! as written and sort last. Only reading files returns errors.

pub mod bom;
#[cfg(feature = "table")]
mod bom_table;
pub mod component;
pub mod group;
pub mod kicad_netlist;
pub mod refdes;
pub mod schematic;
pub mod settings;
pub mod sort;
pub mod template;
pub mod type_names;
pub mod value;

pub use bom::{Bom, BomRow, bom_rows};
pub use component::{BomContext, Component};
pub use group::{CompGroup, CompRange, grouped_components};
pub use kicad_netlist::{NetlistError, parse_netlist, read_netlist};
pub use schematic::{Schematic, TitleBlock};
pub use settings::{BomField, Settings, SettingsError, SortData, SortOrder, SortSpec};
pub use template::Number;
pub use type_names::{TypeNames, TypeNamesError};
