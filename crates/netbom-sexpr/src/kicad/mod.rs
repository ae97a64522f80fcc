//! KiCad-specific S-expression helpers.
//!
//! - [`props`] - "property-like" query helpers
//! - [`netlist`] - KiCad netlist export (`(export ...)`) helpers

pub mod netlist;
pub mod props;

pub use netlist::{comp_fields, root_sheet, title_block_comments};
pub use props::{atom_prop, child_list, int_prop, non_empty_atom_prop};
