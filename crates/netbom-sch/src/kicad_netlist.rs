//! Reading KiCad netlist exports (`.net`, `kicadsexpr` format).
//!
//! Only the parts relevant for a BOM are read: the title block of the root sheet
//! and the `(components ...)` list. Nets and library parts are ignored.

use std::path::{Path, PathBuf};

use netbom_sexpr::kicad::{
    atom_prop, child_list, comp_fields, non_empty_atom_prop, root_sheet, title_block_comments,
};
use netbom_sexpr::{ParseError, Sexpr};
use thiserror::Error;

use crate::component::Component;
use crate::schematic::{Schematic, TitleBlock};

#[derive(Debug, Error)]
pub enum NetlistError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed netlist: {0}")]
    Syntax(#[from] ParseError),
    #[error("Not a KiCad netlist: expected `(export ...)`, found `{0}`")]
    NotAnExport(String),
    #[error("Component #{index} has no reference")]
    MissingReference { index: usize },
}

/// Read a netlist file into a [`Schematic`].
pub fn read_netlist(path: &Path) -> Result<Schematic, NetlistError> {
    let text = std::fs::read_to_string(path).map_err(|source| NetlistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let schematic = parse_netlist(&text)?;
    log::debug!(
        "Read {} components from {}",
        schematic.components.len(),
        path.display()
    );
    Ok(schematic)
}

/// Parse netlist text into a [`Schematic`].
pub fn parse_netlist(text: &str) -> Result<Schematic, NetlistError> {
    let root = netbom_sexpr::parse(text)?;
    let items = match root.as_list() {
        Some(items) if root.tag() == Some("export") => items,
        _ => {
            let found = root
                .tag()
                .or_else(|| root.as_atom())
                .unwrap_or("list")
                .to_string();
            return Err(NetlistError::NotAnExport(found));
        }
    };

    let title_block = child_list(items, "design")
        .and_then(root_sheet)
        .and_then(|sheet| child_list(sheet, "title_block"))
        .map(read_title_block)
        .unwrap_or_default();

    let components = match child_list(items, "components") {
        Some(list) => netbom_sexpr::find_all_child_lists(list, "comp")
            .into_iter()
            .enumerate()
            .map(|(index, comp)| read_component(index, comp))
            .collect::<Result<Vec<_>, _>>()?,
        None => {
            log::warn!("Netlist has no components section");
            Vec::new()
        }
    };

    Ok(Schematic::new(title_block, components))
}

fn read_title_block(block: &[Sexpr]) -> TitleBlock {
    let mut title_block = TitleBlock {
        title: atom_prop(block, "title").unwrap_or_default(),
        company: atom_prop(block, "company").unwrap_or_default(),
        ..Default::default()
    };

    for (number, value) in title_block_comments(block) {
        let slot = match number {
            1 => &mut title_block.number,
            2 => &mut title_block.developer,
            3 => &mut title_block.verifier,
            4 => &mut title_block.approver,
            6 => &mut title_block.inspector,
            _ => continue,
        };
        *slot = value;
    }
    title_block
}

fn read_component(index: usize, comp: &[Sexpr]) -> Result<Component, NetlistError> {
    let reference =
        atom_prop(comp, "ref").ok_or(NetlistError::MissingReference { index })?;

    // KiCad 7+ writes the description on the component, older versions only on the
    // library source.
    let description = non_empty_atom_prop(comp, "description")
        .or_else(|| {
            child_list(comp, "libsource").and_then(|lib| atom_prop(lib, "description"))
        })
        .unwrap_or_default();

    let fields = comp_fields(comp)
        .into_iter()
        .map(|(name, text)| {
            let text = if text == "~" { String::new() } else { text };
            (name, text)
        })
        .collect();

    Ok(Component {
        reference,
        value: non_empty_atom_prop(comp, "value").unwrap_or_default(),
        footprint: non_empty_atom_prop(comp, "footprint").unwrap_or_default(),
        datasheet: non_empty_atom_prop(comp, "datasheet").unwrap_or_default(),
        description,
        fields,
    })
}
