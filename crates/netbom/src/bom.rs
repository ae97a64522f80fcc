use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use netbom_sch::{Bom, read_netlist};

use crate::config::load_settings;

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum BomFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl std::fmt::Display for BomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BomFormat::Table => write!(f, "table"),
            BomFormat::Csv => write!(f, "csv"),
            BomFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Generate a purchased parts list from a KiCad netlist")]
pub struct BomArgs {
    /// KiCad netlist export (.net)
    #[arg(value_name = "NETLIST", value_hint = clap::ValueHint::FilePath)]
    pub netlist: PathBuf,

    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// kicadbom2spec settings file with singular/plural type names; enables
    /// compatibility mode
    #[arg(long, value_name = "INI", value_hint = clap::ValueHint::FilePath)]
    pub compat: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value_t = BomFormat::Table)]
    pub format: BomFormat,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: BomArgs) -> Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(compat) = args.compat {
        settings.settings.compatibility_mode = true;
        settings.settings.compatibility_source = Some(compat);
    }

    let type_names = settings
        .load_type_names()
        .context("Failed to load type names")?;
    let schematic = read_netlist(&args.netlist)
        .with_context(|| format!("Failed to read netlist {}", args.netlist.display()))?
        .with_type_names(type_names);

    let bom = Bom::new(&schematic, &settings);
    log::debug!("{} rows, {} parts", bom.rows.len(), bom.quantity());

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_bom(&bom, &args.format, BufWriter::new(file))
        }
        None => write_bom(&bom, &args.format, io::stdout().lock()),
    }
}

fn write_bom<W: Write>(bom: &Bom, format: &BomFormat, mut writer: W) -> Result<()> {
    match format {
        BomFormat::Table => bom.write_table(&mut writer)?,
        BomFormat::Csv => bom.write_csv(&mut writer)?,
        BomFormat::Json => {
            bom.write_json(&mut writer)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}
