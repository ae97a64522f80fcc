use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use netbom_sch::Component;

#[derive(Args, Debug, Clone)]
#[command(about = "Show how component values are normalized")]
pub struct ValueArgs {
    /// Designator that selects the value family (C, L, R or other)
    #[arg(value_name = "REFERENCE")]
    pub reference: String,

    /// Values as written in the schematic
    #[arg(value_name = "VALUE", required = true)]
    pub values: Vec<String>,

    /// Put a space between the number and the unit
    #[arg(long)]
    pub space: bool,

    /// Also print the magnitude in base units
    #[arg(short, long)]
    pub expanded: bool,
}

pub fn execute(args: ValueArgs) -> Result<()> {
    let mut writer = io::stdout().lock();
    for value in &args.values {
        let component = Component::new(args.reference.as_str(), value.as_str());
        let display = component.value_with_units(args.space);
        if args.expanded {
            writeln!(writer, "{display}\t{}", component.expanded_value())?;
        } else {
            writeln!(writer, "{display}")?;
        }
    }
    Ok(())
}
