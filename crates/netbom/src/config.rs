use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use netbom_sch::Settings;

#[derive(Args, Debug, Clone)]
#[command(about = "Print the effective settings as TOML")]
pub struct ConfigArgs {
    /// Settings file to read; defaults apply to everything it leaves out
    #[arg(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

/// Settings from `path`, or the defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

pub fn execute(args: ConfigArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    let text = settings.to_toml()?;
    let mut writer = io::stdout().lock();
    write!(writer, "{text}")?;
    Ok(())
}
