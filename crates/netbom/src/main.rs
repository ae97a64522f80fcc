use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod bom;
mod config;
mod value;

#[derive(Parser)]
#[command(name = "netbom")]
#[command(about = "Purchased parts list generator for KiCad netlists", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(alias = "b")]
    Bom(bom::BomArgs),

    #[command(alias = "v")]
    Value(value::ValueArgs),

    Config(config::ConfigArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Bom(args) => bom::execute(args),
        Commands::Value(args) => value::execute(args),
        Commands::Config(args) => config::execute(args),
    }
}
