use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod check;
mod merge;
mod show;

#[derive(Parser)]
#[command(name = "pcb-bom")]
#[command(about = "Consolidate project BOMs into a master BOM", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every project BOM listed in pcb-bom.toml into the master BOM
    #[command(alias = "m")]
    Merge(merge::MergeArgs),

    /// Print a BOM file
    Show(show::ShowArgs),

    /// Validate BOM files without writing anything
    Check(check::CheckArgs),
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

    // Default level depends on --debug, RUST_LOG overrides both
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Merge(args) => merge::execute(args),
        Commands::Show(args) => show::execute(args),
        Commands::Check(args) => check::execute(args),
    }
}
