use clap::{Parser, Subcommand};
use nu_ansi_term::Color;
use tracing_subscriber::EnvFilter;

mod commands;
mod util;

#[derive(Parser)]
#[command(name = "apimeta", about = "Inspect cached API descriptions", version)]
struct Cli {
    #[command(flatten)]
    global: util::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List operations of the root or of a nested description
    Ops(commands::ops::Args),
    /// Show method, path and parameters of an operation
    Show(commands::show::Args),
    /// Print the request an operation call would send
    Request(commands::request::Args),
    /// Manage cached descriptions
    Cache(commands::cache::Args),
}

fn init_tracing(verbose: u8) {
    let filter = if verbose > 0 {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let result = match cli.command {
        Commands::Ops(args) => commands::ops::run(&cli.global, args),
        Commands::Show(args) => commands::show::run(&cli.global, args),
        Commands::Request(args) => commands::request::run(&cli.global, args),
        Commands::Cache(args) => commands::cache::run(&cli.global, args),
    };

    if let Err(e) = result {
        eprintln!("{}", Color::Red.paint(format!("Error: {e:#}")));
        std::process::exit(1);
    }
}
