//! Cache management commands.

use clap::Subcommand;

use crate::util::GlobalArgs;

#[derive(clap::Args)]
pub struct Args {
    #[command(subcommand)]
    command: CacheCommand,
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Invalidate the root description and every description it references
    Clear {
        /// Key prefix of the nested descriptions (default: the configured prefix)
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Show cache directory path
    Path,
}

pub fn run(global: &GlobalArgs, args: Args) -> anyhow::Result<()> {
    match args.command {
        CacheCommand::Clear { prefix } => {
            let registry = global.registry()?;
            let count = registry.invalidate_all(prefix.as_deref());
            println!("Invalidated {count} cache keys.");
        }
        CacheCommand::Path => println!("{}", global.cache_dir().display()),
    }
    Ok(())
}
