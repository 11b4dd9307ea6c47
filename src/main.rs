mod error;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;
use webmenu_config::Config;
use webmenu_library::{Context, Ensured, FifoLauncher, IndexCache, Launcher};

#[derive(Parser, Debug)]
#[command(name = "webmenu", version, about = "Index MiSTer cores and arcade definitions", long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the index unless one is already persisted
    Scan {
        /// Rescan even if an index already exists
        #[arg(short, long)]
        force: bool,
    },
    /// Print the persisted index, building it first if necessary
    Index,
    /// Launch a core or arcade definition on the device
    Launch { path: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Configuration loaded");
    match cli.command {
        Command::Scan { force } => {
            let cache = index_cache(&config)?;
            match cache.ensure(force).await.or_raise(|| ErrorKind::Index)? {
                Ensured::Cached => tracing::info!(path = %cache.path().display(), "Index already exists"),
                Ensured::Rebuilt(summary) => println!(
                    "Indexed {} cores and {} arcade definitions in {} categories ({} skipped)",
                    summary.logic_images, summary.arcade_definitions, summary.category_roots, summary.errors
                ),
            }
        },
        Command::Index => {
            let cache = index_cache(&config)?;
            cache.ensure(false).await.or_raise(|| ErrorKind::Index)?;
            let bytes = cache.read().await.or_raise(|| ErrorKind::Index)?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&bytes).await.or_raise(|| ErrorKind::Output)?;
            stdout.flush().await.or_raise(|| ErrorKind::Output)?;
        },
        Command::Launch { path } => {
            let launcher = FifoLauncher::new(&config.command_fifo);
            launcher.launch(&path).await.or_raise(|| ErrorKind::Launch(path.display().to_string()))?;
        },
    }
    Ok(())
}

fn index_cache(config: &Config) -> Result<IndexCache> {
    let ctx = Context::from_config(config).or_raise(|| ErrorKind::Config)?;
    Ok(IndexCache::new(ctx, &config.index_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["webmenu", "scan"], false)]
    #[case(&["webmenu", "scan", "--force"], true)]
    #[case(&["webmenu", "-v", "scan", "-f"], true)]
    fn test_scan_force(#[case] args: &[&str], #[case] force: bool) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Scan { force: f } if f == force));
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from(["webmenu", "launch", "/media/fat/_Arcade/game.mra", "-vv", "-c", "/etc/webmenu.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/webmenu.toml")));
        assert!(matches!(cli.command, Command::Launch { path } if path == PathBuf::from("/media/fat/_Arcade/game.mra")));
    }
}
