use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use i18n_sync::{ConfigLayer, Format, load_config};

#[derive(Parser, Debug)]
#[command(name = "i18n-sync", version, about = "Extract go-i18n messages and keep translation catalogs in sync")]
struct Cli {
    /// Config file (default: <workspace>/i18n-sync.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root (default: nearest directory containing go.mod)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Default language [default: en-US]
    #[arg(short = 'd', long = "default", global = true)]
    default_language: Option<String>,

    /// Output directory, relative to the workspace [default: ./locales]
    #[arg(long, global = true)]
    outdir: Option<PathBuf>,

    /// Output format [default: yaml]
    #[arg(long, value_enum, global = true)]
    outformat: Option<Format>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the project and collect message literals into the default catalog
    Extract {
        /// Path to scan; repeatable (default: the workspace)
        #[arg(long = "path")]
        paths: Vec<PathBuf>,

        /// Skip _test.go files [default: true]
        #[arg(long, action = ArgAction::Set)]
        ignore_test_files: Option<bool>,
    },
    /// Reconcile target catalogs against the default catalog
    Merge {
        /// Target language; repeatable
        #[arg(short, long = "target")]
        targets: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut layer = ConfigLayer {
        default: cli.default_language,
        outdir: cli.outdir,
        outformat: cli.outformat,
        ..Default::default()
    };
    match &cli.command {
        Command::Extract {
            paths,
            ignore_test_files,
        } => {
            if !paths.is_empty() {
                layer.path = Some(paths.clone());
            }
            layer.ignore_test_files = *ignore_test_files;
        }
        Command::Merge { targets } => {
            if !targets.is_empty() {
                layer.target = Some(targets.clone());
            }
        }
    }

    let config = match load_config(cli.workspace, cli.config, layer) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Extract { .. } => match i18n_sync::extract(&config) {
            Ok(summary) => {
                if let Some(path) = summary.written {
                    info!(path = %path.display(), "wrote source catalog");
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        },
        Command::Merge { .. } => match i18n_sync::merge(&config) {
            Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
            Ok(summary) => {
                let failed: Vec<&str> = summary.failures().map(|(lang, _)| lang).collect();
                error!(targets = ?failed, "some targets failed");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}
