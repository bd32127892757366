use clap::{Parser, Subcommand};
use retro_shelf::{config, generate, import, output, scan};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "retro-shelf")]
#[command(about = "Static site generator for retro game libraries")]
#[command(long_about = "\
Static site generator for retro game libraries

Your filesystem is the data source. Top-level directories become consoles,
their subdirectories become games, and an optional game.json describes each
game.

Library structure:

  library/
  ├── config.toml                  # Site config (optional)
  ├── SNES/                        # Console (folder name = display name)
  │   ├── Super Metroid/           # Game
  │   │   ├── game.json            # {\"title\", \"year\", \"publisher\", \"region\",
  │   │   │                        #  \"tags\", \"notes\", \"cover\", \"video\"}
  │   │   ├── cover.jpg            # Referenced by \"cover\"
  │   │   └── intro.mp4            # Referenced by \"video\"
  │   └── Chrono Trigger/          # No game.json → title from folder name
  └── .drafts/                     # Hidden → ignored

Import copies images and videos (never ROMs) from existing per-game folders:

  retro-shelf import SNES ~/roms/snes

Run 'retro-shelf gen-config' to generate a documented config.toml.")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Library root directory
    #[arg(long, default_value = "library", global = true)]
    library: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log progress details (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the library and write the static site
    Build,
    /// Scan the library and report problems without writing anything
    Check,
    /// Copy media from per-game source folders into the library
    Import {
        /// Console folder to import into, e.g. "SNES"
        console: String,
        /// Folder containing one subfolder per game
        source: PathBuf,
        /// Replace game folders that already exist in the library
        #[arg(long)]
        overwrite: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.library)?;

            println!("==> Stage 1: Scanning {}", cli.library.display());
            let report = scan::scan(&cli.library)?;
            output::print_scan_output(&report);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let generated = generate::generate(&report.catalog, &cli.output, &site_config)?;
            output::print_generate_output(&generated);
            output::print_warnings(&report.warnings);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            config::load_config(&cli.library)?;
            println!("==> Checking {}", cli.library.display());
            let report = scan::scan(&cli.library)?;
            output::print_scan_output(&report);
            output::print_warnings(&report.warnings);
            if report.warnings.is_empty() {
                println!("==> Library is valid");
            } else {
                println!("==> Library has {} warnings", report.warnings.len());
            }
        }
        Command::Import {
            console,
            source,
            overwrite,
        } => {
            println!("==> Importing {} into {}", source.display(), console);
            let options = import::ImportOptions { overwrite };
            let report = import::import(&cli.library, &console, &source, &options)?;
            output::print_import_output(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Warnings by default, debug with `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
