use anyhow::Context;
use clap::{Parser, Subcommand};
use picture_profile::{config, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "picture-profile")]
#[command(about = "Inspect responsive image profiles")]
#[command(long_about = "\
Inspect responsive image profiles

A profile file holds named [profiles.<name>] tables layered over an optional
[defaults] table:

  [defaults]
  quality = 75

  [profiles.hero]
  srcset_widths = [640, 1024, 1600]
  sizes = [\"(max-width: 1024px) 100vw\", \"1600px\"]

Fallback width resolution (first available wins):
  explicit fallback_width → widest media condition → largest srcset width

Run 'picture-profile gen-config' to generate a documented profiles.toml.")]
#[command(version)]
struct Cli {
    /// Log loading details (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a profile file and show every profile with its fallback width
    Check {
        /// Profile file to load
        #[arg(default_value = "profiles.toml")]
        file: PathBuf,

        /// Print resolved profiles as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock profiles.toml with all options documented
    GenConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Check { file, json } => {
            let set = config::load_profiles(&file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            if json {
                println!("{}", output::format_check_json(&set)?);
            } else {
                output::print_check_output(&set);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_profiles_toml());
        }
    }

    Ok(())
}

/// Default to `warn`, or `debug` with `--verbose`. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
