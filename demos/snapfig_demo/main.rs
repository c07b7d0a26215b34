//! # snapfig demo application
//!
//! A sample CLI tool that wires [snapfig](https://docs.rs/snapfig) into a
//! real binary. It exists to demonstrate and manually verify snapfig's
//! features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example snapfig_demo -- show
//! cargo run --example snapfig_demo -- config list
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature              | How to exercise it                                                      |
//! |----------------------|-------------------------------------------------------------------------|
//! | Auto-generated file  | Run `show` once; `abilities.yml` appears in the current directory       |
//! | Fallback locations   | Remove it and create `~/.snapfig-demo/abilities.yml`; `show` reads it   |
//! | `config gen`         | `cargo run --example snapfig_demo -- config gen`                        |
//! | `config get`         | `cargo run --example snapfig_demo -- config get keraunos.cooldown`      |
//! | `config set`         | `cargo run --example snapfig_demo -- config set keraunos.cooldown 15`   |
//! | Validated set        | `cargo run --example snapfig_demo -- config set medkit.charges 50`      |
//! | `config unset`       | `cargo run --example snapfig_demo -- config unset keraunos.cooldown`    |
//! | Strict mode          | Add an unknown key to the file, then run `show --strict`                |
//! | Logging              | `RUST_LOG=snapfig=debug cargo run --example snapfig_demo -- show`       |

mod schema;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use snapfig::{Config, ConfigArgs, Loader, LoaderBuilder, SearchPath, SnapfigError};

/// snapfig demo, a sample CLI app for showcasing snapfig integration.
#[derive(Parser, Debug)]
#[command(name = "snapfig-demo")]
struct Cli {
    /// Fail on keys the schema does not declare.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the loaded configuration (colored by `color`).
    Show {
        /// Print only this section (e.g. "keraunos").
        #[arg(long)]
        section: Option<String>,
    },
    /// Manage the configuration file (gen, list, get, set, unset).
    Config(ConfigArgs),
}

/// Search order: cwd, then `~/.snapfig-demo/`, then the platform config dir.
fn make_builder(cli: &Cli) -> Result<LoaderBuilder, SnapfigError> {
    Ok(Loader::builder(schema::abilities()?)
        .app_name("snapfig-demo")
        .search_paths(vec![
            SearchPath::Cwd,
            SearchPath::Home(".snapfig-demo"),
            SearchPath::Platform,
        ])
        .strict(cli.strict))
}

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        _ => "\x1b[0m",
    }
}

const RESET: &str = "\x1b[0m";

fn show(config: &Config, section: Option<&str>) -> Result<(), SnapfigError> {
    let color = ansi_color_code(config.get_text("color")?);
    let prefix = section.map(|s| format!("{s}."));
    let entries: Vec<(String, String)> = config
        .all_values()
        .iter()
        .filter(|v| prefix.as_deref().is_none_or(|p| v.path().starts_with(p)))
        .map(|v| (v.path().to_string(), snapfig::writer::format_inline(&v.value())))
        .collect();

    if entries.is_empty() {
        return Err(SnapfigError::UnknownPath(section.unwrap_or_default().to_string()));
    }

    let width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in &entries {
        println!("{color}{key:<width$}{RESET}  {value}");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), SnapfigError> {
    let loader = make_builder(&cli)?.build()?;
    match cli.command {
        Commands::Show { section } => {
            let config = loader.load()?;
            if config.get_bool("abilities-enabled")? {
                println!("{}", config.get_text("motd")?);
            }
            show(&config, section.as_deref())
        }
        Commands::Config(args) => loader.handle_and_print(&args.into_action()),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error:\n{e}");
        std::process::exit(1);
    }
}
