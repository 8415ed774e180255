mod render;
mod update_flow;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use addonup_catalog::{HttpCatalog, DEFAULT_CATALOG_URL};
use addonup_installer::{AddonDirStore, AddonsLayout};

use render::{current_output_style, render_section_header};
use update_flow::{format_pass_report_lines, run_update_pass};

#[derive(Parser, Debug)]
#[command(name = "addonup")]
#[command(about = "Keeps a game addons directory in sync with the remote catalog", long_about = None)]
struct Cli {
    /// Path to the AddOns directory
    addons_path: PathBuf,

    /// Game flavor the installed client runs
    #[arg(short = 'g', long = "flavor", value_enum, default_value_t = GameFlavor::Retail)]
    flavor: GameFlavor,

    /// Check addon versions even when the catalog stamp is unchanged
    #[arg(short, long)]
    force: bool,

    /// Override the catalog base URL (dev)
    #[arg(short = 'a', long = "api-url", default_value = DEFAULT_CATALOG_URL)]
    api_url: String,

    /// Wait for Enter before exiting
    #[arg(short, long)]
    pause: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum GameFlavor {
    #[value(name = "wow_retail")]
    Retail,
    #[value(name = "wow_classic")]
    Classic,
}

impl GameFlavor {
    fn as_variant(self) -> &'static str {
        match self {
            Self::Retail => "wow_retail",
            Self::Classic => "wow_classic",
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("ADDONUP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    info!(
        api_url = %cli.api_url,
        addons_path = %cli.addons_path.display(),
        flavor = cli.flavor.as_variant(),
        "starting update pass"
    );

    let catalog = HttpCatalog::new(cli.api_url.clone())?;
    let store = AddonDirStore::new(AddonsLayout::new(&cli.addons_path))?;
    let report = run_update_pass(
        &catalog,
        &store,
        &cli.addons_path,
        cli.force,
        cli.flavor.as_variant(),
    )?;

    let style = current_output_style();
    if let Some(header) = render_section_header(style, "Update pass") {
        println!();
        println!("{header}");
    }
    for line in format_pass_report_lines(&report, style) {
        println!("{line}");
    }

    if cli.pause {
        print!("Press Enter to continue...");
        std::io::stdout()
            .flush()
            .context("failed to flush stdout")?;
        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .context("failed to read from stdin")?;
    }

    Ok(())
}
