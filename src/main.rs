use std::path::PathBuf;

use anyhow::{Context, Result};
use bevy_app::App;
use bevy_log::{Level, LogPlugin, info};
use clap::Parser;

use city_layout::config::INITIAL_SEED;
use city_layout::{CityDescriptor, CityLayout, CityLayoutPlugin, RegenerateEvent};

const LOG_FILTER: &str = "city_layout=info";

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "City block layout generator", long_about = None)]
struct Args {
    // City descriptor (JSON)
    input: PathBuf,

    // Seed for jitter, rotation, shuffling and sampling
    #[arg(short, long, default_value_t = INITIAL_SEED)]
    seed: u64,

    // Write the layout here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    // Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    // Log relocations and carve-outs too
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let city = CityDescriptor::load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    city.validate().context("invalid city descriptor")?;

    let (level, filter) = if args.verbose {
        (Level::DEBUG, "city_layout=debug")
    } else {
        (Level::INFO, LOG_FILTER)
    };

    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level,
        filter: filter.to_string(),
        ..Default::default()
    })
    .add_plugins(CityLayoutPlugin)
    .insert_resource(city);

    // a single headless update runs the regeneration system once
    app.world_mut().send_event(RegenerateEvent { seed: args.seed });
    app.update();

    let layout = app
        .world_mut()
        .remove_resource::<CityLayout>()
        .context("no layout after generation")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&layout)?
    } else {
        serde_json::to_string(&layout)?
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {} buildings to {}", layout.buildings.len(), path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
