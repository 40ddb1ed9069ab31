use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use compute::band_distribution;
use formats::scenario::ScenarioParams;
use layers::color_scale::{ColorScale, StressBand};
use layers::compositor::CompositorConfig;
use layers::layer::LayerId;
use panels::PointerListeners;
use runtime::viewport::ViewportSize;
use serde_json::json;
use streaming::provider::HotspotProvider;
use streaming::store::LoadStatus;
use tracing_subscriber::EnvFilter;
use viewer::{Backend, MapSession, ViewerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "CityPulse stress-map session driver")]
struct Cli {
    /// Backend base URL (overrides CITYPULSE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in milliseconds (overrides CITYPULSE_TIMEOUT_MS)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Read grid/trees/planting_sites GeoJSON from this directory instead of the API
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON file with a compositor configuration (colour scale, LOD tiers, threshold)
    #[arg(long)]
    compositor_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Copy)]
struct ScenarioArgs {
    /// Change in car dependence, -1..0
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    car: f64,

    /// Tree investment, 0..1
    #[arg(long, default_value_t = 0.0)]
    trees: f64,

    /// Transit investment, 0..1
    #[arg(long, default_value_t = 0.0)]
    transit: f64,
}

impl ScenarioArgs {
    fn params(self) -> ScenarioParams {
        ScenarioParams::new(self.car, self.trees, self.transit)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load datasets and print the composed layer stack
    Layers {
        /// Camera zoom used for tree sampling
        #[arg(long, default_value_t = 11.0)]
        zoom: f64,

        /// Toggle a layer relative to the initial state (repeatable)
        #[arg(long = "toggle")]
        toggles: Vec<LayerId>,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Print citywide current vs scenario metrics
    Metrics {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Fetch details for one grid cell
    Cell {
        id: String,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// List the backend's hotspot summaries
    Hotspots,
    /// Generate the scenario narrative
    Narrative {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Show the fill colour and legend band for a CSI value
    Color {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Cli::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Color { value } = cli.command {
        let scale = ColorScale::csi();
        let c = scale.color_for(value);
        let band = StressBand::of(value);
        print_json(&json!({ "value": value, "rgba": c.to_array(), "band": band.label() }))?;
        return Ok(());
    }

    let config = ViewerConfig::from_env()?.with_overrides(
        cli.api_url.as_deref(),
        cli.timeout_ms,
        cli.data_dir.clone(),
    )?;
    let compositor = match &cli.compositor_config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => CompositorConfig::default(),
    };
    let backend = Backend::from_config(&config)?;
    tracing::info!(backend = %backend.describe(), "using backend");

    let listeners = PointerListeners::new();
    let mut session = MapSession::new(&listeners, compositor, ViewportSize::default());

    match cli.command {
        Command::Layers {
            zoom,
            toggles,
            scenario,
        } => {
            load_with_scenario(&mut session, &backend, scenario.params()).await?;
            for layer in toggles {
                session.toggle_layer(layer);
            }
            session.on_viewport_change(session.viewport().with_zoom(zoom));
            let composition = session.layers();
            print_json(&json!({
                "status": status_label(session.status()),
                "scenario": session.scenario(),
                "zoom": session.viewport().zoom,
                "layers": composition.stack.summary(),
                "counters": session.metrics().snapshot(),
            }))?;
        }
        Command::Metrics { scenario } => {
            load_with_scenario(&mut session, &backend, scenario.params()).await?;
            let grid = session.store().grid().ok_or("grid unavailable")?;
            print_json(&json!({
                "scenario": session.scenario(),
                "aggregate_metrics": session.scenario_metrics(),
                "bands": band_distribution(&grid),
            }))?;
        }
        Command::Cell { id, scenario } => {
            session.set_scenario(scenario.params());
            session.select_cell(&backend, &id).await?;
            print_json(&session.selected_cell())?;
        }
        Command::Hotspots => {
            print_json(&backend.hotspots().await?)?;
        }
        Command::Narrative { scenario } => {
            load_with_scenario(&mut session, &backend, scenario.params()).await?;
            println!("{}", session.generate_narrative(&backend).await);
        }
        Command::Color { .. } => {}
    }
    Ok(())
}

/// Full load, then the scenario grid when sliders are set. A failed load is
/// fatal for the CLI.
async fn load_with_scenario(
    session: &mut MapSession,
    backend: &Backend,
    params: ScenarioParams,
) -> Result<(), Box<dyn std::error::Error>> {
    if let LoadStatus::Failed { message } = session.load(backend).await {
        return Err(message.clone().into());
    }
    if params.is_active() {
        session.apply_scenario(backend, params).await;
    }
    Ok(())
}

fn status_label(status: &LoadStatus) -> &'static str {
    match status {
        LoadStatus::Idle => "idle",
        LoadStatus::Loading => "loading",
        LoadStatus::Ready => "ready",
        LoadStatus::Failed { .. } => "failed",
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
