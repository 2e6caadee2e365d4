use anyhow::{Context, Result};
use clap::Parser;
use loop_planner::export::{osmand_link, to_feature_collection, to_gpx};
use loop_planner::loop_generation::{PlanError, plan_loop};
use loop_planner::routing_common::{
    BikeProfile, GeoPoint, PlannerConfig, RouteRequest, StreetGraph,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Geojson,
    Gpx,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Street graph JSON file (nodes with lat/lon, edges with length_m and optional surface)
    #[arg(long, env = "LOOP_PLANNER_GRAPH")]
    graph: PathBuf,

    /// Latitude of the loop start, WGS84 degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the loop start, WGS84 degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Target loop length in kilometers
    #[arg(long, default_value_t = 20.0)]
    distance_km: f64,

    /// Bike type used to rate road surfaces: road, gravel, mtb or none
    #[arg(long, default_value = "none")]
    bike: BikeProfile,

    /// Keep out-and-back spurs in the output polyline
    #[arg(long)]
    no_clean: bool,

    /// Points the spur cleanup looks ahead
    #[arg(long, env = "LOOP_PLANNER_LOOKAHEAD")]
    lookahead: Option<usize>,

    /// Share of the distance used for the corner walk
    #[arg(long, env = "LOOP_PLANNER_CORNER_FRACTION", value_parser = parse_corner_fraction)]
    corner_fraction: Option<f64>,

    #[arg(long, value_enum, default_value = "geojson")]
    format: OutputFormat,

    /// Write the result here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_corner_fraction(value: &str) -> Result<f64, String> {
    let fraction: f64 = value
        .parse()
        .map_err(|e| format!("`{}` is not a number: {}", value, e))?;
    if !(fraction.is_finite() && fraction > 0.0) {
        return Err(format!("corner fraction must be a positive number, got {}", value));
    }
    Ok(fraction)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if !(args.distance_km.is_finite() && args.distance_km > 0.0) {
        anyhow::bail!("--distance-km must be a positive number");
    }
    if !(-90.0..=90.0).contains(&args.lat) || !(-180.0..=180.0).contains(&args.lon) {
        anyhow::bail!("--lat/--lon out of range");
    }

    let mut config = PlannerConfig::default();
    if let Some(lookahead) = args.lookahead {
        config.backtrack_lookahead = lookahead;
    }
    if let Some(fraction) = args.corner_fraction {
        config.corner_distance_fraction = fraction;
    }

    let request = RouteRequest {
        center: GeoPoint::new(args.lon, args.lat),
        distance_km: args.distance_km,
        bike: args.bike,
        clean_backtracking: !args.no_clean,
    };

    info!(
        "Loading street graph from {} (needs to cover {:.0} m around the start)",
        args.graph.display(),
        request.capture_radius_m(&config)
    );
    let graph = StreetGraph::load_json(&args.graph)
        .with_context(|| format!("Failed to load street graph {}", args.graph.display()))?;
    info!(
        "Graph has {} nodes and {} directed edges",
        graph.len(),
        graph.edge_count()
    );

    let result = match plan_loop(&graph, &request, &config) {
        Ok(result) => result,
        Err(PlanError::NoLoop(e)) => {
            anyhow::bail!(
                "No loop could be found at this location and distance ({}). Try another start point or length.",
                e
            );
        }
        Err(e) => return Err(e.into()),
    };

    if result.is_empty() {
        warn!("The generated loop is empty, try a longer distance");
    }

    info!("Loop length: {:.1} km", result.length_km);
    if let (Some(label), Some(color)) = (result.surface.label(), result.surface.color()) {
        info!("Surface match for {} bike: {} ({})", request.bike, label, color);
    }
    if let Some(start) = result.start() {
        info!("Open in OsmAnd: {}", osmand_link(start));
    }

    let rendered = match args.format {
        OutputFormat::Geojson => serde_json::to_string_pretty(&to_feature_collection(&result))
            .context("Failed to serialize GeoJSON")?,
        OutputFormat::Gpx => to_gpx(&result.coordinates, "Loop"),
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
