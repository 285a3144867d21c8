use crate::config::{Config, load_config};
use crate::dot::graph_to_dot;
use crate::dump::{scene_dump_string, write_output};
use crate::geo::{GeoPoint, distance, tour_length};
use crate::ir::parse_graph;
use crate::layout::curvature::assign_curvatures_scaled;
use crate::layout::{EdgeKey, LabelSet};
use crate::scene::{plan_pattern_solution, plan_tour};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{Level, debug};

#[derive(Parser, Debug)]
#[command(
    name = "routeplot",
    version,
    about = "Plot geometry for route networks: distances, edge curvature, label declutter"
)]
pub struct Args {
    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output", global = true)]
    pub output: Option<PathBuf>,

    /// Seed for randomized steps, for reproducible output
    #[arg(short = 's', long = "seed", global = true)]
    pub seed: Option<u64>,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Great-circle distance in km between two lon/lat points
    #[command(allow_negative_numbers = true)]
    Distance {
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
    },
    /// Total great-circle length of a path given as a list of {lon, lat}
    TourLength {
        /// Input file or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
    },
    /// Curvature offsets for a list of [from, to] edges
    Curvature {
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
    },
    /// Push apart labels given as {id: [x, y]}
    Declutter {
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
        /// Minimum label separation (overrides the config)
        #[arg(short = 't', long = "threshold")]
        threshold: Option<f64>,
    },
    /// Plan a map scene from a node/link document
    Plan {
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
        #[arg(short = 'k', long = "kind", value_enum, default_value = "tour")]
        kind: PlanKind,
    },
    /// Graphviz DOT source for a node/link document
    Dot {
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
        #[arg(long = "directed")]
        directed: bool,
        #[arg(long = "layout")]
        layout: Option<String>,
        #[arg(long = "sort")]
        sort: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PlanKind {
    Tour,
    Pattern,
}

#[derive(Debug, Serialize)]
struct CurvatureEntry<'a> {
    from: &'a str,
    to: &'a str,
    offsets: &'a [f64],
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = load_config(args.config.as_deref())?;
    debug!(?config, "loaded config");
    let text = execute(&args.command, &config, args.seed)?;
    write_output(&text, args.output.as_deref())
}

/// Run one subcommand and return what should be written out.
pub fn execute(command: &Command, config: &Config, seed: Option<u64>) -> Result<String> {
    match command {
        Command::Distance {
            lon1,
            lat1,
            lon2,
            lat2,
        } => {
            let km = distance(*lon1, *lat1, *lon2, *lat2)?;
            Ok(format!("{km:.3}\n"))
        }
        Command::TourLength { input } => {
            let points: Vec<GeoPoint> = json5::from_str(&read_input(input.as_deref())?)?;
            let km = tour_length(&points)?;
            Ok(format!("{km:.3}\n"))
        }
        Command::Curvature { input } => curvature_json(&read_input(input.as_deref())?, config),
        Command::Declutter { input, threshold } => {
            let positions: LabelSet<String> = json5::from_str(&read_input(input.as_deref())?)?;
            let mut declutter = config.declutter;
            if let Some(threshold) = threshold {
                declutter.threshold = *threshold;
            }
            let outcome = declutter.run(&positions, &mut make_rng(seed))?;
            Ok(serde_json::to_string_pretty(&outcome.positions)? + "\n")
        }
        Command::Plan { input, kind } => {
            let graph = parse_graph(&read_input(input.as_deref())?)?;
            let mut rng = make_rng(seed);
            let scene = match kind {
                PlanKind::Tour => plan_tour(&graph, config, &mut rng)?,
                PlanKind::Pattern => plan_pattern_solution(&graph, config, &mut rng)?,
            };
            Ok(scene_dump_string(&scene)? + "\n")
        }
        Command::Dot {
            input,
            directed,
            layout,
            sort,
        } => {
            let graph = parse_graph(&read_input(input.as_deref())?)?;
            let mut dot_config = config.dot.clone();
            dot_config.directed |= *directed;
            dot_config.sort |= *sort;
            if layout.is_some() {
                dot_config.layout = layout.clone();
            }
            Ok(graph_to_dot(&graph, &dot_config))
        }
    }
}

fn curvature_json(input: &str, config: &Config) -> Result<String> {
    let edges: Vec<EdgeKey<String>> = json5::from_str(input)?;
    let assignment = assign_curvatures_scaled(edges, config.curvature.rad_scale);
    let entries: Vec<CurvatureEntry<'_>> = assignment
        .entries()
        .map(|(key, offsets)| CurvatureEntry {
            from: &key.from,
            to: &key.to,
            offsets,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)? + "\n")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
