use crate::layout::Point2D;
use crate::scene::{RouteScene, SceneKind};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDump<'a> {
    pub kind: SceneKind,
    pub node_count: usize,
    pub edge_count: usize,
    pub total_distance_km: f64,
    pub declutter_rounds: usize,
    pub bounds: Option<[f64; 4]>,
    pub scene: &'a RouteScene,
}

/// `[min_x, min_y, max_x, max_y]` over nodes, labels and sampled arcs.
fn scene_bounds(scene: &RouteScene) -> Option<[f64; 4]> {
    let points = scene
        .nodes
        .iter()
        .map(|node| node.position)
        .chain(scene.labels.values().copied())
        .chain(scene.edges.iter().flat_map(|edge| edge.points.iter().copied()));
    let mut bounds: Option<[f64; 4]> = None;
    for Point2D { x, y } in points {
        bounds = Some(match bounds {
            None => [x, y, x, y],
            Some([min_x, min_y, max_x, max_y]) => {
                [min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)]
            }
        });
    }
    bounds
}

impl<'a> SceneDump<'a> {
    pub fn from_scene(scene: &'a RouteScene) -> Self {
        Self {
            kind: scene.kind,
            node_count: scene.nodes.len(),
            edge_count: scene.edges.len(),
            total_distance_km: scene.total_distance_km(),
            declutter_rounds: scene.declutter_rounds,
            bounds: scene_bounds(scene),
            scene,
        }
    }
}

pub fn write_scene_dump(path: &Path, scene: &RouteScene) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &SceneDump::from_scene(scene))?;
    Ok(())
}

pub fn scene_dump_string(scene: &RouteScene) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&SceneDump::from_scene(scene))?)
}

/// Write `text` to `output`, or to stdout when no path is given.
pub fn write_output(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
        }
        None => {
            print!("{}", text);
        }
    }
    Ok(())
}
