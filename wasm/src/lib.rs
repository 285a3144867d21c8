use rand::SeedableRng;
use rand::rngs::StdRng;
use routeplot::layout::{Declutter, EdgeKey, LabelSet};
use routeplot::{assign_curvatures, distance};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclutterOptions {
    threshold: Option<f64>,
    max_rounds: Option<usize>,
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CurvatureEntry {
    from: String,
    to: String,
    offsets: Vec<f64>,
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen]
pub fn great_circle_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Result<f64, JsValue> {
    distance(lon1, lat1, lon2, lat2).map_err(js_error)
}

fn curvatures(edges_json: &str) -> Result<String, String> {
    let edges: Vec<EdgeKey<String>> =
        serde_json::from_str(edges_json).map_err(|error| error.to_string())?;
    let assignment = assign_curvatures(edges);
    let entries: Vec<CurvatureEntry> = assignment
        .entries()
        .map(|(key, offsets)| CurvatureEntry {
            from: key.from.clone(),
            to: key.to.clone(),
            offsets: offsets.to_vec(),
        })
        .collect();
    serde_json::to_string(&entries).map_err(|error| error.to_string())
}

fn declutter(labels_json: &str, options: DeclutterOptions) -> Result<String, String> {
    let labels: LabelSet<String> =
        serde_json::from_str(labels_json).map_err(|error| error.to_string())?;
    let mut declutter = Declutter::default();
    if let Some(threshold) = options.threshold {
        declutter.threshold = threshold;
    }
    if options.max_rounds.is_some() {
        declutter.max_rounds = options.max_rounds;
    }
    // JS has no entropy source we can rely on here; callers pass a seed.
    let mut rng = StdRng::seed_from_u64(options.seed.unwrap_or(0));
    let outcome = declutter
        .run(&labels, &mut rng)
        .map_err(|error| error.to_string())?;
    serde_json::to_string(&outcome.positions).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn curvature_offsets(edges_json: &str) -> Result<String, JsValue> {
    curvatures(edges_json).map_err(js_error)
}

#[wasm_bindgen]
pub fn declutter_labels(labels_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<DeclutterOptions>(&raw_options).map_err(js_error)?
    } else {
        DeclutterOptions::default()
    };
    declutter(labels_json, options).map_err(js_error)
}
