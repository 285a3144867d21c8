use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::layout::curvature::RAD_SCALE;
use crate::layout::declutter::{Declutter, OnExhausted};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvatureConfig {
    pub rad_scale: f64,
}

impl Default for CurvatureConfig {
    fn default() -> Self {
        Self {
            rad_scale: RAD_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Vertical offset of tour labels above their node.
    pub tour_label_lift: f64,
    /// Curvature shared by every tour leg.
    pub tour_rad: f64,
    /// Pattern labels sit `lift + U[0, spread)` above their node.
    pub pattern_label_lift: f64,
    pub pattern_label_spread: f64,
    pub declutter_tour_labels: bool,
    pub declutter_pattern_labels: bool,
    /// Points per sampled arc, minus one.
    pub arc_segments: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tour_label_lift: 0.5,
            tour_rad: 0.1,
            pattern_label_lift: 1.0,
            pattern_label_spread: 1.0,
            declutter_tour_labels: true,
            declutter_pattern_labels: false,
            arc_segments: 16,
        }
    }
}

/// How node widths are chosen in DOT output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeSize {
    #[default]
    Unset,
    /// Use each node's `size` column.
    FromColumn,
    Constant(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotConfig {
    pub directed: bool,
    pub rankdir: String,
    pub size: f64,
    pub layout: Option<String>,
    pub node_shape: String,
    pub sort: bool,
    pub node_size: NodeSize,
    pub nodes_size_scale: f64,
    /// Color nodes by their `category` column through the jet colormap.
    pub color_by_category: bool,
    pub node_attrs: BTreeMap<String, String>,
    pub edge_attrs: BTreeMap<String, String>,
    pub graph_attrs: BTreeMap<String, String>,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            directed: false,
            rankdir: "LR".to_string(),
            size: 10.0,
            layout: None,
            node_shape: "circle".to_string(),
            sort: false,
            node_size: NodeSize::Unset,
            nodes_size_scale: 1.0,
            color_by_category: false,
            node_attrs: BTreeMap::new(),
            edge_attrs: BTreeMap::new(),
            graph_attrs: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub declutter: Declutter,
    pub curvature: CurvatureConfig,
    pub scene: SceneConfig,
    pub dot: DotConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclutterConfigFile {
    threshold: Option<f64>,
    jitter: Option<f64>,
    max_rounds: Option<usize>,
    /// Drop the round guard entirely.
    unbounded: Option<bool>,
    on_exhausted: Option<OnExhausted>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurvatureConfigFile {
    rad_scale: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneConfigFile {
    tour_label_lift: Option<f64>,
    tour_rad: Option<f64>,
    pattern_label_lift: Option<f64>,
    pattern_label_spread: Option<f64>,
    declutter_tour_labels: Option<bool>,
    declutter_pattern_labels: Option<bool>,
    arc_segments: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DotConfigFile {
    directed: Option<bool>,
    rankdir: Option<String>,
    size: Option<f64>,
    layout: Option<String>,
    node_shape: Option<String>,
    sort: Option<bool>,
    node_size: Option<NodeSize>,
    nodes_size_scale: Option<f64>,
    color_by_category: Option<bool>,
    node_attrs: Option<BTreeMap<String, String>>,
    edge_attrs: Option<BTreeMap<String, String>>,
    graph_attrs: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    declutter: Option<DeclutterConfigFile>,
    curvature: Option<CurvatureConfigFile>,
    scene: Option<SceneConfigFile>,
    dot: Option<DotConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Overlay a camelCase JSON5 config document on the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(file) = parsed.declutter {
        let target = &mut config.declutter;
        if let Some(v) = file.threshold {
            target.threshold = v;
        }
        if let Some(v) = file.jitter {
            target.jitter = v;
        }
        if let Some(v) = file.max_rounds {
            target.max_rounds = Some(v);
        }
        if file.unbounded == Some(true) {
            target.max_rounds = None;
        }
        if let Some(v) = file.on_exhausted {
            target.on_exhausted = v;
        }
    }

    if let Some(file) = parsed.curvature {
        if let Some(v) = file.rad_scale {
            config.curvature.rad_scale = v;
        }
    }

    if let Some(file) = parsed.scene {
        let target = &mut config.scene;
        if let Some(v) = file.tour_label_lift {
            target.tour_label_lift = v;
        }
        if let Some(v) = file.tour_rad {
            target.tour_rad = v;
        }
        if let Some(v) = file.pattern_label_lift {
            target.pattern_label_lift = v;
        }
        if let Some(v) = file.pattern_label_spread {
            target.pattern_label_spread = v;
        }
        if let Some(v) = file.declutter_tour_labels {
            target.declutter_tour_labels = v;
        }
        if let Some(v) = file.declutter_pattern_labels {
            target.declutter_pattern_labels = v;
        }
        if let Some(v) = file.arc_segments {
            target.arc_segments = v;
        }
    }

    if let Some(file) = parsed.dot {
        let target = &mut config.dot;
        if let Some(v) = file.directed {
            target.directed = v;
        }
        if let Some(v) = file.rankdir {
            target.rankdir = v;
        }
        if let Some(v) = file.size {
            target.size = v;
        }
        if file.layout.is_some() {
            target.layout = file.layout;
        }
        if let Some(v) = file.node_shape {
            target.node_shape = v;
        }
        if let Some(v) = file.sort {
            target.sort = v;
        }
        if let Some(v) = file.node_size {
            target.node_size = v;
        }
        if let Some(v) = file.nodes_size_scale {
            target.nodes_size_scale = v;
        }
        if let Some(v) = file.color_by_category {
            target.color_by_category = v;
        }
        if let Some(v) = file.node_attrs {
            target.node_attrs = v;
        }
        if let Some(v) = file.edge_attrs {
            target.edge_attrs = v;
        }
        if let Some(v) = file.graph_attrs {
            target.graph_attrs = v;
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> anyhow::Result<()> {
    if !config.declutter.threshold.is_finite() {
        anyhow::bail!("declutter.threshold must be finite");
    }
    if !(config.declutter.jitter.is_finite() && config.declutter.jitter > 0.0) {
        anyhow::bail!("declutter.jitter must be a positive number");
    }
    if !config.curvature.rad_scale.is_finite() {
        anyhow::bail!("curvature.radScale must be finite");
    }
    if config.scene.arc_segments == 0 {
        anyhow::bail!("scene.arcSegments must be at least 1");
    }
    if !(config.scene.pattern_label_spread.is_finite() && config.scene.pattern_label_spread >= 0.0)
    {
        anyhow::bail!("scene.patternLabelSpread must be a non-negative number");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::declutter::DEFAULT_JITTER;

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.declutter.threshold, 0.7);
        assert_eq!(config.curvature.rad_scale, 0.1);
    }

    #[test]
    fn overlays_only_present_fields() {
        let config = parse_config(
            r#"{
                // looser labels for dense hubs
                declutter: { threshold: 1.2, unbounded: true },
                scene: { arcSegments: 4 },
                dot: { directed: true, layout: "fdp", nodeSize: { constant: 0.5 } },
            }"#,
        )
        .unwrap();
        assert_eq!(config.declutter.threshold, 1.2);
        assert_eq!(config.declutter.jitter, DEFAULT_JITTER);
        assert_eq!(config.declutter.max_rounds, None);
        assert_eq!(config.scene.arc_segments, 4);
        assert_eq!(config.scene.tour_rad, 0.1);
        assert!(config.dot.directed);
        assert_eq!(config.dot.layout.as_deref(), Some("fdp"));
        assert_eq!(config.dot.node_size, NodeSize::Constant(0.5));
        assert_eq!(config.dot.rankdir, "LR");
    }

    #[test]
    fn on_exhausted_is_configurable() {
        let config = parse_config(r#"{ "declutter": { "onExhausted": "bestEffort", "maxRounds": 50 } }"#)
            .unwrap();
        let declutter = config.declutter;
        assert_eq!(declutter.on_exhausted, OnExhausted::BestEffort);
        assert_eq!(declutter.max_rounds, Some(50));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse_config(r#"{ declutter: { jitter: 0 } }"#).is_err());
        assert!(parse_config(r#"{ scene: { arcSegments: 0 } }"#).is_err());
        assert!(parse_config("{ declutter: ").is_err());
    }
}
