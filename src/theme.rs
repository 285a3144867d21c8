use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeMarker {
    Circle,
    Diamond,
}

/// Drawing hints handed to the plotting backend along with a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub node_color: String,
    pub node_marker: NodeMarker,
    pub node_size: f64,
    pub node_alpha: f64,
    pub label_font_size: f64,
    pub edge_color: String,
    pub edge_width: f64,
    pub arrows: bool,
    pub arrow_size: f64,
    pub basemap_color: String,
}

impl Theme {
    /// Red diamonds with arrowed edges, for a single tour.
    pub fn tour() -> Self {
        Self {
            node_color: "red".to_string(),
            node_marker: NodeMarker::Diamond,
            node_size: 20.0,
            node_alpha: 0.8,
            label_font_size: 5.0,
            edge_color: "black".to_string(),
            edge_width: 0.7,
            arrows: true,
            arrow_size: 5.0,
            basemap_color: "lightgrey".to_string(),
        }
    }

    /// Small blue nodes; edge colors come from the match numbers.
    pub fn pattern() -> Self {
        Self {
            node_color: "blue".to_string(),
            node_marker: NodeMarker::Circle,
            node_size: 10.0,
            node_alpha: 1.0,
            label_font_size: 8.0,
            edge_color: "black".to_string(),
            edge_width: 0.8,
            arrows: false,
            arrow_size: 0.0,
            basemap_color: "lightgrey".to_string(),
        }
    }
}
