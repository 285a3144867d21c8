use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::geo::GeoPoint;

/// One row of a node table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeRecord {
    pub id: String,
    pub label: Option<String>,
    pub size: Option<f64>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    /// Extra attribute columns, copied through to DOT output.
    pub attrs: BTreeMap<String, String>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, lon: f64, lat: f64) -> Self {
        self.lon = Some(lon);
        self.lat = Some(lat);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.lon?, self.lat?))
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Match column of a pattern-match result. Numeric ids order numerically and
/// come before textual ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchId {
    Num(i64),
    Text(String),
}

impl From<i64> for MatchId {
    fn from(value: i64) -> Self {
        MatchId::Num(value)
    }
}

impl From<&str> for MatchId {
    fn from(value: &str) -> Self {
        MatchId::Text(value.to_string())
    }
}

impl From<String> for MatchId {
    fn from(value: String) -> Self {
        MatchId::Text(value)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchId::Num(n) => write!(f, "{n}"),
            MatchId::Text(text) => f.write_str(text),
        }
    }
}

/// One row of a link table. Repeated (from, to) pairs are parallel edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkRecord {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub color: Option<String>,
    /// Pattern-match grouping: the query key and match number a link belongs to.
    pub query_key: Option<String>,
    #[serde(rename = "match")]
    pub match_id: Option<MatchId>,
    pub attrs: BTreeMap<String, String>,
}

impl LinkRecord {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    pub fn in_match(mut self, query_key: impl Into<String>, match_id: impl Into<MatchId>) -> Self {
        self.query_key = Some(query_key.into());
        self.match_id = Some(match_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphInput {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
}

impl GraphInput {
    /// Node positions keyed by id. The first record wins for duplicated ids.
    pub fn positions(&self) -> BTreeMap<String, GeoPoint> {
        let mut positions = BTreeMap::new();
        for node in &self.nodes {
            if let Some(position) = node.position() {
                positions.entry(node.id.clone()).or_insert(position);
            }
        }
        positions
    }

    /// Display labels keyed by node id, first record wins.
    pub fn labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        for node in &self.nodes {
            labels
                .entry(node.id.clone())
                .or_insert_with(|| node.display_label().to_string());
        }
        labels
    }
}

/// Parse a node/link document. Accepts JSON and JSON5.
pub fn parse_graph(input: &str) -> anyhow::Result<GraphInput> {
    Ok(json5::from_str(input)?)
}
