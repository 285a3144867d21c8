// Scene planning: turns a node/link table with lon/lat positions into
// everything a map plot needs (node markers, decluttered labels, curved
// edges with colors, line styles and distances). Drawing itself is left to
// whatever backend consumes the scene.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::colormap::{Normalize, jet};
use crate::config::Config;
use crate::error::{GeometryError, Result};
use crate::geo::{GeoPoint, great_circle_distance};
use crate::ir::{GraphInput, LinkRecord, MatchId};
use crate::layout::{EdgeKey, LabelSet, Point2D, arc_points};
use crate::layout::curvature::assign_curvatures_scaled;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneKind {
    Tour,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

/// Styles cycled through by match number.
pub const MATCH_LINE_STYLES: [LineStyle; 4] = [
    LineStyle::Solid,
    LineStyle::Dashed,
    LineStyle::Dotted,
    LineStyle::DashDot,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: String,
    pub label: String,
    pub position: Point2D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEdge {
    pub from: String,
    pub to: String,
    pub rad: f64,
    pub color: String,
    pub style: LineStyle,
    pub distance_km: f64,
    pub match_number: Option<usize>,
    pub points: Vec<Point2D>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteScene {
    pub kind: SceneKind,
    pub nodes: Vec<SceneNode>,
    pub labels: LabelSet<String>,
    pub edges: Vec<SceneEdge>,
    pub theme: Theme,
    pub declutter_rounds: usize,
}

impl RouteScene {
    pub fn total_distance_km(&self) -> f64 {
        self.edges.iter().map(|edge| edge.distance_km).sum()
    }
}

fn to_plot(point: GeoPoint) -> Point2D {
    Point2D::new(point.lon, point.lat)
}

fn endpoint_positions(
    link: &LinkRecord,
    positions: &BTreeMap<String, GeoPoint>,
) -> Result<(GeoPoint, GeoPoint)> {
    let lookup = |id: &str| {
        positions
            .get(id)
            .copied()
            .ok_or_else(|| GeometryError::MissingNode {
                from: link.from.clone(),
                to: link.to.clone(),
                missing: id.to_string(),
            })
    };
    Ok((lookup(&link.from)?, lookup(&link.to)?))
}

/// Nodes touched by `links`, in id order.
fn linked_nodes(
    graph: &GraphInput,
    links: &[&LinkRecord],
    positions: &BTreeMap<String, GeoPoint>,
) -> Result<Vec<SceneNode>> {
    let labels = graph.labels();
    let mut ids = BTreeSet::new();
    for link in links {
        endpoint_positions(link, positions)?;
        ids.insert(link.from.as_str());
        ids.insert(link.to.as_str());
    }
    Ok(ids
        .into_iter()
        .map(|id| SceneNode {
            id: id.to_string(),
            label: labels.get(id).cloned().unwrap_or_else(|| id.to_string()),
            position: to_plot(positions[id]),
        })
        .collect())
}

fn edge_geometry(
    link: &LinkRecord,
    positions: &BTreeMap<String, GeoPoint>,
    rad: f64,
    segments: usize,
) -> Result<(f64, Vec<Point2D>)> {
    let (from, to) = endpoint_positions(link, positions)?;
    let distance_km = great_circle_distance(from, to)?;
    Ok((distance_km, arc_points(to_plot(from), to_plot(to), rad, segments)))
}

fn place_labels<R: Rng + ?Sized>(
    nodes: &[SceneNode],
    enabled: bool,
    config: &Config,
    lift: impl Fn(&mut R) -> f64,
    rng: &mut R,
) -> Result<(LabelSet<String>, usize)> {
    let mut labels = LabelSet::new();
    for node in nodes {
        let dy = lift(&mut *rng);
        labels.insert(
            node.id.clone(),
            Point2D::new(node.position.x, node.position.y + dy),
        );
    }
    if !enabled {
        return Ok((labels, 0));
    }
    let outcome = config.declutter.run(&labels, rng)?;
    Ok((outcome.positions, outcome.rounds))
}

/// Plan a single tour: constant curvature, fixed label lift, decluttered labels.
///
/// Repeated legs collapse into one edge.
pub fn plan_tour<R: Rng + ?Sized>(
    graph: &GraphInput,
    config: &Config,
    rng: &mut R,
) -> Result<RouteScene> {
    let positions = graph.positions();
    let mut seen = BTreeSet::new();
    let links: Vec<&LinkRecord> = graph
        .links
        .iter()
        .filter(|link| seen.insert((link.from.as_str(), link.to.as_str())))
        .collect();
    let nodes = linked_nodes(graph, &links, &positions)?;
    let theme = Theme::tour();

    let lift = config.scene.tour_label_lift;
    let (labels, declutter_rounds) = place_labels(
        &nodes,
        config.scene.declutter_tour_labels,
        config,
        |_| lift,
        rng,
    )?;

    let mut edges = Vec::with_capacity(links.len());
    for link in &links {
        let rad = config.scene.tour_rad;
        let (distance_km, points) =
            edge_geometry(link, &positions, rad, config.scene.arc_segments)?;
        edges.push(SceneEdge {
            from: link.from.clone(),
            to: link.to.clone(),
            rad,
            color: link.color.clone().unwrap_or_else(|| theme.edge_color.clone()),
            style: LineStyle::Solid,
            distance_km,
            match_number: None,
            points,
        });
    }

    info!(
        nodes = nodes.len(),
        edges = edges.len(),
        declutter_rounds,
        "planned tour scene"
    );
    Ok(RouteScene {
        kind: SceneKind::Tour,
        nodes,
        labels,
        edges,
        theme,
        declutter_rounds,
    })
}

type MatchGroup<'a> = (Option<&'a str>, Option<&'a MatchId>);

/// Dense match numbers for every (query key, match) group, in sorted group
/// order. Numeric match ids sort numerically.
pub fn match_numbers(links: &[LinkRecord]) -> BTreeMap<MatchGroup<'_>, usize> {
    let groups: BTreeSet<MatchGroup<'_>> = links
        .iter()
        .map(|link| (link.query_key.as_deref(), link.match_id.as_ref()))
        .collect();
    groups
        .into_iter()
        .enumerate()
        .map(|(idx, group)| (group, idx))
        .collect()
}

/// Plan a pattern-match result: one color and line style per match, parallel
/// edges fanned out with distinct curvatures.
pub fn plan_pattern_solution<R: Rng + ?Sized>(
    graph: &GraphInput,
    config: &Config,
    rng: &mut R,
) -> Result<RouteScene> {
    let positions = graph.positions();
    let links: Vec<&LinkRecord> = graph.links.iter().collect();
    let nodes = linked_nodes(graph, &links, &positions)?;
    let theme = Theme::pattern();

    let base = config.scene.pattern_label_lift;
    let spread = config.scene.pattern_label_spread;
    let (labels, declutter_rounds) = place_labels(
        &nodes,
        config.scene.declutter_pattern_labels,
        config,
        |rng: &mut R| {
            if spread > 0.0 {
                base + rng.gen_range(0.0..spread)
            } else {
                base
            }
        },
        rng,
    )?;

    let numbers = match_numbers(&graph.links);
    let norm = Normalize::new(0.0, numbers.len() as f64);
    let mut curvatures = assign_curvatures_scaled(
        links
            .iter()
            .map(|link| EdgeKey::new(link.from.clone(), link.to.clone())),
        config.curvature.rad_scale,
    );

    let mut edges = Vec::with_capacity(links.len());
    for link in &links {
        let key = EdgeKey::new(link.from.clone(), link.to.clone());
        let rad = curvatures.next_offset(&key)?;
        let number = numbers[&(link.query_key.as_deref(), link.match_id.as_ref())];
        let (distance_km, points) =
            edge_geometry(link, &positions, rad, config.scene.arc_segments)?;
        edges.push(SceneEdge {
            from: link.from.clone(),
            to: link.to.clone(),
            rad,
            color: jet(norm.apply(number as f64)).to_hex(),
            style: MATCH_LINE_STYLES[number % MATCH_LINE_STYLES.len()],
            distance_km,
            match_number: Some(number),
            points,
        });
    }

    info!(
        nodes = nodes.len(),
        edges = edges.len(),
        matches = numbers.len(),
        "planned pattern scene"
    );
    Ok(RouteScene {
        kind: SceneKind::Pattern,
        nodes,
        labels,
        edges,
        theme,
        declutter_rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeRecord;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn airports() -> Vec<NodeRecord> {
        vec![
            NodeRecord::new("ORD").at(-87.90, 41.98),
            NodeRecord::new("MDW").at(-87.75, 41.79),
            NodeRecord::new("LAX").at(-118.41, 33.94),
            NodeRecord::new("JFK").at(-73.78, 40.64),
        ]
    }

    #[test]
    fn tour_labels_are_lifted_and_decluttered() {
        let graph = GraphInput {
            nodes: airports(),
            links: vec![
                LinkRecord::new("ORD", "MDW"),
                LinkRecord::new("MDW", "LAX"),
                LinkRecord::new("LAX", "ORD"),
                LinkRecord::new("LAX", "ORD"),
            ],
        };
        let scene = plan_tour(&graph, &Config::default(), &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(scene.kind, SceneKind::Tour);
        assert_eq!(scene.edges.len(), 3);
        assert!(scene.edges.iter().all(|edge| edge.rad == 0.1));
        let ids: Vec<&str> = scene.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["LAX", "MDW", "ORD"]);
        // ORD and MDW start 0.24 apart, closer than the 0.7 threshold.
        assert!(scene.declutter_rounds > 0);
        assert!(scene.labels["ORD"].distance(scene.labels["MDW"]) >= 0.7);
        assert_eq!(scene.labels["LAX"], Point2D::new(-118.41, 33.94 + 0.5));
    }

    #[test]
    fn pattern_edges_fan_out_and_share_match_styles() {
        let graph = GraphInput {
            nodes: airports(),
            links: vec![
                LinkRecord::new("ORD", "JFK").in_match("q", 0_i64),
                LinkRecord::new("JFK", "LAX").in_match("q", 0_i64),
                LinkRecord::new("ORD", "JFK").in_match("q", 1_i64),
                LinkRecord::new("JFK", "LAX").in_match("q", 1_i64),
                LinkRecord::new("ORD", "JFK").in_match("q", 2_i64),
            ],
        };
        let scene =
            plan_pattern_solution(&graph, &Config::default(), &mut StdRng::seed_from_u64(9))
                .unwrap();
        assert_eq!(scene.edges.len(), 5);

        let ord_jfk: Vec<f64> = scene
            .edges
            .iter()
            .filter(|e| e.from == "ORD")
            .map(|e| e.rad)
            .collect();
        // Three parallel edges take offsets from the end of [-0.1, 0, 0.1].
        assert!((ord_jfk[0] - 0.1).abs() < 1e-12);
        assert_eq!(ord_jfk[1], 0.0);
        assert!((ord_jfk[2] + 0.1).abs() < 1e-12);

        assert_eq!(scene.edges[0].style, LineStyle::Solid);
        assert_eq!(scene.edges[2].style, LineStyle::Dashed);
        assert_eq!(scene.edges[4].style, LineStyle::Dotted);
        assert_eq!(scene.edges[0].color, scene.edges[1].color);
        assert_ne!(scene.edges[0].color, scene.edges[2].color);

        for (id, label) in &scene.labels {
            let node = scene.nodes.iter().find(|n| &n.id == id).unwrap();
            let lift = label.y - node.position.y;
            assert!((1.0..2.0).contains(&lift), "{id} lifted by {lift}");
        }
    }

    #[test]
    fn edges_carry_great_circle_distance() {
        let graph = GraphInput {
            nodes: airports(),
            links: vec![LinkRecord::new("ORD", "LAX")],
        };
        let scene = plan_tour(&graph, &Config::default(), &mut StdRng::seed_from_u64(1)).unwrap();
        let expected = crate::geo::distance(-87.90, 41.98, -118.41, 33.94).unwrap();
        assert!((scene.total_distance_km() - expected).abs() < 1e-9);
        assert_eq!(scene.edges[0].points.len(), 17);
    }

    #[test]
    fn missing_endpoint_is_reported() {
        let graph = GraphInput {
            nodes: airports(),
            links: vec![LinkRecord::new("ORD", "SEA")],
        };
        let err = plan_pattern_solution(&graph, &Config::default(), &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::MissingNode {
                from: "ORD".to_string(),
                to: "SEA".to_string(),
                missing: "SEA".to_string()
            }
        );
    }

    #[test]
    fn match_numbers_follow_sorted_groups() {
        let links = vec![
            LinkRecord::new("a", "b").in_match("q2", 0_i64),
            LinkRecord::new("a", "b").in_match("q1", 1_i64),
            LinkRecord::new("a", "b").in_match("q1", 0_i64),
        ];
        let numbers = match_numbers(&links);
        assert_eq!(numbers[&(Some("q1"), Some(&MatchId::Num(0)))], 0);
        assert_eq!(numbers[&(Some("q1"), Some(&MatchId::Num(1)))], 1);
        assert_eq!(numbers[&(Some("q2"), Some(&MatchId::Num(0)))], 2);
    }

    #[test]
    fn match_numbers_order_numeric_ids_by_value() {
        let mut links: Vec<LinkRecord> = (0..12_i64)
            .rev()
            .map(|m| LinkRecord::new("ORD", "JFK").in_match("q", m))
            .collect();
        links.push(LinkRecord::new("ORD", "JFK").in_match("q", "late"));
        let numbers = match_numbers(&links);
        let number = |m: i64| numbers[&(Some("q"), Some(&MatchId::Num(m)))];
        assert_eq!(number(2), 2);
        assert_eq!(number(10), 10);
        assert_eq!(number(11), 11);
        assert_eq!(numbers[&(Some("q"), Some(&MatchId::from("late")))], 12);

        let graph = GraphInput {
            nodes: airports(),
            links,
        };
        let scene =
            plan_pattern_solution(&graph, &Config::default(), &mut StdRng::seed_from_u64(4))
                .unwrap();
        let edge_for = |m: usize| {
            scene
                .edges
                .iter()
                .find(|edge| edge.match_number == Some(m))
                .unwrap()
        };
        // Sorted as text, match 10 would have taken number 2.
        assert_eq!(edge_for(2).style, LineStyle::Dotted);
        assert_eq!(edge_for(10).style, LineStyle::Dotted);
        assert_eq!(edge_for(11).style, LineStyle::DashDot);
        assert_eq!(scene.edges[0].match_number, Some(11));
    }
}
