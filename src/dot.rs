// Graphviz DOT export for node/link tables.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::colormap::{Normalize, jet};
use crate::config::{DotConfig, NodeSize};
use crate::ir::{GraphInput, LinkRecord, NodeRecord};

static PLAIN_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*|-?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?))$")
        .unwrap()
});

const DOT_KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// Quote `value` unless it is already a valid bare DOT identifier.
pub fn quote_id(value: &str) -> String {
    let keyword = DOT_KEYWORDS
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(value));
    if !keyword && PLAIN_ID_RE.is_match(value) {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn attr_list(attrs: &[(String, String)]) -> String {
    if attrs.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!("{}={}", quote_id(k), quote_id(v)))
        .collect();
    format!(" [{}]", parts.join(" "))
}

fn map_attrs(attrs: &std::collections::BTreeMap<String, String>) -> Vec<(String, String)> {
    attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Category values in first-seen order, mapped to their index.
fn category_index(nodes: &[NodeRecord]) -> HashMap<&str, usize> {
    let mut index = HashMap::new();
    for node in nodes {
        if let Some(category) = node.category.as_deref() {
            let next = index.len();
            index.entry(category).or_insert(next);
        }
    }
    index
}

fn link_line(link: &LinkRecord, edge_op: &str) -> String {
    let mut attrs = Vec::new();
    if let Some(label) = &link.label {
        attrs.push(("label".to_string(), label.clone()));
    }
    if let Some(color) = &link.color {
        attrs.push(("color".to_string(), color.clone()));
    }
    attrs.extend(map_attrs(&link.attrs));
    format!(
        "\t{} {} {}{}\n",
        quote_id(&link.from),
        edge_op,
        quote_id(&link.to),
        attr_list(&attrs)
    )
}

fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Float text with a trailing `.0` on whole numbers, the way plotting tools
/// print HSV components.
fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Emit DOT source for `graph`: settings first, then links, then nodes.
pub fn graph_to_dot(graph: &GraphInput, config: &DotConfig) -> String {
    let (keyword, edge_op) = if config.directed {
        ("digraph", "->")
    } else {
        ("graph", "--")
    };
    let mut out = String::new();
    out.push_str(keyword);
    out.push_str(" {\n");
    out.push_str(&format!("\trankdir={}\n", quote_id(&config.rankdir)));
    out.push_str(&format!("\tsize={}\n", quote_id(&format_number(config.size))));
    out.push_str(&format!("\tnode [shape={}]\n", quote_id(&config.node_shape)));
    if !config.node_attrs.is_empty() {
        out.push_str(&format!("\tnode{}\n", attr_list(&map_attrs(&config.node_attrs))));
    }
    if !config.edge_attrs.is_empty() {
        out.push_str(&format!("\tedge{}\n", attr_list(&map_attrs(&config.edge_attrs))));
    }
    if !config.graph_attrs.is_empty() {
        out.push_str(&format!("\tgraph{}\n", attr_list(&map_attrs(&config.graph_attrs))));
    }
    if let Some(layout) = &config.layout {
        out.push_str(&format!("\tlayout={}\n", quote_id(layout)));
    }

    let mut links: Vec<&LinkRecord> = graph.links.iter().collect();
    if config.sort {
        links.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
    }
    for link in links {
        out.push_str(&link_line(link, edge_op));
    }

    let categories = if config.color_by_category {
        category_index(&graph.nodes)
    } else {
        HashMap::new()
    };
    let norm = Normalize::new(0.0, categories.len().saturating_sub(1) as f64);

    let mut nodes: Vec<&NodeRecord> = graph.nodes.iter().collect();
    if config.sort {
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
    }
    for node in nodes {
        let mut attrs = vec![("label".to_string(), node.display_label().to_string())];
        let width = match config.node_size {
            NodeSize::Unset => None,
            NodeSize::FromColumn => node.size.map(|size| config.nodes_size_scale * size),
            NodeSize::Constant(size) => Some(config.nodes_size_scale * size),
        };
        if let Some(width) = width {
            attrs.push(("width".to_string(), format_number(width)));
        }
        let category_color = node
            .category
            .as_deref()
            .and_then(|category| categories.get(category))
            .map(|idx| jet(norm.apply(*idx as f64)));
        if let Some(rgb) = category_color {
            let (h, s, v) = rgb.to_hsv();
            attrs.push((
                "color".to_string(),
                format!("{}, {}, {}", format_float(h), format_float(s), format_float(v)),
            ));
            if rgb.brightness() < 1.3 {
                attrs.push(("fontcolor".to_string(), "white".to_string()));
            }
        } else if let Some(color) = &node.color {
            attrs.push(("color".to_string(), color.clone()));
        }
        attrs.extend(map_attrs(&node.attrs));
        out.push_str(&format!("\t{}{}\n", quote_id(&node.id), attr_list(&attrs)));
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphInput {
        let mut hub = NodeRecord::new("ORD").with_label("Chicago O'Hare");
        hub.category = Some("hub".to_string());
        hub.size = Some(2.0);
        let mut spoke = NodeRecord::new("MKE");
        spoke.category = Some("spoke".to_string());
        spoke.attrs.insert("tz".to_string(), "CST".to_string());
        let mut link = LinkRecord::new("ORD", "MKE");
        link.label = Some("UA 12".to_string());
        GraphInput {
            nodes: vec![hub, spoke],
            links: vec![LinkRecord::new("MKE", "ORD"), link],
        }
    }

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(quote_id("ORD"), "ORD");
        assert_eq!(quote_id("_a1"), "_a1");
        assert_eq!(quote_id("-1.5"), "-1.5");
        assert_eq!(quote_id("UA 12"), "\"UA 12\"");
        assert_eq!(quote_id("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_id("node"), "\"node\"");
        assert_eq!(quote_id(""), "\"\"");
    }

    #[test]
    fn undirected_defaults() {
        let dot = graph_to_dot(&sample(), &DotConfig::default());
        assert!(dot.starts_with("graph {\n\trankdir=LR\n\tsize=10\n\tnode [shape=circle]\n"));
        assert!(dot.contains("\tMKE -- ORD\n"));
        assert!(dot.contains("\tORD -- MKE [label=\"UA 12\"]\n"));
        assert!(dot.contains("\tORD [label=\"Chicago O'Hare\"]\n"));
        assert!(dot.contains("\tMKE [label=MKE tz=CST]\n"));
        assert!(dot.ends_with("}\n"));
        // Links are written before nodes.
        assert!(dot.find("MKE -- ORD").unwrap() < dot.find("\tORD [").unwrap());
    }

    #[test]
    fn directed_sorted_with_layout() {
        let config = DotConfig {
            directed: true,
            sort: true,
            layout: Some("fdp".to_string()),
            node_size: NodeSize::FromColumn,
            nodes_size_scale: 100.0,
            ..DotConfig::default()
        };
        let dot = graph_to_dot(&sample(), &config);
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("\tlayout=fdp\n"));
        let first = dot.find("MKE -> ORD").unwrap();
        let second = dot.find("ORD -> MKE").unwrap();
        assert!(first < second);
        assert!(dot.find("\tMKE [").unwrap() < dot.find("\tORD [").unwrap());
        assert!(dot.contains("width=200"));
    }

    #[test]
    fn color_by_category_uses_jet_in_hsv() {
        let config = DotConfig {
            color_by_category: true,
            ..DotConfig::default()
        };
        let dot = graph_to_dot(&sample(), &config);
        // First category maps to the dark-blue end of jet: hue 2/3, dark enough for white text.
        assert!(dot.contains("color=\"0.6666666666666666, 1.0, 0.5\" fontcolor=white"));
        // Last category is dark red.
        assert!(dot.contains("color=\"0.0, 1.0, 0.5\""));
    }

    #[test]
    fn global_attribute_blocks() {
        let mut config = DotConfig::default();
        config
            .edge_attrs
            .insert("penwidth".to_string(), "0.5".to_string());
        config
            .graph_attrs
            .insert("overlap".to_string(), "false".to_string());
        let dot = graph_to_dot(&GraphInput::default(), &config);
        assert!(dot.contains("\tedge [penwidth=0.5]\n"));
        assert!(dot.contains("\tgraph [overlap=false]\n"));
    }
}
