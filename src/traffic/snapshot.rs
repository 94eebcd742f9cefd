use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotNode {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotEdge {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

/// One full point-in-time state of the road network as served by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
    pub best_route: Vec<String>,
    pub min_weight: f64,
    pub max_weight: f64,
    /// Seconds until the backend refreshes its source imagery. Display only.
    pub next_update_secs: Option<f64>,
    pub server_timestamp: Option<f64>,
}

impl GraphSnapshot {
    pub fn has_route(&self) -> bool {
        !self.best_route.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    label: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    from: String,
    to: String,
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    nodes: Vec<RawNode>,
    edges: Vec<RawEdge>,
    #[serde(default)]
    best_route: Option<Value>,
    #[serde(default)]
    min_weight: Option<Value>,
    #[serde(default)]
    max_weight: Option<Value>,
    #[serde(default)]
    next_update: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
}

pub(super) fn parse_snapshot(raw: &[u8]) -> Result<GraphSnapshot, serde_json::Error> {
    let raw: RawSnapshot = serde_json::from_slice(raw)?;

    let best_route = route_from_value(raw.best_route);

    let weights = raw.edges.iter().map(|edge| edge.weight);
    let min_weight = number_field("min_weight", raw.min_weight)
        .unwrap_or_else(|| weights.clone().reduce(f64::min).unwrap_or(0.0));
    let max_weight = number_field("max_weight", raw.max_weight)
        .unwrap_or_else(|| weights.reduce(f64::max).unwrap_or(1.0));

    let nodes = raw
        .nodes
        .into_iter()
        .map(|node| SnapshotNode {
            label: label_from_value(&node.id, node.label).unwrap_or_else(|| node.id.clone()),
            id: node.id,
        })
        .collect();

    let edges = raw
        .edges
        .into_iter()
        .map(|edge| SnapshotEdge {
            from: edge.from,
            to: edge.to,
            weight: edge.weight,
        })
        .collect();

    Ok(GraphSnapshot {
        nodes,
        edges,
        best_route,
        min_weight,
        max_weight,
        next_update_secs: number_field("next_update", raw.next_update),
        server_timestamp: number_field("timestamp", raw.timestamp),
    })
}

fn number_field(name: &str, value: Option<Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => number.as_f64(),
        Some(other) => {
            log::warn!("ignoring non-numeric {name}: {other}");
            None
        }
    }
}

fn label_from_value(id: &str, value: Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(label)) => Some(label),
        Some(other) => {
            log::warn!("node {id} has a non-string label ({other}), using its id");
            None
        }
    }
}

fn route_from_value(value: Option<Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(id) => Some(id),
                other => {
                    log::warn!("ignoring non-string best_route entry: {other}");
                    None
                }
            })
            .collect(),
        Some(other) => {
            log::warn!("best_route is not a list ({other}); route highlighting disabled");
            Vec::new()
        }
    }
}
