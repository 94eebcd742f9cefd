use std::collections::HashMap;

use crate::layout::NodeLayout;
use crate::traffic::GraphSnapshot;
use crate::util::vehicles_label;

use super::super::highlight::RouteEdges;
use super::super::render_utils::{EDGE_WIDTH, ROUTE_COLOR, ROUTE_EDGE_WIDTH, congestion_color};
use super::{DiagramData, DiagramEdge, DiagramNode};

pub(in crate::app) fn build_diagram_data(
    snapshot: &GraphSnapshot,
    layout: &NodeLayout,
) -> DiagramData {
    let route = RouteEdges::from_route(&snapshot.best_route);

    let mut nodes = Vec::with_capacity(snapshot.nodes.len());
    let mut index_by_id = HashMap::with_capacity(snapshot.nodes.len());
    for node in &snapshot.nodes {
        if index_by_id.contains_key(&node.id) {
            log::debug!("duplicate node id {} in snapshot, keeping the first", node.id);
            continue;
        }

        if !layout.contains(&node.id) {
            log::debug!("no fixed position for {}, placing it at the origin", node.id);
        }
        index_by_id.insert(node.id.clone(), nodes.len());
        nodes.push(DiagramNode {
            id: node.id.clone(),
            label: node.label.clone(),
            world_pos: layout.position(&node.id),
            on_route: route.visits(&node.id),
            orphan: false,
        });
    }

    let mut lanes: HashMap<(usize, usize), u16> = HashMap::new();
    let mut edges = Vec::with_capacity(snapshot.edges.len());
    for edge in &snapshot.edges {
        let from = resolve_node(&edge.from, layout, &route, &mut nodes, &mut index_by_id);
        let to = resolve_node(&edge.to, layout, &route, &mut nodes, &mut index_by_id);

        let lane_key = (from.min(to), from.max(to));
        let lane = lanes.entry(lane_key).or_insert(0);
        let edge_lane = *lane;
        *lane = lane.saturating_add(1);

        let on_route = route.contains(&edge.from, &edge.to);
        let (color, width) = if on_route {
            (ROUTE_COLOR, ROUTE_EDGE_WIDTH)
        } else {
            (
                congestion_color(edge.weight, snapshot.min_weight, snapshot.max_weight),
                EDGE_WIDTH,
            )
        };

        edges.push(DiagramEdge {
            from,
            to,
            weight: edge.weight,
            label: vehicles_label(edge.weight),
            color,
            width,
            on_route,
            lane: edge_lane,
        });
    }

    DiagramData {
        nodes,
        edges,
        index_by_id,
        min_weight: snapshot.min_weight,
        max_weight: snapshot.max_weight,
    }
}

/// Edges may name nodes the snapshot never listed; those become unlabeled orphans.
fn resolve_node(
    id: &str,
    layout: &NodeLayout,
    route: &RouteEdges,
    nodes: &mut Vec<DiagramNode>,
    index_by_id: &mut HashMap<String, usize>,
) -> usize {
    if let Some(&index) = index_by_id.get(id) {
        return index;
    }

    log::debug!("edge references unlisted node {id}, drawing it as an orphan");
    let index = nodes.len();
    nodes.push(DiagramNode {
        id: id.to_owned(),
        label: String::new(),
        world_pos: layout.position(id),
        on_route: route.visits(id),
        orphan: true,
    });
    index_by_id.insert(id.to_owned(), index);
    index
}
