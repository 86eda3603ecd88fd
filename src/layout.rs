use crate::config::LayoutConfig;
use crate::graph::Graph;
use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use std::collections::HashSet;

/// Positions every node of a compiled graph. Nodes enter the layered
/// layout with their nominal box size and the deduplicated directed
/// edges; dagre assigns ranks and cross-axis offsets. The primary-axis
/// coordinate is then overridden with `(node_width + gap) * depth`:
/// dagre would rank a back-referenced node by shortest path, which
/// makes it jump columns whenever a closer reference appears, while
/// first-visit depth keeps the hierarchy visually stable at the cost
/// of longer back-edges.
pub fn position_nodes(graph: &mut Graph, config: &LayoutConfig) {
    if graph.nodes.is_empty() {
        return;
    }

    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    // dagre_rust only understands lowercase rankdir tokens; anything
    // else silently falls back to top-bottom.
    graph_config.rankdir = Some("lr".to_string());
    graph_config.nodesep = Some(config.node_spacing);
    graph_config.ranksep = Some(config.rank_spacing);
    graph_config.marginx = Some(8.0);
    graph_config.marginy = Some(8.0);
    dagre_graph.set_graph(graph_config);

    let mut layout_set: HashSet<&str> = HashSet::new();
    for (order, node) in graph.nodes.iter().enumerate() {
        let mut dagre_node = DagreNode::default();
        dagre_node.width = config.node_width;
        dagre_node.height = config.node_height;
        dagre_node.order = Some(order);
        dagre_graph.set_node(node.id.clone(), Some(dagre_node));
        layout_set.insert(node.id.as_str());
    }

    // The synthetic root parent never becomes a node, and self-loops
    // carry no ranking information; both stay out of dagre.
    let mut edge_set: HashSet<(String, String)> = HashSet::new();
    for edge in &graph.edges {
        if edge.source == edge.target {
            continue;
        }
        if !layout_set.contains(edge.source.as_str()) || !layout_set.contains(edge.target.as_str())
        {
            continue;
        }
        let key = (edge.source.clone(), edge.target.clone());
        if !edge_set.insert(key) {
            continue;
        }
        let edge_label = DagreEdge::default();
        let _ = dagre_graph.set_edge(&edge.source, &edge.target, Some(edge_label), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let column_width = config.node_width + config.horizontal_gap;
    for node in &mut graph.nodes {
        let Some(dagre_node) = dagre_graph.node(&node.id) else {
            log::warn!("node {} missing from layout output; left at origin", node.id);
            continue;
        };
        // Dagre positions are center anchored; convert to top-left and
        // replace the rank coordinate with the depth column.
        node.position.x = column_width * node.depth as f32;
        node.position.y = dagre_node.y - config.node_height / 2.0;
    }
}
