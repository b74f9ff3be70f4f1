//! Graph data structures for input to the graph visualization component.

use serde::Deserialize;

/// A node in the graph.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links and
	/// as the reconciliation key across data updates.
	pub id: String,
	/// Entity type tag. Drives the `g-node--{entity}` CSS class and, when no
	/// explicit icon is given, the icon symbol reference.
	pub entity: String,
	/// Optional icon symbol id. Falls back to `entity` when absent.
	#[serde(default)]
	pub icon: Option<String>,
	/// Optional initial x position. Missing coordinates are assigned on the
	/// first layout pass.
	#[serde(default)]
	pub x: Option<f64>,
	/// Optional initial y position.
	#[serde(default)]
	pub y: Option<f64>,
}

/// An edge between two nodes.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Unique identifier for this link, the reconciliation key.
	pub id: String,
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Entity type tag of the source node, used for link styling.
	pub source_entity: String,
	/// Entity type tag of the target node, used for link styling.
	pub target_entity: String,
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// All nodes, keyed by `id`.
	pub nodes: Vec<GraphNode>,
	/// All links, keyed by `id`.
	#[serde(default)]
	pub links: Vec<GraphLink>,
}
