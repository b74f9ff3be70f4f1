//! Physics parameters and the interaction capability set.
//!
//! Both structs are fixed at mount. Physics values apply uniformly to all
//! nodes and links. Per-node radius and icon sizing are derived from the
//! uniform base when a node's element is created.

use leptos::prelude::Callback;

use super::types::GraphNode;

/// Force simulation parameters, all caller-configurable with defaults.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
	/// Per-step energy decay rate.
	pub alpha_decay: f64,
	/// Many-body charge strength. Positive attracts, negative repels.
	pub charge_strength: f64,
	/// Padding added to each node's radius for collision avoidance.
	pub collide_padding: f64,
	/// Strength of the centering pull toward the surface midpoint.
	pub gravity_strength: f64,
	/// Resting length of link springs.
	pub link_distance: f64,
	/// Stiffness of link springs.
	pub link_strength: f64,
	/// Visual node radius, fixed per node at element creation.
	pub radius: f64,
	/// Icon size as a multiple of the node radius.
	pub icon_ratio: f64,
	/// Whether nodes lacking coordinates get a uniform-random initial
	/// position within the surface bounds.
	pub random_placement: bool,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			alpha_decay: 0.075,
			charge_strength: 5.0,
			collide_padding: 10.0,
			gravity_strength: 0.1,
			link_distance: 0.5,
			link_strength: 2.0,
			radius: 15.0,
			icon_ratio: 1.5,
			random_placement: true,
		}
	}
}

/// Interaction capability set. Each optional behavior is an explicit field,
/// decided once at mount rather than probed at event time.
#[derive(Clone)]
pub struct Interactions {
	/// Enable node dragging on the svg surface.
	pub drag: bool,
	/// Enable the rate-limited window-resize recompute.
	pub resize: bool,
	/// Invoked with the bound node snapshot on click.
	pub on_click: Option<Callback<GraphNode>>,
	/// Invoked with the bound node snapshot on pointer-over.
	pub on_hover: Option<Callback<GraphNode>>,
	/// Invoked with the bound node snapshot on pointer-out.
	pub on_hover_out: Option<Callback<GraphNode>>,
}

impl Default for Interactions {
	fn default() -> Self {
		Self {
			drag: true,
			resize: true,
			on_click: None,
			on_hover: None,
			on_hover_out: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn simulation_defaults_match_reference() {
		let c = SimulationConfig::default();
		assert_eq!(c.alpha_decay, 0.075);
		assert_eq!(c.charge_strength, 5.0);
		assert_eq!(c.collide_padding, 10.0);
		assert_eq!(c.gravity_strength, 0.1);
		assert_eq!(c.link_distance, 0.5);
		assert_eq!(c.link_strength, 2.0);
		assert_eq!(c.radius, 15.0);
		assert_eq!(c.icon_ratio, 1.5);
		assert!(c.random_placement);
	}

	#[test]
	fn interactions_default_to_drag_and_resize() {
		let i = Interactions::default();
		assert!(i.drag);
		assert!(i.resize);
		assert!(i.on_click.is_none());
		assert!(i.on_hover.is_none());
		assert!(i.on_hover_out.is_none());
	}
}
