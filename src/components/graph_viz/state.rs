//! Owned view state for a mounted graph instance.
//!
//! `GraphVizState` bundles the simulation, the element bindings, the
//! measured dimensions, and drag bookkeeping. It is constructed when the
//! component attaches and dropped on detach. Layout passes, animation
//! frames, drag, and resize all go through its methods, so the
//! halt-before-mutate ordering lives in one place.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use leptos::prelude::{Callable, Callback};
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent};

use super::binder;
use super::config::{Interactions, SimulationConfig};
use super::sim::{SimLink, Simulation};
use super::types::{GraphData, GraphNode};

/// Shared handle to the optional view state; `None` before mount and after
/// teardown.
pub type StateHandle = Rc<RefCell<Option<GraphVizState>>>;

type Listener = Closure<dyn FnMut(MouseEvent)>;

/// Leading-edge rate limiter: at most one pass per interval.
#[derive(Clone, Debug)]
pub struct Throttle {
	interval_ms: f64,
	last_ms: Option<f64>,
}

impl Throttle {
	/// Gate allowing one invocation per `interval_ms`.
	pub fn new(interval_ms: f64) -> Self {
		Self {
			interval_ms,
			last_ms: None,
		}
	}

	/// Whether an event at `now_ms` passes the gate. Passing events reset it.
	pub fn ready(&mut self, now_ms: f64) -> bool {
		match self.last_ms {
			Some(last) if now_ms - last < self.interval_ms => false,
			_ => {
				self.last_ms = Some(now_ms);
				true
			}
		}
	}
}

/// Tracks an in-progress node drag gesture.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Whether a gesture is active.
	pub active: bool,
	/// Identifier of the dragged node.
	pub node: Option<String>,
	/// Grab offset from the pointer to the node center.
	pub offset_x: f64,
	/// Grab offset from the pointer to the node center.
	pub offset_y: f64,
}

struct NodeBinding {
	group: Element,
	// Keeps the element's event closures alive for the binding's lifetime.
	_listeners: Vec<Listener>,
}

struct LinkBinding {
	group: Element,
	line: Element,
}

/// Everything a mounted graph instance owns.
pub struct GraphVizState {
	/// The force simulation driving positions.
	pub sim: Simulation,
	/// Physics configuration, fixed at mount.
	pub config: SimulationConfig,
	/// Interaction capability set, fixed at mount.
	pub interactions: Interactions,
	/// Last measured surface width.
	pub width: f64,
	/// Surface height from the component prop.
	pub height: f64,
	/// Current drag gesture, if any.
	pub drag: DragState,
	/// Rate limiter for the window-resize recompute.
	pub resize_gate: Throttle,
	svg: Element,
	node_els: HashMap<String, NodeBinding>,
	link_els: HashMap<String, LinkBinding>,
}

impl GraphVizState {
	/// Build the state for a freshly mounted svg surface: measure it, append
	/// the background overlay, and create the (stopped) simulation.
	pub fn new(
		svg: Element,
		height: f64,
		config: SimulationConfig,
		interactions: Interactions,
	) -> Self {
		let document = web_sys::window().unwrap().document().unwrap();
		binder::append_overlay(&document, &svg);
		let width = binder::measure_width(&svg);
		let sim = Simulation::new(config.alpha_decay, config.charge_strength);
		Self {
			sim,
			config,
			interactions,
			width,
			height,
			drag: DragState::default(),
			resize_gate: Throttle::new(100.0),
			svg,
			node_els: HashMap::new(),
			link_els: HashMap::new(),
		}
	}

	/// The layout transaction: re-measure, merge and place nodes, halt the
	/// simulation, reconcile elements, rebuild forces, then restart at full
	/// energy. Every trigger path (mount, data update) calls this.
	pub fn run_layout(&mut self, data: &GraphData, handle: &StateHandle) {
		let document = web_sys::window().unwrap().document().unwrap();

		// Halt first: no tick may interleave with the merge and
		// reconciliation below.
		self.sim.stop();

		self.width = binder::measure_width(&self.svg);

		self.sim.merge_nodes(&data.nodes, self.config.radius);
		self.sim.place_nodes(
			self.width,
			self.height,
			self.config.random_placement,
			js_sys::Math::random,
		);

		let link_ids: Vec<String> = data.links.iter().map(|l| l.id.clone()).collect();
		let link_diff = binder::diff_keys(self.link_els.keys(), &link_ids);
		for id in &link_diff.exit {
			if let Some(binding) = self.link_els.remove(id) {
				binding.group.remove();
			}
		}
		for link in &data.links {
			if link_diff.enter.contains(&link.id) && !self.link_els.contains_key(&link.id) {
				let (group, line) = binder::create_link_group(&document, &self.svg, link);
				self.link_els
					.insert(link.id.clone(), LinkBinding { group, line });
			}
		}

		let node_ids: Vec<String> = data.nodes.iter().map(|n| n.id.clone()).collect();
		let node_diff = binder::diff_keys(self.node_els.keys(), &node_ids);
		for id in &node_diff.exit {
			if let Some(binding) = self.node_els.remove(id) {
				binding.group.remove();
			}
		}
		for node in &data.nodes {
			if node_diff.enter.contains(&node.id) && !self.node_els.contains_key(&node.id) {
				let group = binder::create_node_group(
					&document,
					&self.svg,
					node,
					self.config.radius,
					self.config.icon_ratio,
				);
				// Newly created elements only; survivors keep their listeners.
				let listeners = attach_node_listeners(&self.interactions, &group, &node.id, handle);
				self.node_els.insert(
					node.id.clone(),
					NodeBinding {
						group,
						_listeners: listeners,
					},
				);
			}
		}

		self.sim
			.set_collide(self.config.collide_padding, 2);
		self.sim.set_centering(
			self.width / 2.0,
			self.height / 2.0,
			self.config.gravity_strength,
		);
		let resolved: Vec<SimLink> = data
			.links
			.iter()
			.filter_map(|link| {
				// Links referencing unknown nodes are skipped.
				let source = self.sim.index_of(&link.source)?;
				let target = self.sim.index_of(&link.target)?;
				Some(SimLink {
					id: link.id.clone(),
					source,
					target,
				})
			})
			.collect();
		self.sim
			.set_link_force(resolved, self.config.link_distance, self.config.link_strength);

		self.sim.reset_alpha();
		self.sim.restart();
	}

	/// Animation-frame body: advance one step and write positions to the
	/// elements. Idles once the simulation settles.
	pub fn step_and_render(&mut self) {
		if !self.sim.is_running() {
			return;
		}
		self.sim.step();
		self.apply_positions();
	}

	/// Write each node's position as a translation and each link's resolved
	/// endpoints onto the bound elements.
	pub fn apply_positions(&self) {
		for node in self.sim.nodes() {
			if let Some(binding) = self.node_els.get(&node.id) {
				binder::set_node_transform(&binding.group, node.x, node.y);
			}
		}
		let nodes = self.sim.nodes();
		for link in self.sim.links() {
			let (Some(source), Some(target)) = (nodes.get(link.source), nodes.get(link.target))
			else {
				continue;
			};
			if let Some(binding) = self.link_els.get(&link.id) {
				binder::set_link_endpoints(&binding.line, source.x, source.y, target.x, target.y);
			}
		}
	}

	/// Rate-limited window-resize recompute: halt, re-measure, re-center,
	/// reheat. No reconciliation or re-placement happens here.
	pub fn handle_resize(&mut self, now_ms: f64) {
		if !self.resize_gate.ready(now_ms) {
			return;
		}
		self.sim.stop();
		self.width = binder::measure_width(&self.svg);
		self.sim.set_centering(
			self.width / 2.0,
			self.height / 2.0,
			self.config.gravity_strength,
		);
		self.sim.reset_alpha();
		self.sim.restart();
	}

	/// Begin a drag gesture at surface coordinates `(x, y)`: pick the
	/// nearest node, keep the simulation hot while manipulating, and pin the
	/// node at its current position.
	pub fn drag_start(&mut self, x: f64, y: f64) {
		let Some(idx) = self.sim.find(x, y) else {
			return;
		};
		if !self.drag.active {
			self.sim.set_alpha_decay(0.001);
			self.sim.set_alpha_target(0.3);
			self.sim.restart();
		}
		let node = &self.sim.nodes()[idx];
		let (nx, ny) = (node.x, node.y);
		self.drag = DragState {
			active: true,
			node: Some(node.id.clone()),
			offset_x: nx - x,
			offset_y: ny - y,
		};
		self.sim.pin(idx, nx, ny);
	}

	/// Follow the pointer, preserving the grab offset.
	pub fn drag_move(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			return;
		}
		let Some(id) = self.drag.node.clone() else {
			return;
		};
		if let Some(idx) = self.sim.index_of(&id) {
			self.sim
				.pin(idx, x + self.drag.offset_x, y + self.drag.offset_y);
		}
	}

	/// End the gesture: restore decay, relax the energy target, unpin.
	pub fn drag_end(&mut self) {
		if !self.drag.active {
			return;
		}
		self.sim.set_alpha_decay(self.config.alpha_decay);
		self.sim.set_alpha_target(0.0);
		if let Some(id) = self.drag.node.take() {
			if let Some(idx) = self.sim.index_of(&id) {
				self.sim.unpin(idx);
			}
		}
		self.drag.active = false;
	}

	/// Snapshot the bound entity for a node identifier, with its current
	/// position.
	pub fn snapshot(&self, id: &str) -> Option<GraphNode> {
		self.sim
			.nodes()
			.iter()
			.find(|n| n.id == id)
			.map(|n| n.to_graph_node())
	}

	/// The group element bound to a node identifier.
	pub fn node_element(&self, id: &str) -> Option<Element> {
		self.node_els.get(id).map(|b| b.group.clone())
	}

	/// The group element bound to a link identifier.
	pub fn link_element(&self, id: &str) -> Option<Element> {
		self.link_els.get(id).map(|b| b.group.clone())
	}

	/// Number of bound node elements.
	pub fn node_element_count(&self) -> usize {
		self.node_els.len()
	}

	/// Number of bound link elements.
	pub fn link_element_count(&self) -> usize {
		self.link_els.len()
	}
}

/// Wire the configured callbacks onto a newly created node group. The
/// returned closures must stay alive as long as the element is bound.
///
/// Each handler snapshots the entity first and releases the state borrow
/// before invoking the caller's callback, so a callback that triggers a new
/// layout pass cannot double-borrow.
fn attach_node_listeners(
	interactions: &Interactions,
	group: &Element,
	id: &str,
	handle: &StateHandle,
) -> Vec<Listener> {
	let mut listeners = Vec::new();
	let mut wire = |event: &str, callback: &Option<Callback<GraphNode>>| {
		let Some(callback) = callback.clone() else {
			return;
		};
		let handle = handle.clone();
		let id = id.to_string();
		let closure: Listener = Closure::new(move |_event: MouseEvent| {
			let snapshot = handle.borrow().as_ref().and_then(|s| s.snapshot(&id));
			if let Some(node) = snapshot {
				callback.run(node);
			}
		});
		group
			.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
			.unwrap();
		listeners.push(closure);
	};
	wire("click", &interactions.on_click);
	wire("mouseover", &interactions.on_hover);
	wire("mouseout", &interactions.on_hover_out);
	listeners
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn throttle_passes_events_spaced_beyond_interval() {
		let mut gate = Throttle::new(100.0);
		assert!(gate.ready(0.0));
		assert!(gate.ready(150.0));
		assert!(gate.ready(300.0));
	}

	#[test]
	fn throttle_collapses_bursts_to_one() {
		let mut gate = Throttle::new(100.0);
		assert!(gate.ready(0.0));
		assert!(!gate.ready(10.0));
		assert!(!gate.ready(99.0));
		assert!(gate.ready(100.0));
		assert!(!gate.ready(199.9));
	}
}
