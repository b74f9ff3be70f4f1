//! Force simulation driving the graph layout.
//!
//! Implements the observable behavior of a d3-style velocity-Verlet
//! solver. An energy level ("alpha") decays toward a target each step.
//! The forces are a centering pull, many-body charge, pairwise collision
//! avoidance, and link springs resolved by node identifier. Individual
//! nodes can be pinned in place (`fx`/`fy`) while dragged.
//!
//! The view layer configures forces, feeds nodes and links in, and reads
//! positions back each frame. It never reaches into the force math. All
//! passes are O(n²) over plain vectors, which is comfortable at the graph
//! sizes this widget renders.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use super::types::GraphNode;

/// Energy floor below which the simulation settles.
const ALPHA_MIN: f64 = 0.001;
/// Per-step velocity damping multiplier.
const VELOCITY_DECAY: f64 = 0.6;
/// Phyllotaxis spiral step radius for nodes placed without coordinates.
const INITIAL_RADIUS: f64 = 10.0;

/// Runtime node state owned by the simulation.
///
/// Positions and velocities are mutated in place each step; `fx`/`fy`
/// override the computed position while set.
#[derive(Clone, Debug)]
pub struct SimNode {
	/// Stable identifier, the reconciliation key.
	pub id: String,
	/// Entity type tag carried through for snapshots and styling.
	pub entity: String,
	/// Icon symbol id, if the caller supplied one.
	pub icon: Option<String>,
	/// Current x position. NaN until placed.
	pub x: f64,
	/// Current y position. NaN until placed.
	pub y: f64,
	/// Current x velocity.
	pub vx: f64,
	/// Current y velocity.
	pub vy: f64,
	/// Pinned x position, set during drag.
	pub fx: Option<f64>,
	/// Pinned y position, set during drag.
	pub fy: Option<f64>,
	/// Visual radius, fixed when the node's element is created.
	pub radius: f64,
}

impl SimNode {
	/// Snapshot the node as caller-facing data, with its current position.
	pub fn to_graph_node(&self) -> GraphNode {
		GraphNode {
			id: self.id.clone(),
			entity: self.entity.clone(),
			icon: self.icon.clone(),
			x: Some(self.x),
			y: Some(self.y),
		}
	}
}

/// A link resolved to node indices, valid until the next node merge.
#[derive(Clone, Debug)]
pub struct SimLink {
	/// Stable identifier of the link.
	pub id: String,
	/// Index of the source node in the simulation's node vector.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
}

#[derive(Clone, Copy, Debug)]
struct Centering {
	x: f64,
	y: f64,
	strength: f64,
}

#[derive(Clone, Copy, Debug)]
struct Collide {
	padding: f64,
	iterations: usize,
}

#[derive(Clone, Copy, Debug)]
struct LinkParams {
	distance: f64,
	strength: f64,
}

/// The force simulation. Created stopped; `restart` starts it.
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	alpha: f64,
	alpha_decay: f64,
	alpha_target: f64,
	running: bool,
	charge_strength: f64,
	centering: Option<Centering>,
	collide: Option<Collide>,
	link_params: Option<LinkParams>,
}

impl Simulation {
	/// Create a stopped simulation with the given decay and charge.
	pub fn new(alpha_decay: f64, charge_strength: f64) -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			alpha: 1.0,
			alpha_decay,
			alpha_target: 0.0,
			running: false,
			charge_strength,
			centering: None,
			collide: None,
			link_params: None,
		}
	}

	/// Current node set, in input order.
	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	/// Current resolved link set.
	pub fn links(&self) -> &[SimLink] {
		&self.links
	}

	/// Current energy level.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Whether steps currently advance the layout.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Configured centering point, if any.
	pub fn center(&self) -> Option<(f64, f64)> {
		self.centering.map(|c| (c.x, c.y))
	}

	/// Halt the simulation. Subsequent `step` calls are no-ops until
	/// `restart`.
	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Resume stepping.
	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Reset energy to maximum so the next run animates from a fresh start.
	pub fn reset_alpha(&mut self) {
		self.alpha = 1.0;
	}

	/// Change the decay rate (lowered during drag, restored after).
	pub fn set_alpha_decay(&mut self, decay: f64) {
		self.alpha_decay = decay;
	}

	/// Change the energy target the decay converges toward.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Install the centering pull toward `(x, y)` at the given strength.
	pub fn set_centering(&mut self, x: f64, y: f64, strength: f64) {
		self.centering = Some(Centering { x, y, strength });
	}

	/// Install collision avoidance with the given radius padding.
	pub fn set_collide(&mut self, padding: f64, iterations: usize) {
		self.collide = Some(Collide {
			padding,
			iterations,
		});
	}

	/// Install the link spring force, or clear it when `links` is empty.
	pub fn set_link_force(&mut self, links: Vec<SimLink>, distance: f64, strength: f64) {
		if links.is_empty() {
			self.links.clear();
			self.link_params = None;
		} else {
			self.links = links;
			self.link_params = Some(LinkParams {
				distance,
				strength,
			});
		}
	}

	/// Merge input nodes against the current node set by identifier.
	///
	/// Survivors keep position, velocity, pin state, and bound radius; their
	/// entity/icon tags are refreshed from the input. New nodes take their
	/// optional input coordinates (NaN until placed) and the given radius.
	/// Duplicate identifiers collapse to the first occurrence. Resolved links
	/// are invalidated and must be reinstalled afterwards.
	pub fn merge_nodes(&mut self, input: &[GraphNode], radius: f64) {
		let mut prev: HashMap<String, SimNode> = self
			.nodes
			.drain(..)
			.map(|n| (n.id.clone(), n))
			.collect();

		let mut seen: HashSet<&str> = HashSet::new();
		let mut merged = Vec::with_capacity(input.len());
		for gn in input {
			if !seen.insert(gn.id.as_str()) {
				continue;
			}
			if let Some(mut old) = prev.remove(gn.id.as_str()) {
				old.entity = gn.entity.clone();
				old.icon = gn.icon.clone();
				merged.push(old);
				continue;
			}
			merged.push(SimNode {
				id: gn.id.clone(),
				entity: gn.entity.clone(),
				icon: gn.icon.clone(),
				x: gn.x.unwrap_or(f64::NAN),
				y: gn.y.unwrap_or(f64::NAN),
				vx: 0.0,
				vy: 0.0,
				fx: None,
				fy: None,
				radius,
			});
		}
		self.nodes = merged;
		self.links.clear();
		self.link_params = None;
	}

	/// Assign initial positions to nodes that still lack them.
	///
	/// With `random_placement`, a node missing both coordinates gets a
	/// uniform-random position within `width × height`, drawn from `rand01`.
	/// Any coordinate still missing afterwards is filled from the
	/// deterministic phyllotaxis spiral around the surface midpoint.
	/// Previously placed nodes are never moved.
	pub fn place_nodes<R: FnMut() -> f64>(
		&mut self,
		width: f64,
		height: f64,
		random_placement: bool,
		mut rand01: R,
	) {
		if random_placement {
			for node in &mut self.nodes {
				if node.x.is_nan() && node.y.is_nan() {
					node.x = rand01() * width;
					node.y = rand01() * height;
				}
			}
		}
		let initial_angle = PI * (3.0 - 5.0_f64.sqrt());
		for (i, node) in self.nodes.iter_mut().enumerate() {
			if node.x.is_nan() || node.y.is_nan() {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * initial_angle;
				if node.x.is_nan() {
					node.x = width / 2.0 + radius * angle.cos();
				}
				if node.y.is_nan() {
					node.y = height / 2.0 + radius * angle.sin();
				}
			}
		}
	}

	/// Index of the node with the given identifier.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	/// Index of the node nearest to `(x, y)`, if any nodes exist.
	pub fn find(&self, x: f64, y: f64) -> Option<usize> {
		let mut best = None;
		let mut best_d2 = f64::INFINITY;
		for (i, n) in self.nodes.iter().enumerate() {
			let (dx, dy) = (n.x - x, n.y - y);
			let d2 = dx * dx + dy * dy;
			if d2 < best_d2 {
				best_d2 = d2;
				best = Some(i);
			}
		}
		best
	}

	/// Pin a node at `(x, y)`. Pinned nodes hold position with zero velocity.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(n) = self.nodes.get_mut(idx) {
			n.fx = Some(x);
			n.fy = Some(y);
		}
	}

	/// Release a pinned node back to free simulation.
	pub fn unpin(&mut self, idx: usize) {
		if let Some(n) = self.nodes.get_mut(idx) {
			n.fx = None;
			n.fy = None;
		}
	}

	/// Advance one step: decay energy, apply forces, integrate positions.
	/// No-op while stopped; settles (stops) once energy falls below the
	/// floor with the target at rest.
	pub fn step(&mut self) {
		if !self.running {
			return;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		self.apply_link_force();
		self.apply_charge();
		self.apply_collide();
		self.apply_centering();
		self.integrate();
		if self.alpha < ALPHA_MIN {
			self.running = false;
		}
	}

	fn apply_charge(&mut self) {
		let n = self.nodes.len();
		for i in 0..n {
			let (xi, yi) = (self.nodes[i].x, self.nodes[i].y);
			let (mut ax, mut ay) = (0.0, 0.0);
			for j in 0..n {
				if j == i {
					continue;
				}
				let dx = self.nodes[j].x - xi;
				let dy = self.nodes[j].y - yi;
				let mut l2 = dx * dx + dy * dy;
				if l2 == 0.0 {
					continue;
				}
				// Clamp short distances to keep the 1/d² term bounded.
				if l2 < 1.0 {
					l2 = l2.sqrt();
				}
				let w = self.charge_strength * self.alpha / l2;
				ax += dx * w;
				ay += dy * w;
			}
			self.nodes[i].vx += ax;
			self.nodes[i].vy += ay;
		}
	}

	fn apply_collide(&mut self) {
		let Some(c) = self.collide else {
			return;
		};
		let n = self.nodes.len();
		for _ in 0..c.iterations {
			for i in 0..n {
				for j in (i + 1)..n {
					let ri = self.nodes[i].radius + c.padding;
					let rj = self.nodes[j].radius + c.padding;
					let r = ri + rj;
					let mut dx =
						(self.nodes[j].x + self.nodes[j].vx) - (self.nodes[i].x + self.nodes[i].vx);
					let mut dy =
						(self.nodes[j].y + self.nodes[j].vy) - (self.nodes[i].y + self.nodes[i].vy);
					let mut l2 = dx * dx + dy * dy;
					if l2 >= r * r {
						continue;
					}
					if l2 == 0.0 {
						dx = 1e-6;
						dy = 0.0;
						l2 = dx * dx;
					}
					let l = l2.sqrt();
					let d = (r - l) / l;
					// Heavier (larger) partner moves less.
					let ratio = rj * rj / (ri * ri + rj * rj);
					self.nodes[i].vx -= dx * d * ratio;
					self.nodes[i].vy -= dy * d * ratio;
					self.nodes[j].vx += dx * d * (1.0 - ratio);
					self.nodes[j].vy += dy * d * (1.0 - ratio);
				}
			}
		}
	}

	fn apply_centering(&mut self) {
		let Some(c) = self.centering else {
			return;
		};
		for node in &mut self.nodes {
			node.vx += (c.x - node.x) * c.strength * self.alpha;
			node.vy += (c.y - node.y) * c.strength * self.alpha;
		}
	}

	fn apply_link_force(&mut self) {
		let Some(p) = self.link_params else {
			return;
		};
		let mut degree = vec![0usize; self.nodes.len()];
		for link in &self.links {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		for link in &self.links {
			let (s, t) = (link.source, link.target);
			let mut dx =
				(self.nodes[t].x + self.nodes[t].vx) - (self.nodes[s].x + self.nodes[s].vx);
			let mut dy =
				(self.nodes[t].y + self.nodes[t].vy) - (self.nodes[s].y + self.nodes[s].vy);
			if dx == 0.0 && dy == 0.0 {
				dx = 1e-6;
				dy = 1e-6;
			}
			let l = (dx * dx + dy * dy).sqrt();
			let k = (l - p.distance) / l * self.alpha * p.strength;
			dx *= k;
			dy *= k;
			// Better-connected endpoints move less.
			let bias = degree[s] as f64 / (degree[s] + degree[t]) as f64;
			self.nodes[t].vx -= dx * bias;
			self.nodes[t].vy -= dy * bias;
			self.nodes[s].vx += dx * (1.0 - bias);
			self.nodes[s].vy += dy * (1.0 - bias);
		}
	}

	fn integrate(&mut self) {
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= VELOCITY_DECAY;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= VELOCITY_DECAY;
					node.y += node.vy;
				}
			}
		}
	}
}
