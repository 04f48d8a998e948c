//! Bipartite force layout.
//!
//! A velocity-Verlet style simulation with link, many-body, centering and
//! vertical-slot forces. Every node of group A is pinned horizontally to one
//! column and every node of group B to the other; only dragging lifts the
//! pin, and releasing the node puts it back.

use log::{debug, warn};

use super::types::{ForceSettings, Viewport};
use crate::model::{Edge, Evidence, NodeGroup, Side, clamp_count};

/// A simulated node, rebuilt on every layout pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// `"<group name>-<1-based index>"`.
	pub id: String,
	pub side: Side,
	/// Position inside its group.
	pub index: usize,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Horizontal pin.
	pub fx: Option<f64>,
	/// Vertical pin, only set while dragging.
	pub fy: Option<f64>,
	/// Initial vertical slot; the y force pulls toward it.
	pub slot_y: f64,
}

impl Node {
	/// Label text: the 1-based index without the group name.
	pub fn label(&self) -> String {
		(self.index + 1).to_string()
	}
}

/// An edge resolved to node indices of the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub source: usize,
	pub target: usize,
	pub weight: f64,
	pub evidence: Evidence,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
	/// Built, not started yet.
	Idle,
	Running,
	/// Energy fell below the minimum.
	Settled,
	/// Explicitly stopped by the owner.
	Stopped,
}

/// Deterministic jitter source for coincident nodes.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Default for Lcg {
	fn default() -> Self {
		Self(1)
	}
}

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn next(&mut self) -> f64 {
		self.0 = (Self::A * self.0 + Self::C) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

/// A restartable stepping process over the bipartite layout.
pub struct Simulation {
	nodes: Vec<Node>,
	links: Vec<Link>,
	/// Share of each link correction applied to its target.
	bias: Vec<f64>,
	settings: ForceSettings,
	viewport: Viewport,
	alpha: f64,
	alpha_target: f64,
	status: Status,
	ticks: usize,
	random: Lcg,
}

impl Simulation {
	/// Materialize nodes and links for the two groups.
	///
	/// Counts are clamped into range so slot spacing never divides by zero,
	/// and edges pointing past either group are dropped.
	pub fn new(
		group_a: &NodeGroup,
		group_b: &NodeGroup,
		edges: &[Edge],
		viewport: Viewport,
		settings: ForceSettings,
	) -> Self {
		let mut nodes = Vec::new();
		for (side, group) in [(Side::A, group_a), (Side::B, group_b)] {
			let count = clamp_count(group.count);
			if count != group.count {
				warn!("group {} count {} clamped to {count}", group.name, group.count);
			}
			let column = column_x(&settings, viewport, side);
			let spacing = viewport.height / (count as f64 + 1.0);
			nodes.extend((0..count).map(|index| {
				let y = spacing * (index as f64 + 1.0);
				Node {
					id: format!("{}-{}", group.name, index + 1),
					side,
					index,
					x: column,
					y,
					vx: 0.0,
					vy: 0.0,
					fx: Some(column),
					fy: None,
					slot_y: y,
				}
			}));
		}

		let (count_a, count_b) = (clamp_count(group_a.count), clamp_count(group_b.count));
		let links: Vec<Link> = edges
			.iter()
			.filter_map(|edge| {
				if edge.from >= count_a || edge.to >= count_b {
					warn!("dropping edge {}->{} outside {count_a}x{count_b}", edge.from, edge.to);
					return None;
				}
				Some(Link {
					source: edge.from,
					target: count_a + edge.to,
					weight: edge.weight,
					evidence: edge.evidence,
				})
			})
			.collect();

		let mut degree = vec![0usize; nodes.len()];
		for link in &links {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		let bias = links
			.iter()
			.map(|l| degree[l.source] as f64 / (degree[l.source] + degree[l.target]) as f64)
			.collect();

		Self {
			nodes,
			links,
			bias,
			settings,
			viewport,
			alpha: 1.0,
			alpha_target: 0.0,
			status: Status::Idle,
			ticks: 0,
			random: Lcg::default(),
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn status(&self) -> Status {
		self.status
	}

	pub fn is_running(&self) -> bool {
		self.status == Status::Running
	}

	/// The pinned horizontal coordinate of a side.
	pub fn column_x(&self, side: Side) -> f64 {
		column_x(&self.settings, self.viewport, side)
	}

	/// Start (or restart) ticking at the current energy.
	pub fn start(&mut self) {
		if self.status != Status::Running {
			debug!(
				"layout started with {} nodes, {} links",
				self.nodes.len(),
				self.links.len()
			);
		}
		self.status = Status::Running;
	}

	pub fn stop(&mut self) {
		if self.status == Status::Running {
			debug!("layout stopped after {} ticks", self.ticks);
		}
		self.status = Status::Stopped;
	}

	/// Advance one step if running. Returns whether the process keeps running.
	pub fn tick(&mut self) -> bool {
		if self.status != Status::Running {
			return false;
		}
		self.step();
		if self.alpha < self.settings.alpha_min {
			self.status = Status::Settled;
			debug!("layout settled after {} ticks", self.ticks);
		}
		self.is_running()
	}

	/// Reheat and pin `node` where it currently is.
	pub fn drag_start(&mut self, node: usize) {
		self.alpha_target = self.settings.drag_alpha_target;
		self.start();
		if let Some(n) = self.nodes.get_mut(node) {
			n.fx = Some(n.x);
			n.fy = Some(n.y);
		}
	}

	/// Move the pinned node to `(x, y)` in layout coordinates.
	pub fn drag_to(&mut self, node: usize, x: f64, y: f64) {
		if !(x.is_finite() && y.is_finite()) {
			return;
		}
		if let Some(n) = self.nodes.get_mut(node) {
			n.fx = Some(x);
			n.fy = Some(y);
		}
	}

	/// Cool down, free the vertical axis and snap the node back to its column.
	pub fn drag_end(&mut self, node: usize) {
		self.alpha_target = 0.0;
		let Some(side) = self.nodes.get(node).map(|n| n.side) else {
			return;
		};
		let column = self.column_x(side);
		let n = &mut self.nodes[node];
		n.x = column;
		n.vx = 0.0;
		n.fx = Some(column);
		n.fy = None;
	}

	fn step(&mut self) {
		self.ticks += 1;
		self.alpha += (self.alpha_target - self.alpha) * self.settings.alpha_decay;
		let alpha = self.alpha;

		self.apply_links(alpha);
		self.apply_charge(alpha);
		self.apply_center();
		self.apply_slots(alpha);

		let keep = 1.0 - self.settings.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}

	fn apply_links(&mut self, alpha: f64) {
		let (distance, strength) = (self.settings.link_distance, self.settings.link_strength);
		for i in 0..self.links.len() {
			let (source, target) = (self.links[i].source, self.links[i].target);
			let (s, t) = (&self.nodes[source], &self.nodes[target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = self.random.jiggle();
			}
			if dy == 0.0 {
				dy = self.random.jiggle();
			}
			let len = (dx * dx + dy * dy).sqrt();
			let l = (len - distance) / len * alpha * strength;
			let (dx, dy, b) = (dx * l, dy * l, self.bias[i]);

			let t = &mut self.nodes[target];
			t.vx -= dx * b;
			t.vy -= dy * b;
			let s = &mut self.nodes[source];
			s.vx += dx * (1.0 - b);
			s.vy += dy * (1.0 - b);
		}
	}

	// Exact pairwise repulsion; groups are small enough that no tree is needed.
	fn apply_charge(&mut self, alpha: f64) {
		let strength = self.settings.charge_strength;
		for i in 0..self.nodes.len() {
			let (mut ax, mut ay) = (0.0, 0.0);
			for j in 0..self.nodes.len() {
				if i == j {
					continue;
				}
				let mut dx = self.nodes[j].x - self.nodes[i].x;
				let mut dy = self.nodes[j].y - self.nodes[i].y;
				let mut l = dx * dx + dy * dy;
				if dx == 0.0 {
					dx = self.random.jiggle();
					l += dx * dx;
				}
				if dy == 0.0 {
					dy = self.random.jiggle();
					l += dy * dy;
				}
				if l < 1.0 {
					l = l.sqrt();
				}
				ax += dx * strength * alpha / l;
				ay += dy * strength * alpha / l;
			}
			self.nodes[i].vx += ax;
			self.nodes[i].vy += ay;
		}
	}

	fn apply_center(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (cx, cy) = self.viewport.center();
		let (dx, dy) = (sx / n - cx, sy / n - cy);
		for node in &mut self.nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}

	fn apply_slots(&mut self, alpha: f64) {
		let strength = self.settings.y_strength;
		for node in &mut self.nodes {
			node.vy += (node.slot_y - node.y) * strength * alpha;
		}
	}
}

fn column_x(settings: &ForceSettings, viewport: Viewport, side: Side) -> f64 {
	let fraction = match side {
		Side::A => settings.column_a,
		Side::B => settings.column_b,
	};
	viewport.width * fraction
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::complete_edges;

	fn build(count_a: usize, count_b: usize) -> Simulation {
		let a = NodeGroup::new("Users", count_a, "#3b82f6");
		let b = NodeGroup::new("Features", count_b, "#ef4444");
		Simulation::new(
			&a,
			&b,
			&complete_edges(count_a, count_b),
			Viewport::default(),
			ForceSettings::default(),
		)
	}

	fn settle(sim: &mut Simulation) -> usize {
		sim.start();
		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
			assert!(ticks < 2000, "simulation never settled");
		}
		ticks
	}

	fn assert_columns(sim: &Simulation) {
		for node in sim.nodes() {
			let expected = match node.side {
				Side::A => 200.0,
				Side::B => 600.0,
			};
			assert_eq!(node.x, expected, "{} left its column", node.id);
			assert!(node.y.is_finite());
		}
	}

	#[test]
	fn nodes_get_ids_columns_and_slots() {
		let sim = build(3, 4);
		let ids: Vec<_> = sim.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(
			ids,
			[
				"Users-1",
				"Users-2",
				"Users-3",
				"Features-1",
				"Features-2",
				"Features-3",
				"Features-4"
			]
		);
		let slots: Vec<_> = sim.nodes()[..3].iter().map(|n| n.y).collect();
		assert_eq!(slots, [125.0, 250.0, 375.0]);
		assert_columns(&sim);
		assert_eq!(sim.nodes()[4].label(), "2");
	}

	#[test]
	fn links_resolve_to_both_groups() {
		let sim = build(3, 4);
		assert_eq!(sim.links().len(), 12);
		let link = &sim.links()[1 * 4 + 2];
		assert_eq!(sim.nodes()[link.source].id, "Users-2");
		assert_eq!(sim.nodes()[link.target].id, "Features-3");
	}

	#[test]
	fn settles_with_columns_pinned() {
		let mut sim = build(3, 4);
		let ticks = settle(&mut sim);
		assert!(ticks <= 400);
		assert_eq!(sim.status(), Status::Settled);
		assert!(sim.alpha() < ForceSettings::default().alpha_min);
		assert_columns(&sim);
	}

	#[test]
	fn idle_and_stopped_simulations_do_not_move() {
		let mut sim = build(2, 2);
		let before = sim.nodes().to_vec();
		assert!(!sim.tick());
		sim.start();
		sim.stop();
		assert!(!sim.tick());
		assert_eq!(sim.nodes(), &before[..]);
	}

	#[test]
	fn drag_moves_node_and_release_restores_column() {
		let mut sim = build(3, 4);
		settle(&mut sim);

		sim.drag_start(0);
		assert!(sim.is_running());
		sim.drag_to(0, 450.0, 40.0);
		for _ in 0..5 {
			sim.tick();
		}
		assert_eq!((sim.nodes()[0].x, sim.nodes()[0].y), (450.0, 40.0));
		assert!(sim.alpha() > ForceSettings::default().alpha_min);

		sim.drag_end(0);
		assert_eq!(sim.nodes()[0].x, 200.0);
		assert_eq!(sim.nodes()[0].fy, None);
		settle(&mut sim);
		assert_columns(&sim);
	}

	#[test]
	fn drag_reheats_settled_layout() {
		let mut sim = build(2, 3);
		settle(&mut sim);
		sim.drag_start(3);
		for _ in 0..50 {
			sim.tick();
		}
		assert!(sim.is_running());
		assert!(sim.alpha() > 0.1);
	}

	#[test]
	fn zero_count_is_clamped_and_finite() {
		let a = NodeGroup {
			name: "Empty".into(),
			count: 0,
			color: "#000".into(),
		};
		let b = NodeGroup::new("Features", 1, "#fff");
		let mut sim = Simulation::new(
			&a,
			&b,
			&[],
			Viewport::default(),
			ForceSettings::default(),
		);
		assert_eq!(sim.nodes().len(), 2);
		settle(&mut sim);
		assert!(sim.nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
	}

	#[test]
	fn out_of_range_edges_are_dropped() {
		let a = NodeGroup::new("A", 2, "#000");
		let b = NodeGroup::new("B", 2, "#fff");
		let edges = [Edge::new(0, 1), Edge::new(2, 0), Edge::new(1, 5)];
		let sim = Simulation::new(&a, &b, &edges, Viewport::default(), ForceSettings::default());
		assert_eq!(sim.links().len(), 1);
	}
}
