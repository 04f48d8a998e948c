use log::debug;

use super::layout::Simulation;
use super::style::NODE_RADIUS;
use super::transform::ViewState;
use super::types::ForceSettings;
use crate::model::{Edge, NodeGroup, Side};

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub last_x: f64,
	pub last_y: f64,
}

/// Everything the canvas shows: one live layout plus the view transforms.
///
/// Pointer coordinates are in viewport units (the canvas backing store).
pub struct GraphSurface {
	pub simulation: Simulation,
	pub view: ViewState,
	pub drag: DragState,
	pub pan: PanState,
	color_a: String,
	color_b: String,
}

impl GraphSurface {
	/// Build and start a fresh layout under an existing view.
	pub fn new(
		group_a: &NodeGroup,
		group_b: &NodeGroup,
		edges: &[Edge],
		view: ViewState,
	) -> Self {
		let simulation = start_layout(group_a, group_b, edges, &view);
		Self {
			simulation,
			view,
			drag: DragState::default(),
			pan: PanState::default(),
			color_a: group_a.color.clone(),
			color_b: group_b.color.clone(),
		}
	}

	/// Swap in a layout for new inputs, keeping pan, zoom and rotation.
	///
	/// The running layout is stopped before the new one starts; it is
	/// returned so the caller can drop it.
	pub fn rebuild(
		&mut self,
		group_a: &NodeGroup,
		group_b: &NodeGroup,
		edges: &[Edge],
	) -> Simulation {
		self.simulation.stop();
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.color_a = group_a.color.clone();
		self.color_b = group_b.color.clone();
		let next = start_layout(group_a, group_b, edges, &self.view);
		std::mem::replace(&mut self.simulation, next)
	}

	pub fn color(&self, side: Side) -> &str {
		match side {
			Side::A => &self.color_a,
			Side::B => &self.color_b,
		}
	}

	/// Topmost node under a viewport point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (x, y) = self.view.screen_to_layout(sx, sy)?;
		self.simulation
			.nodes()
			.iter()
			.rposition(|n| (n.x - x).hypot(n.y - y) <= NODE_RADIUS)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let Some((x, y)) = self.view.screen_to_layout(sx, sy) else {
			return;
		};
		if let Some(idx) = self.node_at_position(sx, sy) {
			let node = &self.simulation.nodes()[idx];
			self.drag = DragState {
				node: Some(idx),
				start_x: x,
				start_y: y,
				node_start_x: node.x,
				node_start_y: node.y,
			};
			debug!("drag start on {}", node.id);
			self.simulation.drag_start(idx);
		} else {
			self.pan = PanState {
				active: true,
				last_x: sx,
				last_y: sy,
			};
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.drag.node {
			if let Some((x, y)) = self.view.screen_to_layout(sx, sy) {
				self.simulation.drag_to(
					idx,
					self.drag.node_start_x + (x - self.drag.start_x),
					self.drag.node_start_y + (y - self.drag.start_y),
				);
			}
		} else if self.pan.active {
			self.view.pan_by(sx - self.pan.last_x, sy - self.pan.last_y);
			self.pan.last_x = sx;
			self.pan.last_y = sy;
		}
	}

	/// End any gesture. Also used when the pointer leaves the canvas.
	pub fn pointer_up(&mut self) {
		if let Some(idx) = self.drag.node.take() {
			self.simulation.drag_end(idx);
		}
		self.pan.active = false;
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.view.wheel(sx, sy, delta_y);
	}

	/// One animation frame: tick the layout and sample the rotation.
	pub fn advance(&mut self, now_ms: f64) {
		self.simulation.tick();
		self.view.advance(now_ms);
	}
}

fn start_layout(
	group_a: &NodeGroup,
	group_b: &NodeGroup,
	edges: &[Edge],
	view: &ViewState,
) -> Simulation {
	let mut simulation = Simulation::new(
		group_a,
		group_b,
		edges,
		view.viewport(),
		ForceSettings::default(),
	);
	simulation.start();
	simulation
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::bipartite_graph::layout::Status;
	use crate::components::bipartite_graph::transform::Point;
	use crate::components::bipartite_graph::types::{ViewSettings, Viewport};
	use crate::model::complete_edges;

	fn surface(rotation: f64) -> GraphSurface {
		let a = NodeGroup::new("Users", 3, "#3b82f6");
		let b = NodeGroup::new("Features", 4, "#ef4444");
		let view = ViewState::new(Viewport::default(), ViewSettings::default(), rotation);
		GraphSurface::new(&a, &b, &complete_edges(3, 4), view)
	}

	fn screen_of(s: &GraphSurface, idx: usize) -> (f64, f64) {
		let (cx, cy) = s.view.viewport().center();
		let node = &s.simulation.nodes()[idx];
		let p = s.view.composite().transform_point(Point::new(node.x - cx, node.y - cy));
		(p.x, p.y)
	}

	#[test]
	fn new_surface_is_running_with_group_colors() {
		let s = surface(0.0);
		assert!(s.simulation.is_running());
		assert_eq!(s.color(Side::A), "#3b82f6");
		assert_eq!(s.color(Side::B), "#ef4444");
	}

	#[test]
	fn rebuild_stops_previous_layout_before_starting() {
		let mut s = surface(30.0);
		s.view.zoom.k = 2.0;
		s.pointer_down(400.0, 5.0);
		let a = NodeGroup::new("Genes", 2, "#10b981");
		let b = NodeGroup::new("Diseases", 5, "#f59e0b");

		let previous = s.rebuild(&a, &b, &complete_edges(2, 5));
		assert_eq!(previous.status(), Status::Stopped);
		assert_eq!(previous.nodes().len(), 7);
		assert!(s.simulation.is_running());
		assert_eq!(s.simulation.nodes()[0].id, "Genes-1");
		assert_eq!(s.simulation.links().len(), 10);
		assert_eq!(s.color(Side::A), "#10b981");
		assert_eq!(s.view.zoom.k, 2.0);
		assert_eq!(s.view.rotation.diagram_degrees(), 30.0);
		assert!(!s.pan.active);
	}

	#[test]
	fn hit_test_under_rotation() {
		let s = surface(90.0);
		for idx in 0..s.simulation.nodes().len() {
			let (sx, sy) = screen_of(&s, idx);
			assert_eq!(s.node_at_position(sx, sy), Some(idx));
		}
		assert_eq!(s.node_at_position(400.0, 10.0), None);
	}

	#[test]
	fn pointer_drag_moves_node_then_snaps_back() {
		let mut s = surface(0.0);
		let (sx, sy) = screen_of(&s, 1);
		s.pointer_down(sx, sy);
		assert_eq!(s.drag.node, Some(1));
		s.pointer_move(sx + 100.0, sy + 20.0);
		s.advance(16.0);
		let node = &s.simulation.nodes()[1];
		assert_eq!(node.fx, Some(200.0 + 100.0));
		assert_eq!(node.x, 300.0);

		s.pointer_up();
		assert_eq!(s.drag.node, None);
		for t in 0..400 {
			s.advance(32.0 + t as f64 * 16.0);
		}
		assert!(s.simulation.nodes().iter().all(|n| n.x == 200.0 || n.x == 600.0));
	}

	#[test]
	fn background_drag_pans() {
		let mut s = surface(0.0);
		s.pointer_down(400.0, 5.0);
		assert!(s.pan.active);
		s.pointer_move(430.0, 25.0);
		assert_eq!((s.view.zoom.x, s.view.zoom.y), (30.0, 20.0));
		s.pointer_up();
		assert!(!s.pan.active);
		s.pointer_move(500.0, 500.0);
		assert_eq!((s.view.zoom.x, s.view.zoom.y), (30.0, 20.0));
	}
}
