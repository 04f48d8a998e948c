/// Logical drawing area. The canvas backing store always has this size and
/// CSS scales it to the container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 500.0,
		}
	}
}

impl Viewport {
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

/// Constants of the force simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceSettings {
	pub link_distance: f64,
	pub link_strength: f64,
	pub charge_strength: f64,
	pub y_strength: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub velocity_decay: f64,
	/// Energy floor held while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Column of group A as a fraction of the viewport width.
	pub column_a: f64,
	/// Column of group B as a fraction of the viewport width.
	pub column_b: f64,
}

impl Default for ForceSettings {
	fn default() -> Self {
		let alpha_min = 0.001_f64;
		Self {
			link_distance: 200.0,
			link_strength: 0.1,
			charge_strength: -100.0,
			y_strength: 0.1,
			alpha_min,
			// reaches alpha_min from 1 in 300 ticks
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
			column_a: 0.25,
			column_b: 0.75,
		}
	}
}

/// Constants of the view layer.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSettings {
	pub min_scale: f64,
	pub max_scale: f64,
	pub rotation_duration_ms: f64,
	/// Multiplicative zoom step per wheel notch.
	pub wheel_step: f64,
}

impl Default for ViewSettings {
	fn default() -> Self {
		Self {
			min_scale: 0.5,
			max_scale: 3.0,
			rotation_duration_ms: 300.0,
			wheel_step: 1.1,
		}
	}
}
