//! View transforms: pan/zoom, animated rotation and their composition.
//!
//! The drawing transform is `translate(center) · rotate(r) · scale(k) · translate(pan)`
//! applied to layout coordinates measured from the viewport center. Labels
//! add a local `rotate(-r)` so they stay upright.

use euclid::Angle;

use super::types::{ViewSettings, Viewport};

pub type Unit = euclid::UnknownUnit;
pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
/// Canvas `setTransform(a, b, c, d, e, f)` takes `(m11, m12, m21, m22, m31, m32)`.
pub type Transform = euclid::Transform2D<f64, Unit, Unit>;

fn rotate(degrees: f64) -> Transform {
	Transform::rotation(Angle::degrees(degrees))
}

/// User pan and zoom. `x`/`y` is the pan offset applied before scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ZoomTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0) * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

/// A rotation animated from the displayed angle toward a target.
#[derive(Clone, Debug, PartialEq)]
pub struct RotationTransition {
	from: f64,
	to: f64,
	started_at: Option<f64>,
	duration_ms: f64,
	current: f64,
}

impl RotationTransition {
	pub fn new(degrees: f64, duration_ms: f64) -> Self {
		Self {
			from: degrees,
			to: degrees,
			started_at: None,
			duration_ms,
			current: degrees,
		}
	}

	/// Begin animating from the current angle to `degrees` at time `now_ms`.
	pub fn retarget(&mut self, degrees: f64, now_ms: f64) {
		if degrees == self.to && self.started_at.is_none() {
			return;
		}
		self.from = self.current;
		self.to = degrees;
		self.started_at = Some(now_ms);
		if self.duration_ms <= 0.0 {
			self.finish();
		}
	}

	/// Advance to `now_ms` and return the displayed angle.
	pub fn sample(&mut self, now_ms: f64) -> f64 {
		if let Some(start) = self.started_at {
			let t = (now_ms - start) / self.duration_ms;
			if t >= 1.0 {
				self.finish();
			} else {
				self.current = self.from + (self.to - self.from) * ease_cubic_in_out(t.max(0.0));
			}
		}
		self.current
	}

	fn finish(&mut self) {
		self.current = self.to;
		self.from = self.to;
		self.started_at = None;
	}

	pub fn is_animating(&self) -> bool {
		self.started_at.is_some()
	}

	/// Displayed diagram angle.
	pub fn diagram_degrees(&self) -> f64 {
		self.current
	}

	/// Local label angle; always cancels the diagram angle.
	pub fn label_degrees(&self) -> f64 {
		-self.current
	}
}

/// Pan/zoom plus rotation over a fixed viewport. Survives layout rebuilds.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
	pub zoom: ZoomTransform,
	pub rotation: RotationTransition,
	viewport: Viewport,
	settings: ViewSettings,
}

impl ViewState {
	pub fn new(viewport: Viewport, settings: ViewSettings, rotation: f64) -> Self {
		Self {
			zoom: ZoomTransform::default(),
			rotation: RotationTransition::new(rotation, settings.rotation_duration_ms),
			viewport,
			settings,
		}
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	/// The full drawing transform for centered layout coordinates.
	pub fn composite(&self) -> Transform {
		let (cx, cy) = self.viewport.center();
		Transform::translation(self.zoom.x, self.zoom.y)
			.then_scale(self.zoom.k, self.zoom.k)
			.then(&rotate(self.rotation.diagram_degrees()))
			.then_translate(Vector::new(cx, cy))
	}

	/// The local transform every label applies on top of its node position.
	pub fn label_transform(&self) -> Transform {
		rotate(self.rotation.label_degrees())
	}

	/// Map a viewport point to layout coordinates.
	pub fn screen_to_layout(&self, sx: f64, sy: f64) -> Option<(f64, f64)> {
		let (cx, cy) = self.viewport.center();
		let layout = self.composite().inverse()?.transform_point(Point::new(sx, sy));
		Some((layout.x + cx, layout.y + cy))
	}

	/// Translate by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		let linear = Transform::scale(self.zoom.k, self.zoom.k)
			.then(&rotate(self.rotation.diagram_degrees()));
		if let Some(inverse) = linear.inverse() {
			let delta = inverse.transform_vector(Vector::new(dx, dy));
			self.zoom.x += delta.x;
			self.zoom.y += delta.y;
		}
	}

	/// Multiply the scale by `factor`, clamped, keeping the layout point under
	/// `(sx, sy)` fixed on screen.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let Some(anchor) = self.screen_to_layout(sx, sy) else {
			return;
		};
		let k = (self.zoom.k * factor).clamp(self.settings.min_scale, self.settings.max_scale);
		if k == self.zoom.k {
			return;
		}
		self.zoom.k = k;
		// re-solve the pan so `anchor` maps back onto the pointer
		let (cx, cy) = self.viewport.center();
		let offset = Vector::new(sx - cx, sy - cy);
		let unrotated = rotate(-self.rotation.diagram_degrees()).transform_vector(offset);
		self.zoom.x = unrotated.x / k - (anchor.0 - cx);
		self.zoom.y = unrotated.y / k - (anchor.1 - cy);
	}

	/// One wheel notch; positive `delta_y` zooms out.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			1.0 / self.settings.wheel_step
		} else {
			self.settings.wheel_step
		};
		self.zoom_at(sx, sy, factor);
	}

	pub fn rotate_to(&mut self, degrees: f64, now_ms: f64) {
		self.rotation.retarget(degrees, now_ms);
	}

	pub fn advance(&mut self, now_ms: f64) -> f64 {
		self.rotation.sample(now_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	fn rotation_of(m: Transform) -> f64 {
		m.m12.atan2(m.m11).to_degrees()
	}

	fn view() -> ViewState {
		ViewState::new(Viewport::default(), ViewSettings::default(), 0.0)
	}

	#[test]
	fn composite_without_rotation_matches_pan_zoom_formula() {
		let mut v = view();
		v.zoom = ZoomTransform {
			x: 10.0,
			y: -20.0,
			k: 2.0,
		};
		let p = v.composite().transform_point(Point::new(5.0, 5.0));
		assert!(close(p.x, 400.0 + 2.0 * 15.0));
		assert!(close(p.y, 250.0 + 2.0 * -15.0));
	}

	#[test]
	fn inverse_round_trips() {
		let mut v = view();
		v.zoom.k = 1.7;
		v.zoom.x = 33.0;
		v.rotate_to(37.0, 0.0);
		v.advance(1000.0);
		let m = v.composite();
		let screen = m.transform_point(Point::new(-120.0, 80.0));
		let back = m.inverse().unwrap().transform_point(screen);
		assert!(close(back.x, -120.0) && close(back.y, 80.0));
	}

	#[test]
	fn rotation_transition_reaches_target() {
		let mut v = view();
		v.rotate_to(90.0, 1000.0);
		assert!(v.rotation.is_animating());
		let mid = v.advance(1150.0);
		assert!(mid > 0.0 && mid < 90.0);
		assert_eq!(v.advance(1300.0), 90.0);
		assert!(!v.rotation.is_animating());
		assert_eq!(v.rotation.diagram_degrees(), 90.0);
		assert_eq!(v.rotation.label_degrees(), -90.0);
		assert!(close(rotation_of(v.composite()), 90.0));
		assert!(close(rotation_of(v.label_transform()), -90.0));
	}

	#[test]
	fn labels_cancel_rotation_during_transition() {
		let mut v = view();
		v.rotate_to(45.0, 0.0);
		for t in [0.0, 40.0, 120.0, 250.0, 299.0, 300.0, 600.0] {
			v.advance(t);
			let sum = v.rotation.diagram_degrees() + v.rotation.label_degrees();
			assert_eq!(sum, 0.0);
			let net = v.label_transform().then(&v.composite());
			assert!(close(net.m12, 0.0) && close(net.m21, 0.0));
		}
		assert_eq!(v.rotation.label_degrees(), -45.0);
	}

	#[test]
	fn retarget_mid_flight_starts_from_displayed_angle() {
		let mut v = view();
		v.rotate_to(90.0, 0.0);
		let shown = v.advance(150.0);
		v.rotate_to(0.0, 150.0);
		assert_eq!(v.advance(150.0), shown);
		assert_eq!(v.advance(450.0), 0.0);
	}

	#[test]
	fn zoom_is_clamped_and_anchored() {
		let mut v = view();
		let before = v.screen_to_layout(600.0, 100.0).unwrap();
		for _ in 0..50 {
			v.wheel(600.0, 100.0, -1.0);
		}
		assert_eq!(v.zoom.k, 3.0);
		let after = v.screen_to_layout(600.0, 100.0).unwrap();
		assert!(close(before.0, after.0) && close(before.1, after.1));
		for _ in 0..50 {
			v.wheel(600.0, 100.0, 1.0);
		}
		assert_eq!(v.zoom.k, 0.5);
	}

	#[test]
	fn pan_follows_pointer_under_rotation() {
		let mut v = view();
		v.rotate_to(90.0, 0.0);
		v.advance(300.0);
		v.zoom.k = 2.0;
		let before = v.composite().transform_point(Point::origin());
		v.pan_by(30.0, -10.0);
		let after = v.composite().transform_point(Point::origin());
		assert!(close(after.x - before.x, 30.0));
		assert!(close(after.y - before.y, -10.0));
	}
}
