use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::GraphSurface;
use super::style::evidence_color;
use super::transform::ViewState;
use super::types::{ViewSettings, Viewport};
use crate::model::{Edge, Evidence, NodeGroup};

type SharedSurface = Rc<RefCell<Option<GraphSurface>>>;

/// Repaints the shared surface on every animation frame until stopped.
#[derive(Default)]
struct FrameLoop {
	callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
	fn start(
		surface: SharedSurface,
		ctx: CanvasRenderingContext2d,
		mounted: Arc<AtomicBool>,
	) -> Self {
		let frame_loop = Self::default();
		let (callback, pending) = (frame_loop.callback.clone(), frame_loop.pending.clone());
		*frame_loop.callback.borrow_mut() = Some(Closure::new(move || {
			pending.set(None);
			if !mounted.load(Ordering::Relaxed) {
				if let Some(mut s) = surface.borrow_mut().take() {
					s.simulation.stop();
				}
				return;
			}
			if let Some(ref mut s) = *surface.borrow_mut() {
				s.advance(js_sys::Date::now());
				if let Err(err) = render::render(s, &ctx) {
					error!("render failed: {err:?}");
				}
			}
			if let Some(ref cb) = *callback.borrow() {
				pending.set(request_frame(cb));
			}
		}));
		if let Some(ref cb) = *frame_loop.callback.borrow() {
			frame_loop.pending.set(request_frame(cb));
		}
		frame_loop
	}

	fn stop(&self) {
		if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.callback.borrow_mut().take();
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		self.stop();
	}
}

fn request_frame(cb: &Closure<dyn FnMut()>) -> Option<i32> {
	web_sys::window()?
		.request_animation_frame(cb.as_ref().unchecked_ref())
		.ok()
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
	canvas
		.get_context("2d")?
		.ok_or_else(|| JsValue::from_str("2d context unavailable"))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(JsValue::from)
}

/// Force-directed bipartite diagram on a canvas.
///
/// Any change to the groups, edges or rotation stops the running layout and
/// builds a new one. Pan, zoom and the displayed rotation carry over so the
/// rotation animates from where it was.
#[component]
pub fn BipartiteGraph(
	#[prop(into)] group_a: Signal<NodeGroup>,
	#[prop(into)] group_b: Signal<NodeGroup>,
	#[prop(into)] edges: Signal<Vec<Edge>>,
	#[prop(into)] rotation: Signal<f64>,
	#[prop(default = Viewport::default())] viewport: Viewport,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let surface: SharedSurface = Rc::new(RefCell::new(None));
	let mounted = Arc::new(AtomicBool::new(true));
	let surface_init = surface.clone();
	let mounted_init = mounted.clone();

	on_cleanup(move || mounted.store(false, Ordering::Relaxed));

	Effect::new(move |previous: Option<FrameLoop>| {
		let (a, b, e, r) = (group_a.get(), group_b.get(), edges.get(), rotation.get());
		if let Some(previous) = previous {
			previous.stop();
		}
		let Some(canvas) = canvas_ref.get() else {
			return FrameLoop::default();
		};
		let canvas: HtmlCanvasElement = canvas.into();
		canvas.set_width(viewport.width as u32);
		canvas.set_height(viewport.height as u32);
		let ctx = match context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(err) => {
				error!("canvas has no 2d context: {err:?}");
				return FrameLoop::default();
			}
		};

		{
			let mut current = surface_init.borrow_mut();
			match current.as_mut() {
				Some(surface) => drop(surface.rebuild(&a, &b, &e)),
				None => {
					let view = ViewState::new(viewport, ViewSettings::default(), 0.0);
					*current = Some(GraphSurface::new(&a, &b, &e, view));
				}
			}
			if let Some(surface) = current.as_mut() {
				surface.view.rotate_to(r, js_sys::Date::now());
			}
		}
		debug!(
			"rebuilt layout: {} x {} nodes, {} edges, rotation {r}",
			a.count,
			b.count,
			e.len()
		);
		FrameLoop::start(surface_init.clone(), ctx, mounted_init.clone())
	});

	// viewport units from a client position; CSS may scale the canvas
	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		if rect.width() <= 0.0 || rect.height() <= 0.0 {
			return None;
		}
		Some((
			(ev.client_x() as f64 - rect.left()) * viewport.width / rect.width(),
			(ev.client_y() as f64 - rect.top()) * viewport.height / rect.height(),
		))
	};

	let state_md = surface.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = surface.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = surface.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
		}
	};

	let state_ml = surface.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_up();
		}
	};

	let state_wh = surface.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = pointer(mouse) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<div class="bipartite-graph">
			<canvas
				node_ref=canvas_ref
				class="bipartite-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; width: 100%; cursor: grab;"
			/>
			<Legend />
		</div>
	}
}

#[component]
fn Legend() -> impl IntoView {
	let entries = Evidence::ALL
		.into_iter()
		.rev()
		.map(|evidence| {
			view! {
				<div class="legend-entry">
					<span
						class="legend-swatch"
						style:background-color=evidence_color(evidence)
					></span>
					<span>{evidence.label()}</span>
				</div>
			}
		})
		.collect_view();

	view! { <div class="graph-legend">{entries}</div> }
}
