use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::GraphSurface;
use super::style::{
	BACKGROUND, EDGE_OPACITY, LABEL_FILL, LABEL_FONT, NODE_RADIUS, NODE_STROKE, NODE_STROKE_WIDTH,
	evidence_color, stroke_width,
};

pub fn render(surface: &GraphSurface, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
	let viewport = surface.view.viewport();
	ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);

	ctx.save();
	let m = surface.view.composite();
	ctx.transform(m.m11, m.m12, m.m21, m.m22, m.m31, m.m32)?;
	// layout coordinates are drawn relative to the viewport center
	let (cx, cy) = viewport.center();
	let drawn = draw_edges(surface, ctx, cx, cy).and_then(|_| draw_nodes(surface, ctx, cx, cy));
	ctx.restore();
	drawn
}

fn draw_edges(
	surface: &GraphSurface,
	ctx: &CanvasRenderingContext2d,
	cx: f64,
	cy: f64,
) -> Result<(), JsValue> {
	let nodes = surface.simulation.nodes();
	ctx.set_global_alpha(EDGE_OPACITY);
	for link in surface.simulation.links() {
		let (source, target) = (&nodes[link.source], &nodes[link.target]);
		ctx.set_stroke_style_str(evidence_color(link.evidence));
		ctx.set_line_width(stroke_width(link.weight));
		ctx.begin_path();
		ctx.move_to(source.x - cx, source.y - cy);
		ctx.line_to(target.x - cx, target.y - cy);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
	Ok(())
}

fn draw_nodes(
	surface: &GraphSurface,
	ctx: &CanvasRenderingContext2d,
	cx: f64,
	cy: f64,
) -> Result<(), JsValue> {
	let label = surface.view.label_transform();
	ctx.set_font(LABEL_FONT);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in surface.simulation.nodes() {
		let (x, y) = (node.x - cx, node.y - cy);
		ctx.begin_path();
		ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI)?;
		ctx.set_fill_style_str(surface.color(node.side));
		ctx.fill();
		ctx.set_stroke_style_str(NODE_STROKE);
		ctx.set_line_width(NODE_STROKE_WIDTH);
		ctx.stroke();

		ctx.save();
		ctx.translate(x, y)?;
		ctx.transform(label.m11, label.m12, label.m21, label.m22, label.m31, label.m32)?;
		ctx.set_fill_style_str(LABEL_FILL);
		let drawn = ctx.fill_text(&node.label(), 0.0, 0.0);
		ctx.restore();
		drawn?;
	}
	Ok(())
}
