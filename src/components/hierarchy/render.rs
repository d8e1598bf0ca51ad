use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::layout::{PathCommand, TreeLayout};
use super::viewport::Viewport;

const BACKGROUND: &str = "#FAFAFC";
const GRID_DOT: &str = "#E5E5E5";
const GRID_GAP: f64 = 16.0;
const GRID_DOT_RADIUS: f64 = 1.0;
const CONNECTOR: &str = "#561CCE";
const CONNECTOR_WIDTH: f64 = 2.0;

/// Paint the background grid and every connector under the card layer.
pub fn render(
	layout: &TreeLayout,
	viewport: &Viewport,
	width: f64,
	height: f64,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	draw_grid(viewport, width, height, ctx);

	ctx.save();
	let _ = ctx.translate(viewport.x, viewport.y);
	let _ = ctx.scale(viewport.k, viewport.k);
	draw_connectors(layout, ctx);
	ctx.restore();
}

/// Screen-space dots that scroll with the pan offset and spread with zoom.
fn draw_grid(viewport: &Viewport, width: f64, height: f64, ctx: &CanvasRenderingContext2d) {
	let gap = GRID_GAP * viewport.k;
	if gap < 4.0 {
		return;
	}
	let (ox, oy) = (viewport.x.rem_euclid(gap), viewport.y.rem_euclid(gap));
	ctx.set_fill_style_str(GRID_DOT);
	ctx.begin_path();
	let mut y = oy;
	while y < height {
		let mut x = ox;
		while x < width {
			ctx.move_to(x + GRID_DOT_RADIUS, y);
			let _ = ctx.arc(x, y, GRID_DOT_RADIUS, 0.0, 2.0 * PI);
			x += gap;
		}
		y += gap;
	}
	ctx.fill();
}

fn draw_connectors(layout: &TreeLayout, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(CONNECTOR);
	ctx.set_line_width(CONNECTOR_WIDTH);
	ctx.set_line_cap("round");
	ctx.set_line_join("round");

	for connector in &layout.connectors {
		ctx.begin_path();
		for cmd in &connector.path {
			match *cmd {
				PathCommand::MoveTo(p) => ctx.move_to(p.x, p.y),
				PathCommand::LineTo(p) => ctx.line_to(p.x, p.y),
				PathCommand::QuadTo { ctrl, to } => ctx.quadratic_curve_to(ctrl.x, ctrl.y, to.x, to.y),
			}
		}
		ctx.stroke();
	}
}
