use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::KnowledgeGraphState;

pub const FADE_SECS: f64 = 0.2;
const LINK_WIDTH: f64 = 1.5;
const LABEL_OFFSET: f64 = 15.0;
const LABEL_FONT: &str = "12px sans-serif";

fn ease_in_out_cubic(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// Opacity easing between two values over [`FADE_SECS`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
	from: f64,
	to: f64,
	t: f64,
}

impl Fade {
	pub fn new(value: f64) -> Self {
		Self {
			from: value,
			to: value,
			t: 1.0,
		}
	}

	pub fn value(&self) -> f64 {
		self.from + (self.to - self.from) * ease_in_out_cubic(self.t)
	}

	pub fn retarget(&mut self, to: f64) {
		if to != self.to {
			self.from = self.value();
			self.to = to;
			self.t = 0.0;
		}
	}

	/// Returns whether the fade was still moving.
	pub fn advance(&mut self, dt: f64) -> bool {
		if self.t >= 1.0 {
			return false;
		}
		self.t = (self.t + dt / FADE_SECS).min(1.0);
		true
	}
}

pub fn clear(ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	ctx.clear_rect(0.0, 0.0, width, height);
}

pub fn render(state: &KnowledgeGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(state.theme.background);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	ctx.set_global_alpha(1.0);
}

fn draw_links(state: &KnowledgeGraphState, ctx: &CanvasRenderingContext2d) {
	let nodes = &state.sim.nodes;
	ctx.set_line_width(LINK_WIDTH);
	for (i, link) in state.sim.links().iter().enumerate() {
		let (s, t) = (&nodes[link.source], &nodes[link.target]);
		let focus = state.visuals.links[i];
		ctx.set_global_alpha(state.link_fades[i].value());
		ctx.set_stroke_style_str(state.theme.link_stroke(focus));
		ctx.begin_path();
		ctx.move_to(s.x, s.y);
		ctx.line_to(t.x, t.y);
		ctx.stroke();
	}
}

fn draw_nodes(state: &KnowledgeGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_font(LABEL_FONT);
	ctx.set_text_align("center");
	for (i, node) in state.model.nodes.iter().enumerate() {
		let p = &state.sim.nodes[i];
		let visual = state.visuals.nodes[i];
		ctx.set_global_alpha(state.node_fades[i].value());

		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, node.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(state.theme.node_fill(node, visual));
		ctx.fill();

		// orphans have no display name; the raw id is all there is
		ctx.set_fill_style_str(state.theme.label_fill(visual));
		let _ = ctx.fill_text(&node.id, p.x, p.y + node.radius + LABEL_OFFSET);
	}
}
