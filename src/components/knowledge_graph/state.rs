use super::build::GraphModel;
use super::interaction::{self, Interaction, Visuals};
use super::render::Fade;
use super::simulation::{Simulation, SimulationParams};
use super::theme::{self, Theme};
use super::types::{Entry, GraphConfig};

const RESIZE_ALPHA: f64 = 0.3;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Everything one mount of the knowledge graph owns: the built model, its live
/// simulation, pointer state and the eased visuals derived from them.
pub struct KnowledgeGraphState {
	pub model: GraphModel,
	pub sim: Simulation,
	pub interaction: Interaction,
	pub visuals: Visuals,
	pub node_fades: Vec<Fade>,
	pub link_fades: Vec<Fade>,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub theme: Theme,
	pub width: f64,
	pub height: f64,
	dirty: bool,
}

impl KnowledgeGraphState {
	pub fn new(entries: &[Entry], config: &GraphConfig, width: f64, height: f64, theme: Theme) -> Self {
		let model = GraphModel::build(entries, config);
		let sim = Simulation::new(&model, SimulationParams::from_config(config), width, height);
		let interaction = Interaction::default();
		let visuals = interaction::compute_visuals(&model, &interaction);
		let node_fades = visuals
			.nodes
			.iter()
			.map(|&v| Fade::new(theme::node_opacity(v)))
			.collect();
		let link_fades = visuals
			.links
			.iter()
			.map(|&l| Fade::new(theme.link_opacity(l)))
			.collect();

		Self {
			model,
			sim,
			interaction,
			visuals,
			node_fades,
			link_fades,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			theme,
			width,
			height,
			dirty: true,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node whose circle contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.sim
			.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(_, n)| {
				let (dx, dy) = (n.x - gx, n.y - gy);
				dx * dx + dy * dy <= n.radius * n.radius
			})
			.map(|(idx, _)| idx)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.node_at_position(sx, sy) {
			self.interaction.drag_start(idx, &mut self.sim);
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
		self.dirty = true;
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.interaction.is_dragging() {
			let (gx, gy) = self.screen_to_graph(sx, sy);
			self.interaction.drag_move(gx, gy, &mut self.sim);
			return;
		}
		match self.node_at_position(sx, sy) {
			Some(idx) => self.interaction.pointer_enter(idx),
			None => self.interaction.pointer_leave(),
		};
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
			self.dirty = true;
		}
	}

	/// CSS cursor for the current pointer situation.
	pub fn cursor(&self) -> &'static str {
		if self.interaction.is_dragging() || self.pan.active {
			"grabbing"
		} else if self.interaction.hovered().is_some() {
			"pointer"
		} else {
			"grab"
		}
	}

	pub fn pointer_up(&mut self) {
		self.interaction.drag_end(&mut self.sim);
		self.pan.active = false;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.interaction.pointer_leave();
	}

	/// Zoom around a screen point; positive `delta_y` zooms out.
	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.dirty = true;
	}

	/// Advance one animation frame. Returns whether the canvas needs a redraw.
	pub fn frame(&mut self, dt: f64) -> bool {
		let ticked = self.sim.step();

		let next = interaction::compute_visuals(&self.model, &self.interaction);
		let changes = interaction::diff(&self.visuals, &next);
		for &idx in &changes.nodes {
			self.node_fades[idx].retarget(theme::node_opacity(next.nodes[idx]));
		}
		for &idx in &changes.links {
			self.link_fades[idx].retarget(self.theme.link_opacity(next.links[idx]));
		}
		self.visuals = next;

		let mut fading = false;
		for fade in self.node_fades.iter_mut().chain(self.link_fades.iter_mut()) {
			fading |= fade.advance(dt);
		}

		let redraw = self.dirty || ticked || fading || !changes.is_empty();
		self.dirty = false;
		redraw
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.sim.set_center(width, height);
		self.sim.set_alpha(self.sim.alpha().max(RESIZE_ALPHA));
		self.sim.restart();
		self.dirty = true;
	}

	/// Stop the simulation for good. Idempotent.
	pub fn teardown(&mut self) {
		self.sim.stop();
		self.interaction = Interaction::default();
		self.dirty = false;
	}
}
