//! Pointer interaction: hover focus, neighbourhood fading and drag pinning.
//!
//! Visual state is never toggled directly by handlers. Handlers only update
//! [`Interaction`]; [`compute_visuals`] derives the per-node and per-link state
//! from it, and [`diff`] reports what changed since the previous frame.

use super::build::GraphModel;
use super::simulation::Simulation;

pub const DRAG_ALPHA_TARGET: f64 = 0.3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeFocus {
	#[default]
	Idle,
	Focused,
	Faded,
	Dragging,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkFocus {
	#[default]
	Idle,
	Focused,
	Faded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeVisual {
	pub focus: NodeFocus,
	pub highlighted: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Visuals {
	pub nodes: Vec<NodeVisual>,
	pub links: Vec<LinkFocus>,
}

/// Indices whose visual state differs between two frames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisualDiff {
	pub nodes: Vec<usize>,
	pub links: Vec<usize>,
}

impl VisualDiff {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty()
	}
}

#[derive(Clone, Debug, Default)]
pub struct Interaction {
	hovered: Option<usize>,
	dragging: Option<usize>,
}

impl Interaction {
	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	pub fn is_dragging(&self) -> bool {
		self.dragging.is_some()
	}

	/// Move hover to `target`, emitting enter/leave as needed. Ignored mid-drag.
	/// Returns whether hover changed.
	pub fn hover(&mut self, target: Option<usize>) -> bool {
		if self.is_dragging() || self.hovered == target {
			return false;
		}
		self.hovered = target;
		true
	}

	pub fn pointer_enter(&mut self, idx: usize) -> bool {
		self.hover(Some(idx))
	}

	pub fn pointer_leave(&mut self) -> bool {
		self.hover(None)
	}

	/// Begin dragging `idx`, pinning it where it currently sits.
	pub fn drag_start(&mut self, idx: usize, sim: &mut Simulation) {
		let Some(node) = sim.nodes.get(idx) else {
			return;
		};
		let (x, y) = (node.x, node.y);
		if self.dragging.replace(idx).is_none() {
			sim.set_alpha_target(DRAG_ALPHA_TARGET);
			sim.restart();
		}
		sim.pin(idx, x, y);
		log::debug!("drag start on node {idx}");
	}

	/// Pin the dragged node at the pointer's layout coordinates.
	pub fn drag_move(&mut self, x: f64, y: f64, sim: &mut Simulation) {
		if let Some(idx) = self.dragging {
			sim.pin(idx, x, y);
		}
	}

	pub fn drag_end(&mut self, sim: &mut Simulation) {
		let Some(idx) = self.dragging.take() else {
			return;
		};
		sim.unpin(idx);
		sim.set_alpha_target(0.0);
		log::debug!("drag end on node {idx}");
	}
}

/// Derive every node's and link's visual state from the interaction snapshot.
pub fn compute_visuals(model: &GraphModel, interaction: &Interaction) -> Visuals {
	let (hovered, dragging) = (interaction.hovered, interaction.dragging);
	let nodes = (0..model.nodes.len())
		.map(|idx| {
			let focus = if dragging == Some(idx) {
				NodeFocus::Dragging
			} else {
				match hovered {
					None => NodeFocus::Idle,
					Some(h) if h == idx => NodeFocus::Focused,
					Some(h) if model.adjacent(h, idx) => NodeFocus::Idle,
					Some(_) => NodeFocus::Faded,
				}
			};
			NodeVisual {
				focus,
				highlighted: model.highlighted == Some(idx),
			}
		})
		.collect();

	let links = model
		.links
		.iter()
		.map(|link| match hovered {
			None => LinkFocus::Idle,
			Some(h) if link.source == h || link.target == h => LinkFocus::Focused,
			Some(_) => LinkFocus::Faded,
		})
		.collect();

	Visuals { nodes, links }
}

/// Compare two frames. A length change marks everything in `next` as changed.
pub fn diff(prev: &Visuals, next: &Visuals) -> VisualDiff {
	fn changed<T: PartialEq>(prev: &[T], next: &[T]) -> Vec<usize> {
		if prev.len() != next.len() {
			return (0..next.len()).collect();
		}
		prev.iter()
			.zip(next)
			.enumerate()
			.filter(|(_, (a, b))| a != b)
			.map(|(i, _)| i)
			.collect()
	}
	VisualDiff {
		nodes: changed(&prev.nodes, &next.nodes),
		links: changed(&prev.links, &next.links),
	}
}
