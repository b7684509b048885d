use super::build::Node;
use super::interaction::{LinkFocus, NodeFocus, NodeVisual};

/// Category fills. Later entries win when a node carries several tags.
pub const TAG_COLORS: &[(&str, &str)] = &[
	("person", "rgb(233, 100, 166)"),
	("day", "rgb(123, 159, 216)"),
	("week", "rgb(65, 101, 210)"),
	("month", "rgb(16, 39, 113)"),
];

pub const NODE_FADED_OPACITY: f64 = 0.15;
pub const LINK_OPACITY: f64 = 0.5;
pub const LINK_FADED_OPACITY: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
	Light,
	Dark,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
	pub background: &'static str,
	pub default_fill: &'static str,
	pub node_focused_fill: &'static str,
	pub node_highlighted_fill: &'static str,
	pub label_fill: &'static str,
	pub label_focused_fill: &'static str,
	pub link_stroke: &'static str,
	pub link_focused_stroke: &'static str,
	pub link_focused_opacity: f64,
}

impl Theme {
	pub const LIGHT: Theme = Theme {
		background: "#ffffff",
		default_fill: "#2d3748",
		node_focused_fill: "#805ad5",
		node_highlighted_fill: "#ecc94b",
		label_fill: "#4a5568",
		label_focused_fill: "#1a202c",
		link_stroke: "#cbd5e0",
		link_focused_stroke: "#b794f4",
		link_focused_opacity: 1.0,
	};

	pub const DARK: Theme = Theme {
		background: "#1a202c",
		default_fill: "#cbd5e0",
		node_focused_fill: "#b794f4",
		node_highlighted_fill: "#ecc94b",
		label_fill: "#a0aec0",
		label_focused_fill: "#e2e8f0",
		link_stroke: "#4a5568",
		link_focused_stroke: "#b794f4",
		link_focused_opacity: 0.5,
	};

	pub fn for_mode(mode: ColorMode) -> Self {
		match mode {
			ColorMode::Light => Self::LIGHT,
			ColorMode::Dark => Self::DARK,
		}
	}

	pub fn node_fill(&self, node: &Node, visual: NodeVisual) -> &'static str {
		if is_focused(visual.focus) {
			return self.node_focused_fill;
		}
		if visual.highlighted {
			return self.node_highlighted_fill;
		}
		TAG_COLORS
			.iter()
			.rev()
			.find(|(tag, _)| node.tags.iter().any(|t| t == tag))
			.map(|&(_, color)| color)
			.unwrap_or(self.default_fill)
	}

	pub fn label_fill(&self, visual: NodeVisual) -> &'static str {
		if is_focused(visual.focus) {
			self.label_focused_fill
		} else {
			self.label_fill
		}
	}

	pub fn link_stroke(&self, focus: LinkFocus) -> &'static str {
		match focus {
			LinkFocus::Focused => self.link_focused_stroke,
			_ => self.link_stroke,
		}
	}

	pub fn link_opacity(&self, focus: LinkFocus) -> f64 {
		match focus {
			LinkFocus::Idle => LINK_OPACITY,
			LinkFocus::Focused => self.link_focused_opacity,
			LinkFocus::Faded => LINK_FADED_OPACITY,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::LIGHT
	}
}

/// Opacity a node should ease toward.
pub fn node_opacity(visual: NodeVisual) -> f64 {
	match visual.focus {
		NodeFocus::Faded => NODE_FADED_OPACITY,
		_ => 1.0,
	}
}

// the dragged node keeps its hover styling
fn is_focused(focus: NodeFocus) -> bool {
	matches!(focus, NodeFocus::Focused | NodeFocus::Dragging)
}
