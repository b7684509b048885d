use std::collections::HashMap;

use super::types::{Entry, EntryLinks, GraphConfig};

pub const MIN_RADIUS: f64 = 4.0;
pub const HIGHLIGHT_RADIUS: f64 = 12.0;
const HIGHLIGHT_THRESHOLD: f64 = 10.0;
const RADIUS_PER_LINK: f64 = 0.25;

/// Layout-side view of an entry. Simulation state lives in the simulation arena
/// at the same index.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub tags: Vec<String>,
	pub links: EntryLinks,
	pub radius: f64,
}

/// Directed edge between two arena indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link {
	pub source: usize,
	pub target: usize,
}

#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	pub nodes: Vec<Node>,
	pub links: Vec<Link>,
	pub highlighted: Option<usize>,
}

/// Radius from link counts, boosted for the highlighted entry.
pub fn node_radius(entry: Option<&Entry>, highlighted: Option<&str>) -> f64 {
	let count = entry.map(Entry::link_count).unwrap_or(0);
	let radius = count as f64 * RADIUS_PER_LINK + MIN_RADIUS;
	match (entry, highlighted) {
		(Some(e), Some(h)) if e.id == h && radius < HIGHLIGHT_THRESHOLD => HIGHLIGHT_RADIUS,
		_ => radius,
	}
}

impl GraphModel {
	pub fn build(entries: &[Entry], config: &GraphConfig) -> Self {
		let highlighted = config.highlighted_entry_id.as_deref();
		let mut nodes: Vec<Node> = Vec::with_capacity(entries.len());
		let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(entries.len());

		for entry in entries {
			let node = Node {
				id: entry.id.clone(),
				tags: entry.tags.clone(),
				links: entry.links.clone().unwrap_or_default(),
				radius: node_radius(Some(entry), highlighted),
			};
			match by_id.get(entry.id.as_str()) {
				Some(&idx) => nodes[idx] = node,
				None => {
					by_id.insert(entry.id.as_str(), nodes.len());
					nodes.push(node);
				}
			}
		}

		let mut links = Vec::new();
		for entry in entries {
			let Some(&source) = by_id.get(entry.id.as_str()) else {
				continue;
			};
			for linked in entry.outgoing() {
				let target = match by_id.get(linked.id.as_str()) {
					Some(&idx) => idx,
					None if config.show_orphans => {
						nodes.push(Node {
							id: linked.id.clone(),
							tags: Vec::new(),
							links: EntryLinks::default(),
							radius: node_radius(None, highlighted),
						});
						by_id.insert(linked.id.as_str(), nodes.len() - 1);
						nodes.len() - 1
					}
					None => continue,
				};
				links.push(Link { source, target });
			}
		}

		let highlighted = highlighted.and_then(|id| by_id.get(id).copied());
		log::debug!(
			"built knowledge graph: {} nodes, {} links",
			nodes.len(),
			links.len()
		);
		Self {
			nodes,
			links,
			highlighted,
		}
	}

	/// Whether `a` and `b` are one hop apart according to either node's link lists.
	pub fn adjacent(&self, a: usize, b: usize) -> bool {
		let (na, nb) = (&self.nodes[a], &self.nodes[b]);
		na.links.references(&nb.id) || nb.links.references(&na.id)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	fn ab() -> Vec<Entry> {
		vec![
			Entry::new("a").with_outgoing(["b"]),
			Entry::new("b").with_incoming(["a"]),
		]
	}

	fn pairs(model: &GraphModel) -> HashSet<(String, String)> {
		model
			.links
			.iter()
			.map(|l| {
				(
					model.nodes[l.source].id.clone(),
					model.nodes[l.target].id.clone(),
				)
			})
			.collect()
	}

	#[test]
	fn two_linked_entries() {
		let model = GraphModel::build(&ab(), &GraphConfig::default());
		assert_eq!(model.nodes.len(), 2);
		assert_eq!(model.nodes[0].radius, 4.25);
		assert_eq!(model.nodes[1].radius, 4.25);
		assert_eq!(model.links, vec![Link {
			source: 0,
			target: 1
		}]);
	}

	#[test]
	fn missing_target_is_dropped() {
		let entries = vec![Entry::new("a").with_outgoing(["b"])];
		let model = GraphModel::build(&entries, &GraphConfig::default());
		assert_eq!(model.nodes.len(), 1);
		// the outgoing reference still counts toward the radius
		assert_eq!(model.nodes[0].radius, 4.25);
		assert!(model.links.is_empty());
	}

	#[test]
	fn missing_target_without_links_object() {
		let entries = vec![Entry {
			id: "a".into(),
			tags: vec![],
			links: None,
		}];
		let model = GraphModel::build(&entries, &GraphConfig::default());
		assert_eq!(model.nodes[0].radius, 4.0);
		assert!(model.links.is_empty());
	}

	#[test]
	fn orphans_are_synthesized_once() {
		let entries = vec![
			Entry::new("a").with_outgoing(["b"]),
			Entry::new("c").with_outgoing(["b", "d"]),
		];
		let config = GraphConfig {
			show_orphans: true,
			..Default::default()
		};
		let model = GraphModel::build(&entries, &config);
		let ids: Vec<_> = model.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["a", "c", "b", "d"]);
		assert_eq!(model.links.len(), 3);
		let orphan = &model.nodes[2];
		assert!(orphan.tags.is_empty());
		assert_eq!(orphan.radius, MIN_RADIUS);
	}

	#[test]
	fn orphan_scenario_matches_single_entry() {
		let entries = vec![Entry::new("a").with_outgoing(["b"])];
		let config = GraphConfig {
			show_orphans: true,
			..Default::default()
		};
		let model = GraphModel::build(&entries, &config);
		assert_eq!(model.nodes.len(), 2);
		assert_eq!(model.nodes[1].id, "b");
		assert_eq!(model.nodes[1].radius, 4.0);
		assert_eq!(pairs(&model), HashSet::from([("a".into(), "b".into())]));
	}

	#[test]
	fn highlighted_radius_is_boosted() {
		let config = GraphConfig {
			highlighted_entry_id: Some("a".into()),
			..Default::default()
		};
		let model = GraphModel::build(&ab(), &config);
		assert_eq!(model.nodes[0].radius, HIGHLIGHT_RADIUS);
		assert_eq!(model.nodes[1].radius, 4.25);
		assert_eq!(model.highlighted, Some(0));
	}

	#[test]
	fn large_highlighted_radius_is_kept() {
		let many: Vec<String> = (0..30).map(|i| format!("n{i}")).collect();
		let entries = vec![Entry::new("hub").with_outgoing(many)];
		let config = GraphConfig {
			highlighted_entry_id: Some("hub".into()),
			..Default::default()
		};
		let model = GraphModel::build(&entries, &config);
		assert_eq!(model.nodes[0].radius, 30.0 * 0.25 + 4.0);
	}

	fn highlighted_hub(references: usize) -> f64 {
		let targets: Vec<String> = (0..references).map(|i| format!("n{i}")).collect();
		let entries = vec![Entry::new("hub").with_outgoing(targets)];
		let config = GraphConfig {
			highlighted_entry_id: Some("hub".into()),
			..Default::default()
		};
		GraphModel::build(&entries, &config).nodes[0].radius
	}

	#[test]
	fn highlight_boost_applies_only_below_ten() {
		// 9.75 is raised
		assert_eq!(highlighted_hub(23), HIGHLIGHT_RADIUS);
		// exactly 10 is kept, so highlighted radii between 10 and 12 exist
		assert_eq!(highlighted_hub(24), 10.0);
		assert_eq!(highlighted_hub(31), 11.75);
		assert_eq!(highlighted_hub(32), 12.0);
	}

	#[test]
	fn unknown_highlight_is_inert() {
		let config = GraphConfig {
			highlighted_entry_id: Some("zzz".into()),
			..Default::default()
		};
		let model = GraphModel::build(&ab(), &config);
		assert_eq!(model.highlighted, None);
		assert!(model.nodes.iter().all(|n| n.radius == 4.25));
	}

	#[test]
	fn radius_never_below_minimum() {
		let entries: Vec<Entry> = (0..20)
			.map(|i| {
				Entry::new(format!("e{i}"))
					.with_outgoing((0..i % 5).map(|j| format!("e{j}")))
			})
			.collect();
		let config = GraphConfig {
			show_orphans: true,
			..Default::default()
		};
		let model = GraphModel::build(&entries, &config);
		assert!(model.nodes.iter().all(|n| n.radius >= MIN_RADIUS));
	}

	#[test]
	fn link_count_matches_resolvable_references() {
		let entries = vec![
			Entry::new("a").with_outgoing(["b", "x", "c"]),
			Entry::new("b").with_outgoing(["a", "y"]),
			Entry::new("c"),
		];
		let model = GraphModel::build(&entries, &GraphConfig::default());
		assert_eq!(model.links.len(), 3);
	}

	#[test]
	fn build_is_idempotent() {
		let entries = ab();
		let first = GraphModel::build(&entries, &GraphConfig::default());
		let second = GraphModel::build(&entries, &GraphConfig::default());
		let ids = |m: &GraphModel| m.nodes.iter().map(|n| n.id.clone()).collect::<HashSet<_>>();
		assert_eq!(ids(&first), ids(&second));
		assert_eq!(pairs(&first), pairs(&second));
	}

	#[test]
	fn duplicate_ids_share_one_node() {
		let entries = vec![
			Entry::new("a"),
			Entry::new("a").with_tags(["person"]),
		];
		let model = GraphModel::build(&entries, &GraphConfig::default());
		assert_eq!(model.nodes.len(), 1);
		assert_eq!(model.nodes[0].tags, vec!["person".to_string()]);
	}

	#[test]
	fn empty_entries() {
		let model = GraphModel::build(&[], &GraphConfig::default());
		assert!(model.nodes.is_empty());
		assert!(model.links.is_empty());
	}

	#[test]
	fn adjacency_uses_both_lists() {
		let entries = vec![
			Entry::new("a").with_outgoing(["b"]),
			Entry::new("b"),
			Entry::new("c").with_incoming(["a"]),
			Entry::new("d"),
		];
		let model = GraphModel::build(&entries, &GraphConfig::default());
		assert!(model.adjacent(0, 1));
		assert!(model.adjacent(1, 0));
		assert!(model.adjacent(0, 2));
		assert!(!model.adjacent(0, 3));
		assert!(!model.adjacent(1, 2));
	}
}
