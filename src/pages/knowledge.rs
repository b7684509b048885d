use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::knowledge_graph::{Entry, GraphError, KnowledgeGraph, parse_entries};

/// Response body of the `KnowledgePage` query, bundled with the app.
const KNOWLEDGE_PAGE: &str = include_str!("../../data/knowledge.json");

fn load_entries() -> Result<Vec<Entry>, GraphError> {
	let entries = parse_entries(KNOWLEDGE_PAGE)?;
	log::debug!("loaded {} knowledge entries", entries.len());
	Ok(entries)
}

/// Full-screen knowledge graph. `?highlight=<id>` marks an entry and
/// `?orphans=true` draws link targets that have no entry of their own.
#[component]
pub fn Knowledge() -> impl IntoView {
	let query = use_query_map();
	let (highlighted, show_orphans) = query.with_untracked(|q| {
		(
			q.get("highlight"),
			q.get("orphans").is_some_and(|v| v == "true" || v == "1"),
		)
	});

	let graph = load_entries().map(|entries| {
		view! {
			<KnowledgeGraph
				entries=Signal::stored(entries)
				highlighted_entry_id=highlighted
				show_orphans=show_orphans
				fullscreen=true
			/>
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<div class="graph-error">
					<h1>"The knowledge graph could not be loaded"</h1>
					<ul>
						{move || {
							errors
								.get()
								.into_iter()
								.map(|(_, e)| view! { <li>{e.to_string()}</li> })
								.collect_view()
						}}
					</ul>
				</div>
			}
		}>
			<div class="fullscreen-graph">{graph}</div>
		</ErrorBoundary>
	}
}
