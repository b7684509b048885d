use serde::{Deserialize, Deserializer};

use super::error::{GraphError, Result};

/// Reference to another entry by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct EntryRef {
	pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct EntryLinks {
	#[serde(default, deserialize_with = "null_as_default")]
	pub incoming: Vec<EntryRef>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub outgoing: Vec<EntryRef>,
}

impl EntryLinks {
	/// Whether `id` appears in either list.
	pub fn references(&self, id: &str) -> bool {
		self.incoming.iter().chain(&self.outgoing).any(|r| r.id == id)
	}
}

/// A knowledge-base entry as returned by the `KnowledgeGraphEntry` fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Entry {
	pub id: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub tags: Vec<String>,
	#[serde(default)]
	pub links: Option<EntryLinks>,
}

#[cfg(test)]
impl Entry {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			tags: Vec::new(),
			links: Some(EntryLinks::default()),
		}
	}

	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags = tags.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_incoming<I, S>(mut self, ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let links = self.links.get_or_insert_with(EntryLinks::default);
		links
			.incoming
			.extend(ids.into_iter().map(|id| EntryRef { id: id.into() }));
		self
	}

	pub fn with_outgoing<I, S>(mut self, ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let links = self.links.get_or_insert_with(EntryLinks::default);
		links
			.outgoing
			.extend(ids.into_iter().map(|id| EntryRef { id: id.into() }));
		self
	}
}

impl Entry {
	/// Total number of incoming and outgoing references; 0 without a links object.
	pub fn link_count(&self) -> usize {
		self.links
			.as_ref()
			.map(|l| l.incoming.len() + l.outgoing.len())
			.unwrap_or(0)
	}

	pub fn outgoing(&self) -> &[EntryRef] {
		self.links.as_ref().map(|l| l.outgoing.as_slice()).unwrap_or(&[])
	}
}

/// Layout engine inputs besides the entries themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	pub highlighted_entry_id: Option<String>,
	pub link_force: f64,
	pub body_force: f64,
	pub show_orphans: bool,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			highlighted_entry_id: None,
			link_force: 0.01,
			body_force: -50.0,
			show_orphans: false,
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
	Entries(Vec<Entry>),
	Response { data: Option<ResponseData> },
}

#[derive(Deserialize)]
struct ResponseData {
	entries: Option<Vec<Entry>>,
}

/// Parse entries from either a bare JSON array or a GraphQL response body.
pub fn parse_entries(json: &str) -> Result<Vec<Entry>> {
	match serde_json::from_str::<Payload>(json)? {
		Payload::Entries(entries) => Ok(entries),
		Payload::Response { data } => data
			.and_then(|d| d.entries)
			.ok_or(GraphError::MissingEntries),
	}
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + Default,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
