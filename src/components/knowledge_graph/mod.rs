mod build;
mod component;
mod error;
mod interaction;
mod render;
mod simulation;
mod state;
mod theme;
mod types;

pub use component::KnowledgeGraph;
pub use error::GraphError;
pub use types::{Entry, parse_entries};
