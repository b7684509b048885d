//! Browser entry point: sets up logging and mounts the knowledge graph app.

// used by the library target only
use {
	console_error_panic_hook as _, console_log as _, leptos_meta as _, leptos_router as _, log as _,
	serde as _, serde_json as _, thiserror as _, wasm_bindgen as _, web_sys as _,
};

use knowledge_graph_canvas::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App);
}
