use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::error::{GraphError, Result};
use super::render;
use super::state::KnowledgeGraphState;
use super::theme::{ColorMode, Theme};
use super::types::{Entry, GraphConfig};

const DEFAULT_DT: f64 = 0.016;
const MAX_DT: f64 = 0.1;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
type EventCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Shared between the mount effect, the frame loop and the pointer handlers.
#[derive(Clone)]
struct Handles {
	state: Rc<RefCell<Option<KnowledgeGraphState>>>,
	animate: FrameCallback,
	resize_cb: EventCallback,
	last_frame: Rc<Cell<Option<f64>>>,
	unmounted: Arc<AtomicBool>,
}

#[component]
pub fn KnowledgeGraph(
	#[prop(into)] entries: Signal<Vec<Entry>>,
	#[prop(default = None)] highlighted_entry_id: Option<String>,
	#[prop(default = 0.01)] link_force: f64,
	#[prop(default = -50.0)] body_force: f64,
	#[prop(default = false)] show_orphans: bool,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = GraphConfig {
		highlighted_entry_id,
		link_force,
		body_force,
		show_orphans,
	};
	let handles = Handles {
		state: Rc::new(RefCell::new(None)),
		animate: Rc::new(RefCell::new(None)),
		resize_cb: Rc::new(RefCell::new(None)),
		last_frame: Rc::new(Cell::new(None)),
		unmounted: Arc::new(AtomicBool::new(false)),
	};

	let unmounted = handles.unmounted.clone();
	on_cleanup(move || unmounted.store(true, Ordering::Relaxed));

	let handles_init = handles.clone();
	Effect::new(move |_| {
		let entries = entries.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		if let Err(err) = mount(&handles_init, &canvas, &entries, &config, fullscreen) {
			log::error!("knowledge graph mount failed: {err}");
		}
	});

	let state_md = handles.state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
			set_cursor(canvas_ref, s.cursor());
		}
	};

	let state_mm = handles.state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
			set_cursor(canvas_ref, s.cursor());
		}
	};

	let state_mu = handles.state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
			set_cursor(canvas_ref, s.cursor());
		}
	};

	let state_ml = handles.state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
			set_cursor(canvas_ref, s.cursor());
		}
	};

	let state_wh = handles.state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="knowledge-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

/// Build (or rebuild) the graph for `entries` and make sure the frame loop runs.
fn mount(
	handles: &Handles,
	canvas: &HtmlCanvasElement,
	entries: &[Entry],
	config: &GraphConfig,
	fullscreen: bool,
) -> Result<()> {
	let window = web_sys::window().ok_or(GraphError::NoWindow)?;
	let (w, h) = measure(&window, canvas, fullscreen);
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	let ctx = context_2d(canvas)?;

	if let Some(mut previous) = handles.state.borrow_mut().take() {
		previous.teardown();
		render::clear(&ctx, previous.width, previous.height);
		log::debug!("tore down previous knowledge graph");
	}
	*handles.state.borrow_mut() =
		Some(KnowledgeGraphState::new(entries, config, w, h, theme(&window)));
	log::info!("knowledge graph mounted at {w}x{h} with {} entries", entries.len());

	if handles.resize_cb.borrow().is_none() {
		let (state, canvas) = (handles.state.clone(), canvas.clone());
		let cb = Closure::<dyn FnMut()>::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = measure(&win, &canvas, fullscreen);
			canvas.set_width(nw as u32);
			canvas.set_height(nh as u32);
			if let Some(ref mut s) = *state.borrow_mut() {
				s.resize(nw, nh);
			}
		});
		let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		*handles.resize_cb.borrow_mut() = Some(cb);
	}

	if handles.animate.borrow().is_none() {
		let inner = handles.clone();
		let frame = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
			if inner.unmounted.load(Ordering::Relaxed) {
				shutdown(&inner, &ctx);
				return;
			}
			let dt = inner
				.last_frame
				.replace(Some(now))
				.map(|last| ((now - last) / 1000.0).clamp(0.0, MAX_DT))
				.unwrap_or(DEFAULT_DT);
			if let Some(ref mut s) = *inner.state.borrow_mut() {
				if s.frame(dt) {
					render::render(s, &ctx);
				}
			}
			schedule(&inner.animate);
		});
		*handles.animate.borrow_mut() = Some(frame);
		schedule(&handles.animate);
	}
	Ok(())
}

/// Final teardown once the component is gone. Leaves the frame loop unscheduled
/// and releases it once the current frame has returned.
fn shutdown(handles: &Handles, ctx: &CanvasRenderingContext2d) {
	if let Some(mut s) = handles.state.borrow_mut().take() {
		s.teardown();
		render::clear(ctx, s.width, s.height);
	}
	if let (Some(window), Some(cb)) = (web_sys::window(), handles.resize_cb.borrow_mut().take()) {
		let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	}
	// the frame closure owns a clone of `animate`; drop it outside its own call
	let animate = handles.animate.clone();
	leptos::task::spawn_local(async move {
		animate.borrow_mut().take();
	});
	log::info!("knowledge graph unmounted");
}

fn schedule(animate: &FrameCallback) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(cb) = animate.borrow().as_ref() {
		let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
	}
}

fn measure(window: &Window, canvas: &HtmlCanvasElement, fullscreen: bool) -> (f64, f64) {
	let px = |v: std::result::Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
	if fullscreen {
		(
			px(window.inner_width()).unwrap_or(0.0),
			px(window.inner_height()).unwrap_or(0.0),
		)
	} else {
		canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
			.unwrap_or((0.0, 0.0))
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")
		.map_err(|e| GraphError::Canvas(format!("{e:?}")))?
		.ok_or_else(|| GraphError::Canvas("context is null".into()))?
		.dyn_into()
		.map_err(|_| GraphError::Canvas("not a CanvasRenderingContext2d".into()))
}

fn theme(window: &Window) -> Theme {
	let dark = window
		.match_media("(prefers-color-scheme: dark)")
		.ok()
		.flatten()
		.is_some_and(|q| q.matches());
	Theme::for_mode(if dark { ColorMode::Dark } else { ColorMode::Light })
}

fn set_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, cursor: &str) {
	if let Some(canvas) = canvas_ref.get() {
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}
