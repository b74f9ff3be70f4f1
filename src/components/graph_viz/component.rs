//! Leptos component wrapping the force-directed graph svg surface.
//!
//! The component owns an `<svg>` element sized by its props. A mount effect
//! measures the surface, builds the view state, starts the animation-frame
//! loop, and wires the optional drag and window-resize handlers. The same
//! effect re-runs the layout transaction whenever the `data` signal yields
//! a new dataset. Cleanup cancels the pending frame and removes the window
//! listener synchronously, so no tick or resize callback survives removal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent, Window};

use super::config::{Interactions, SimulationConfig};
use super::state::{GraphVizState, StateHandle};
use super::types::GraphData;

/// Renders an interactive force-directed graph as svg elements.
///
/// Pass graph data via the reactive `data` signal; `None` means the data is
/// not loaded yet and skips layout. Physics parameters come from `config`,
/// optional behaviors from the `interactions` capability set. Node and link
/// visuals carry `g-node--{entity}` / `g-link--{source}-{target}` classes,
/// so all styling beyond the line stroke flows through CSS and the icon
/// symbol definitions of the embedding page.
#[component]
pub fn GraphViz(
	#[prop(into)] data: Signal<Option<GraphData>>,
	#[prop(default = 500.0)] width: f64,
	#[prop(default = 350.0)] height: f64,
	#[prop(optional)] config: SimulationConfig,
	#[prop(optional)] interactions: Interactions,
) -> impl IntoView {
	let svg_ref = NodeRef::<leptos::svg::Svg>::new();
	let state: StateHandle = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let raf_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let (state_init, animate_init, resize_cb_init, raf_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		raf_id.clone(),
	);

	Effect::new(move |_| {
		// Tracked: re-runs on every accepted data update.
		let graph = data.get();
		let Some(svg) = svg_ref.get() else {
			return;
		};
		let svg: Element = svg.into();

		if state_init.borrow().is_none() {
			let window: Window = web_sys::window().unwrap();
			*state_init.borrow_mut() = Some(GraphVizState::new(
				svg.clone(),
				height,
				config.clone(),
				interactions.clone(),
			));

			if interactions.resize {
				let state_resize = state_init.clone();
				*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
					if let Some(ref mut s) = *state_resize.borrow_mut() {
						s.handle_resize(js_sys::Date::now());
					}
				}));
				if let Some(ref cb) = *resize_cb_init.borrow() {
					let _ = window
						.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			}

			let (state_anim, animate_inner, raf_anim) = (
				state_init.clone(),
				animate_init.clone(),
				raf_init.clone(),
			);
			*animate_init.borrow_mut() = Some(Closure::new(move || {
				if let Some(ref mut s) = *state_anim.borrow_mut() {
					s.step_and_render();
				}
				if let Some(ref cb) = *animate_inner.borrow() {
					if let Ok(id) = web_sys::window()
						.unwrap()
						.request_animation_frame(cb.as_ref().unchecked_ref())
					{
						raf_anim.set(Some(id));
					}
				}
			}));
			if let Some(ref cb) = *animate_init.borrow() {
				if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
					raf_init.set(Some(id));
				}
			}
		}

		// Absent data skips the layout pass.
		if let Some(ref graph) = graph {
			let handle = state_init.clone();
			if let Some(ref mut s) = *state_init.borrow_mut() {
				s.run_layout(graph, &handle);
			}
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = surface_position(svg_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if s.interactions.drag {
				s.drag_start(x, y);
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = surface_position(svg_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.drag_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.drag_end();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag_end();
		}
	};

	// Cleanup closures must be Send; SendWrapper carries the Rc handles
	// across that bound (teardown always runs on the one wasm thread).
	let cleanup = SendWrapper::new({
		let (state_cl, animate_cl, resize_cl, raf_cl) = (state, animate, resize_cb, raf_id);
		move || {
			if let Some(ref mut s) = *state_cl.borrow_mut() {
				s.sim.stop();
			}
			if let Some(id) = raf_cl.take() {
				let _ = web_sys::window().unwrap().cancel_animation_frame(id);
			}
			*animate_cl.borrow_mut() = None;
			let taken = resize_cl.borrow_mut().take();
			if let Some(cb) = taken {
				let _ = web_sys::window()
					.unwrap()
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			// Dropping the state drops the simulation and element bindings.
			*state_cl.borrow_mut() = None;
		}
	});
	on_cleanup(move || cleanup.take()());

	view! {
		<div class="graph-viz">
			<svg
				node_ref=svg_ref
				class="graph-viz__svg"
				width=width
				height=height
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
			/>
		</div>
	}
}

/// Pointer position in surface coordinates.
fn surface_position(svg_ref: NodeRef<leptos::svg::Svg>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let svg = svg_ref.get()?;
	let rect = svg.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}
