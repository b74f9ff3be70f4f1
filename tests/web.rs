//! Browser-side tests for the DOM-bound behavior: element reconciliation,
//! click dispatch, the svg width measurement fallback, and component
//! teardown.

#![cfg(target_arch = "wasm32")]
// Test target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use graph_viz::components::graph_viz::binder;
use graph_viz::components::graph_viz::state::{GraphVizState, StateHandle};
use graph_viz::{GraphData, GraphLink, GraphNode, GraphViz, Interactions, SimulationConfig};
use leptos::mount::mount_to;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::Element;

wasm_bindgen_test_configure!(run_in_browser);

fn node(id: &str, entity: &str) -> GraphNode {
	GraphNode {
		id: id.into(),
		entity: entity.into(),
		icon: None,
		x: Some(100.0),
		y: Some(100.0),
	}
}

fn link(id: &str, source: &str, target: &str) -> GraphLink {
	GraphLink {
		id: id.into(),
		source: source.into(),
		target: target.into(),
		source_entity: "service".into(),
		target_entity: "service".into(),
	}
}

/// Mount a fresh svg surface inside a sized container on the test page.
fn mount_svg(container_width: &str) -> Element {
	let document = web_sys::window().unwrap().document().unwrap();
	let parent = document.create_element("div").unwrap();
	parent
		.set_attribute("style", &format!("width: {container_width}"))
		.unwrap();
	let svg = document
		.create_element_ns(Some(binder::SVG_NS), "svg")
		.unwrap();
	parent.append_child(&svg).unwrap();
	document.body().unwrap().append_child(&parent).unwrap();
	svg
}

fn mount_state(interactions: Interactions) -> StateHandle {
	let svg = mount_svg("500px");
	let state = GraphVizState::new(svg, 350.0, SimulationConfig::default(), interactions);
	Rc::new(RefCell::new(Some(state)))
}

fn run_layout(handle: &StateHandle, data: &GraphData) {
	let inner = handle.clone();
	if let Some(ref mut s) = *inner.borrow_mut() {
		s.run_layout(data, handle);
	}
}

#[wasm_bindgen_test]
fn layout_binds_one_element_per_identifier() {
	let handle = mount_state(Interactions::default());
	let data = GraphData {
		nodes: vec![node("a", "service"), node("b", "database"), node("c", "service")],
		links: vec![link("a-b", "a", "b"), link("b-c", "b", "c")],
	};
	run_layout(&handle, &data);

	let state = handle.borrow();
	let state = state.as_ref().unwrap();
	assert_eq!(state.node_element_count(), 3);
	assert_eq!(state.link_element_count(), 2);
	for id in ["a", "b", "c"] {
		let group = state.node_element(id).unwrap();
		assert!(group.is_connected());
		assert_eq!(
			group.get_attribute("class").unwrap(),
			format!(
				"g-node g-node--{}",
				if id == "b" { "database" } else { "service" }
			)
		);
	}
}

#[wasm_bindgen_test]
fn removing_a_link_removes_exactly_its_element() {
	let handle = mount_state(Interactions::default());
	let full = GraphData {
		nodes: vec![node("a", "service"), node("b", "service"), node("c", "service")],
		links: vec![link("l1", "a", "b"), link("l2", "b", "c"), link("l3", "a", "c")],
	};
	run_layout(&handle, &full);
	let removed = handle
		.borrow()
		.as_ref()
		.unwrap()
		.link_element("l2")
		.unwrap();

	let trimmed = GraphData {
		links: vec![link("l1", "a", "b"), link("l3", "a", "c")],
		..full
	};
	run_layout(&handle, &trimmed);

	let state = handle.borrow();
	let state = state.as_ref().unwrap();
	assert!(!removed.is_connected());
	assert!(state.link_element("l2").is_none());
	assert!(state.link_element("l1").unwrap().is_connected());
	assert!(state.link_element("l3").unwrap().is_connected());
	assert_eq!(state.node_element_count(), 3);
}

#[wasm_bindgen_test]
fn click_dispatches_the_callback_once_with_the_bound_node() {
	let owner = Owner::new();
	owner.set();

	// Callbacks must be Send + Sync, so the log lives behind a mutex.
	let clicks: Arc<Mutex<Vec<GraphNode>>> = Arc::new(Mutex::new(Vec::new()));
	let seen = clicks.clone();
	let interactions = Interactions {
		on_click: Some(Callback::new(move |n: GraphNode| {
			seen.lock().unwrap().push(n);
		})),
		..Interactions::default()
	};
	let handle = mount_state(interactions);
	let data = GraphData {
		nodes: vec![node("n1", "service"), node("n2", "service")],
		links: Vec::new(),
	};
	run_layout(&handle, &data);

	let group = handle.borrow().as_ref().unwrap().node_element("n1").unwrap();
	let event = web_sys::MouseEvent::new("click").unwrap();
	group.dispatch_event(&event).unwrap();

	let clicks = clicks.lock().unwrap();
	assert_eq!(clicks.len(), 1);
	assert_eq!(clicks[0].id, "n1");
	assert_eq!(clicks[0].entity, "service");
}

/// Resolve once the browser has delivered the next animation frame.
async fn next_frame() {
	let promise = js_sys::Promise::new(&mut |resolve, _reject| {
		web_sys::window()
			.unwrap()
			.request_animation_frame(&resolve)
			.unwrap();
	});
	JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
async fn unmount_stops_ticks_and_resize_recomputes() {
	let owner = Owner::new();
	owner.set();

	let document = web_sys::window().unwrap().document().unwrap();
	let host = document.create_element("div").unwrap();
	host.set_attribute("style", "width: 500px").unwrap();
	document.body().unwrap().append_child(&host).unwrap();

	let (data, _set_data) = signal(Some(GraphData {
		nodes: vec![node("a", "service"), node("b", "service")],
		links: vec![link("a-b", "a", "b")],
	}));
	let host_el: web_sys::HtmlElement = host.clone().dyn_into().unwrap();
	let mounted = mount_to(host_el, move || view! { <GraphViz data=data /> });

	// Let the animation loop write at least one frame of transforms.
	next_frame().await;
	next_frame().await;
	let group = host.query_selector(".g-node").unwrap().unwrap();
	assert!(group.get_attribute("transform").is_some());

	drop(mounted);
	assert!(host.query_selector("svg").unwrap().is_none());
	let frozen = group.get_attribute("transform");

	// The simulation is still far from settled at this point, so a live
	// animation loop or resize handler would keep rewriting the transform.
	let resize = web_sys::Event::new("resize").unwrap();
	web_sys::window().unwrap().dispatch_event(&resize).unwrap();
	next_frame().await;
	next_frame().await;

	assert_eq!(group.get_attribute("transform"), frozen);
}

#[wasm_bindgen_test]
fn zero_width_svg_falls_back_to_parent_width() {
	let svg = mount_svg("240px");
	// Hidden svg reports zero clientWidth, like svg elements in Firefox.
	svg.set_attribute("style", "display: none").unwrap();
	assert_eq!(svg.client_width(), 0);
	assert_eq!(binder::measure_width(&svg), 240.0);
}
