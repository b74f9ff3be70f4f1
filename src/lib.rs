//! graph-viz: Interactive force-directed graph visualization.
//!
//! This crate provides a WASM-based Leptos component that renders a
//! node/link dataset as svg elements with physics-based layout, node
//! dragging, and click/hover callbacks.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::graph_viz::{
	GraphData, GraphLink, GraphNode, GraphViz, Interactions, SimulationConfig,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("graph-viz: logging initialized");
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> Option<GraphData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphData>(&json_text) {
		Ok(data) => {
			info!(
				"graph-viz: loaded {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("graph-viz: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads graph data from the DOM and renders the force-directed graph.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	// Load graph data from the DOM
	let (data, _set_data) = signal(load_graph_data());
	let interactions = Interactions {
		on_click: Some(Callback::new(|node: GraphNode| {
			info!("graph-viz: clicked {}", node.id);
		})),
		..Interactions::default()
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Graph Visualization" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph-demo">
			<GraphViz data=data width=960.0 height=600.0 interactions=interactions />
			<div class="graph-overlay">
				<h1>"Graph Visualization"</h1>
				<p class="subtitle">"Drag nodes to reposition."</p>
			</div>
		</div>
	}
}
