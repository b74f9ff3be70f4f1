//! Interactive force-directed graph visualization component.
//!
//! Renders nodes and links as svg elements with:
//! - Physics-based positioning via an in-crate force simulation
//! - Enter/update/exit reconciliation keyed by identifier on data updates
//! - Node dragging, rate-limited window-resize recompute, and
//!   click/hover/hover-out pass-through callbacks, each opt-in via the
//!   [`Interactions`] capability set
//!
//! # Example
//!
//! ```ignore
//! use graph_viz::{GraphViz, GraphData, GraphNode, GraphLink, Interactions};
//!
//! let (data, _set_data) = signal(Some(GraphData {
//!     nodes: vec![
//!         GraphNode { id: "a".into(), entity: "service".into(), .. },
//!         GraphNode { id: "b".into(), entity: "database".into(), .. },
//!     ],
//!     links: vec![
//!         GraphLink { id: "a-b".into(), source: "a".into(), target: "b".into(), .. },
//!     ],
//! }));
//!
//! view! { <GraphViz data=data width=800.0 height=600.0 /> }
//! ```

pub mod binder;
mod component;
pub mod config;
pub mod sim;
pub mod state;
mod types;

pub use component::GraphViz;
pub use config::{Interactions, SimulationConfig};
pub use state::GraphVizState;
pub use types::{GraphData, GraphLink, GraphNode};
