//! UI components.

pub mod graph_viz;
