#![forbid(unsafe_code)]

//! Deterministic force-directed layout for internal-link graphs.
//!
//! Pages are nodes, links are edges. The engine seeds nodes on a circle, then
//! runs a fixed number of cooling iterations of repulsion, spring attraction and
//! centre gravity, clamping every node inside the padded canvas.

pub mod algo;
pub mod engine;
pub mod error;
pub mod graph;
pub mod sizing;

pub use algo::{ForceOptions, Layout, LayoutStats, Repulsion};
pub use engine::LayoutEngine;
pub use error::{Error, Result};
pub use graph::{Canvas, GraphEdge, GraphNode, Point, SimNode};
pub use sizing::{NodeDegree, RadiusRange, degrees, max_degree, node_radius};

/// Layout with the reference tuning.
pub fn layout<T: Clone>(
    nodes: &[GraphNode<T>],
    edges: &[GraphEdge],
    width: f64,
    height: f64,
) -> Vec<SimNode<T>> {
    LayoutEngine::default().layout(nodes, edges, width, height)
}
