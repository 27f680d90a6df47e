use crate::algo::{ForceOptions, Layout, force};
use crate::error::Result;
use crate::graph::{Canvas, GraphEdge, GraphNode, SimNode};

/// Validated entry point for the force layout.
///
/// Holds no state between calls; every `layout`/`run` builds and discards its
/// own working arrays.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: ForceOptions,
}

impl LayoutEngine {
    pub fn new(options: ForceOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ForceOptions {
        &self.options
    }

    /// Positions every node inside `width × height`.
    ///
    /// Total for any input: one output per input node, same order, finite
    /// coordinates. A degenerate canvas is treated as zero-sized.
    pub fn layout<T: Clone>(
        &self,
        nodes: &[GraphNode<T>],
        edges: &[GraphEdge],
        width: f64,
        height: f64,
    ) -> Vec<SimNode<T>> {
        self.run(nodes, edges, Canvas::sanitized(width, height)).nodes
    }

    /// Like [`LayoutEngine::layout`], also returning run statistics.
    ///
    /// `canvas` is re-sanitized, so a hand-built `Canvas` with non-finite or
    /// negative dimensions behaves like a zero-sized one.
    pub fn run<T: Clone>(
        &self,
        nodes: &[GraphNode<T>],
        edges: &[GraphEdge],
        canvas: Canvas,
    ) -> Layout<T> {
        let sanitized = Canvas::sanitized(canvas.width, canvas.height);
        if sanitized.is_degenerate() {
            tracing::warn!(
                width = canvas.width,
                height = canvas.height,
                "degenerate canvas; positions collapse to its centre"
            );
        }
        force::layout(nodes, edges, sanitized, &self.options)
    }
}
