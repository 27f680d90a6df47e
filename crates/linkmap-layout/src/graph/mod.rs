use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A page or post in the internal-link graph.
///
/// `data` is opaque to the layout engine and is handed back unchanged on the
/// matching [`SimNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode<T = ()> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

impl GraphNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: (),
        }
    }
}

impl<T> GraphNode<T> {
    pub fn with_data(id: impl Into<String>, data: T) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// A directed internal link. Endpoints refer to [`GraphNode::id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A node after layout: the caller's node plus its final position and velocity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimNode<T = ()> {
    #[serde(flatten)]
    pub node: GraphNode<T>,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl<T> SimNode<T> {
    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn position(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The drawing surface the layout is confined to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    /// Strict constructor: both dimensions must be finite and strictly positive.
    pub fn try_new(width: f64, height: f64) -> Result<Self> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(Self { width, height })
        } else {
            Err(Error::InvalidCanvas { width, height })
        }
    }

    /// Lenient constructor: non-finite or negative dimensions become `0`.
    pub fn sanitized(width: f64, height: f64) -> Self {
        fn dim(v: f64) -> f64 {
            if v.is_finite() { v.max(0.0) } else { 0.0 }
        }
        Self {
            width: dim(width),
            height: dim(height),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }

    /// Clamp interval for x positions under `padding`.
    pub fn x_bounds(&self, padding: f64) -> (f64, f64) {
        axis_bounds(self.width, padding)
    }

    /// Clamp interval for y positions under `padding`.
    pub fn y_bounds(&self, padding: f64) -> (f64, f64) {
        axis_bounds(self.height, padding)
    }
}

// A canvas narrower than twice the padding has no valid interval; pin to the midpoint.
fn axis_bounds(extent: f64, padding: f64) -> (f64, f64) {
    if extent >= 2.0 * padding {
        (padding, extent - padding)
    } else {
        let mid = extent / 2.0;
        (mid, mid)
    }
}

#[cfg(test)]
mod tests {
    use super::Canvas;

    #[test]
    fn canvas_bounds_collapse_to_midpoint_when_padding_exceeds_extent() {
        let canvas = Canvas::sanitized(40.0, 600.0);
        assert_eq!(canvas.x_bounds(30.0), (20.0, 20.0));
        assert_eq!(canvas.y_bounds(30.0), (30.0, 570.0));
    }

    #[test]
    fn sanitized_canvas_maps_non_finite_dimensions_to_zero() {
        let canvas = Canvas::sanitized(f64::NAN, -5.0);
        assert_eq!(canvas.width, 0.0);
        assert_eq!(canvas.height, 0.0);
        assert!(canvas.is_degenerate());
    }

    #[test]
    fn try_new_rejects_non_positive_dimensions() {
        assert!(Canvas::try_new(800.0, 600.0).is_ok());
        assert!(Canvas::try_new(0.0, 600.0).is_err());
        assert!(Canvas::try_new(800.0, f64::INFINITY).is_err());
    }
}
