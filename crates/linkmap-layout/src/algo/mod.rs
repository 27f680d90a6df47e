pub(crate) mod force;

use crate::error::{Error, Result};
use crate::graph::SimNode;
use serde::{Deserialize, Serialize};

/// How pairwise node repulsion is evaluated each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Repulsion {
    /// Exact unordered-pair loop, O(N²) per iteration.
    #[default]
    Pairwise,
    /// Quadtree approximation. Cells with `size / distance < theta` are
    /// collapsed to their centre of mass; `theta = 0` sums every body exactly.
    BarnesHut { theta: f64 },
}

/// Tuning for the force simulation.
///
/// Defaults are the production visual-tuning values. Tests usually build a
/// smaller record with fewer iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceOptions {
    /// Fixed iteration budget. The cooling schedule spans exactly this many steps.
    pub iterations: usize,
    /// Numerator of the inverse-square repulsion.
    pub repulsion_strength: f64,
    /// Distance floor for repulsion.
    pub min_distance: f64,
    /// Spring constant along edges.
    pub attraction_strength: f64,
    /// Distance floor for edge attraction.
    pub min_edge_distance: f64,
    /// Pull toward the canvas centre, per unit of offset.
    pub center_gravity: f64,
    /// Velocity multiplier applied once per iteration.
    pub damping: f64,
    /// Margin kept clear on every side of the canvas.
    pub padding: f64,
    /// Seed circle radius as a fraction of `min(width, height)`.
    pub initial_radius_ratio: f64,
    pub repulsion: Repulsion,
    /// Stop early once the summed squared speed falls below this value.
    pub convergence_threshold: Option<f64>,
}

impl ForceOptions {
    pub const DEFAULT_ITERATIONS: usize = 120;
    pub const DEFAULT_REPULSION_STRENGTH: f64 = 5000.0;
    pub const DEFAULT_MIN_DISTANCE: f64 = 40.0;
    pub const DEFAULT_ATTRACTION_STRENGTH: f64 = 0.008;
    pub const DEFAULT_MIN_EDGE_DISTANCE: f64 = 1.0;
    pub const DEFAULT_CENTER_GRAVITY: f64 = 0.01;
    pub const DEFAULT_DAMPING: f64 = 0.92;
    pub const DEFAULT_PADDING: f64 = 30.0;
    pub const DEFAULT_INITIAL_RADIUS_RATIO: f64 = 0.35;

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("repulsion_strength", self.repulsion_strength),
            ("attraction_strength", self.attraction_strength),
            ("center_gravity", self.center_gravity),
            ("padding", self.padding),
            ("initial_radius_ratio", self.initial_radius_ratio),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidOption { name, value });
            }
        }

        let positive = [
            ("min_distance", self.min_distance),
            ("min_edge_distance", self.min_edge_distance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidOption { name, value });
            }
        }

        if !(self.damping.is_finite() && (0.0..=1.0).contains(&self.damping)) {
            return Err(Error::InvalidOption {
                name: "damping",
                value: self.damping,
            });
        }

        if let Repulsion::BarnesHut { theta } = self.repulsion {
            if !(theta.is_finite() && theta >= 0.0) {
                return Err(Error::InvalidOption {
                    name: "theta",
                    value: theta,
                });
            }
        }

        if let Some(eps) = self.convergence_threshold {
            if !(eps.is_finite() && eps >= 0.0) {
                return Err(Error::InvalidOption {
                    name: "convergence_threshold",
                    value: eps,
                });
            }
        }

        Ok(())
    }
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            iterations: Self::DEFAULT_ITERATIONS,
            repulsion_strength: Self::DEFAULT_REPULSION_STRENGTH,
            min_distance: Self::DEFAULT_MIN_DISTANCE,
            attraction_strength: Self::DEFAULT_ATTRACTION_STRENGTH,
            min_edge_distance: Self::DEFAULT_MIN_EDGE_DISTANCE,
            center_gravity: Self::DEFAULT_CENTER_GRAVITY,
            damping: Self::DEFAULT_DAMPING,
            padding: Self::DEFAULT_PADDING,
            initial_radius_ratio: Self::DEFAULT_INITIAL_RADIUS_RATIO,
            repulsion: Repulsion::Pairwise,
            convergence_threshold: None,
        }
    }
}

/// Counters describing one layout run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Iterations actually executed (below the budget only on early convergence).
    pub iterations: usize,
    /// Edges whose endpoints both resolved to a node.
    pub resolved_edges: usize,
    /// Edges ignored because an endpoint id is unknown.
    pub skipped_edges: usize,
    /// `Σ(vx² + vy²)` after the last iteration.
    pub kinetic_energy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout<T = ()> {
    pub nodes: Vec<SimNode<T>>,
    pub stats: LayoutStats,
}
