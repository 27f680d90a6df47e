//! Degree-based node radius. Independent of the simulation.

use crate::error::{Error, Result};
use crate::graph::{GraphEdge, GraphNode};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDegree {
    pub in_degree: usize,
    pub out_degree: usize,
}

impl NodeDegree {
    pub fn total(&self) -> usize {
        self.in_degree + self.out_degree
    }
}

/// Incident edge counts for every node, in input order.
///
/// Edges with an unknown endpoint are ignored. A self-loop counts once in each
/// direction.
pub fn degrees<T>(nodes: &[GraphNode<T>], edges: &[GraphEdge]) -> Vec<NodeDegree> {
    let mut id_to_idx: FxHashMap<&str, usize> = FxHashMap::default();
    id_to_idx.reserve(nodes.len());
    for (idx, n) in nodes.iter().enumerate() {
        id_to_idx.entry(n.id.as_str()).or_insert(idx);
    }

    let mut out = vec![NodeDegree::default(); nodes.len()];
    for e in edges {
        let (Some(&s), Some(&t)) = (
            id_to_idx.get(e.source.as_str()),
            id_to_idx.get(e.target.as_str()),
        ) else {
            continue;
        };
        out[s].out_degree += 1;
        out[t].in_degree += 1;
    }
    out
}

pub fn max_degree(degrees: &[NodeDegree]) -> usize {
    degrees.iter().map(NodeDegree::total).max().unwrap_or(0)
}

/// Visual radius bounds for degree-based sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusRange {
    pub min: f64,
    pub max: f64,
}

impl RadiusRange {
    pub const DEFAULT_MIN: f64 = 4.0;
    pub const DEFAULT_MAX: f64 = 12.0;

    pub fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.min >= 0.0) {
            return Err(Error::InvalidOption {
                name: "radius.min",
                value: self.min,
            });
        }
        if !(self.max.is_finite() && self.max >= self.min) {
            return Err(Error::InvalidOption {
                name: "radius.max",
                value: self.max,
            });
        }
        Ok(())
    }

    /// Linear interpolation between `min` and `max` by `degree / max_degree`.
    pub fn radius(&self, degree: usize, max_degree: usize) -> f64 {
        if max_degree == 0 {
            return self.min;
        }
        let t = ((degree as f64) / (max_degree as f64)).min(1.0);
        self.min + (self.max - self.min) * t
    }
}

impl Default for RadiusRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Radius for a node given the largest total degree in the graph.
pub fn node_radius(degree: NodeDegree, max_degree: usize, range: &RadiusRange) -> f64 {
    range.radius(degree.total(), max_degree)
}

#[cfg(test)]
mod tests {
    use super::{NodeDegree, RadiusRange, degrees, max_degree};
    use crate::graph::{GraphEdge, GraphNode};

    #[test]
    fn degrees_count_both_directions_and_skip_dangling_edges() {
        let nodes = vec![GraphNode::new("home"), GraphNode::new("blog"), GraphNode::new("about")];
        let edges = vec![
            GraphEdge::new("home", "blog"),
            GraphEdge::new("home", "about"),
            GraphEdge::new("blog", "home"),
            GraphEdge::new("blog", "blog"),
            GraphEdge::new("blog", "deleted-page"),
        ];
        let d = degrees(&nodes, &edges);
        assert_eq!(
            d,
            vec![
                NodeDegree {
                    in_degree: 1,
                    out_degree: 2
                },
                NodeDegree {
                    in_degree: 2,
                    out_degree: 2
                },
                NodeDegree {
                    in_degree: 1,
                    out_degree: 0
                },
            ]
        );
        assert_eq!(max_degree(&d), 4);
    }

    #[test]
    fn max_degree_of_nothing_is_zero() {
        assert_eq!(max_degree(&[]), 0);
    }

    #[test]
    fn validate_rejects_inverted_range() {
        assert!(RadiusRange { min: 8.0, max: 4.0 }.validate().is_err());
        assert!(RadiusRange { min: -1.0, max: 4.0 }.validate().is_err());
        assert!(RadiusRange::default().validate().is_ok());
    }
}
