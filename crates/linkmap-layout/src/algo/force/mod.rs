//! Force-directed simulation: circular seeding, pairwise repulsion, spring
//! attraction along edges, centre gravity, damping and a linear cooling schedule.

use crate::algo::{ForceOptions, Layout, LayoutStats, Repulsion};
use crate::graph::{Canvas, GraphEdge, GraphNode, SimNode};
use rustc_hash::FxHashMap;

mod quadtree;

use quadtree::QuadTree;

/// Position and velocity of one node in the working array.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

pub(crate) fn layout<T: Clone>(
    nodes: &[GraphNode<T>],
    edges: &[GraphEdge],
    canvas: Canvas,
    opts: &ForceOptions,
) -> Layout<T> {
    let _span = tracing::debug_span!("force_layout", nodes = nodes.len(), edges = edges.len())
        .entered();

    if nodes.is_empty() {
        return Layout {
            nodes: Vec::new(),
            stats: LayoutStats::default(),
        };
    }

    let mut sim = Simulation::new(nodes, edges, canvas, opts);
    if sim.edges.skipped > 0 {
        tracing::debug!(
            skipped = sim.edges.skipped,
            "ignoring edges with unknown endpoints"
        );
    }

    let iterations = sim.run();
    let kinetic_energy = sim.kinetic_energy();
    tracing::debug!(iterations, kinetic_energy, "force layout finished");

    let stats = LayoutStats {
        iterations,
        resolved_edges: sim.edges.pairs.len(),
        skipped_edges: sim.edges.skipped,
        kinetic_energy,
    };

    let nodes = nodes
        .iter()
        .zip(&sim.bodies)
        .map(|(node, b)| SimNode {
            node: node.clone(),
            x: b.x,
            y: b.y,
            vx: b.vx,
            vy: b.vy,
        })
        .collect();

    Layout { nodes, stats }
}

/// Evenly spaced starting positions on a circle around the canvas centre.
fn seed_positions(count: usize, canvas: Canvas, radius_ratio: f64) -> Vec<Body> {
    let center = canvas.center();
    let radius = canvas.width.min(canvas.height) * radius_ratio;
    let step = std::f64::consts::TAU / (count.max(1) as f64);
    (0..count)
        .map(|i| {
            let angle = step * (i as f64);
            Body {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
                vx: 0.0,
                vy: 0.0,
            }
        })
        .collect()
}

/// Edges resolved to working-array indices.
#[derive(Debug, Clone, Default)]
struct EdgeIndex {
    pairs: Vec<(usize, usize)>,
    skipped: usize,
}

impl EdgeIndex {
    fn build<T>(nodes: &[GraphNode<T>], edges: &[GraphEdge]) -> Self {
        let mut id_to_idx: FxHashMap<&str, usize> = FxHashMap::default();
        id_to_idx.reserve(nodes.len());
        for (idx, n) in nodes.iter().enumerate() {
            // First occurrence owns a duplicated id.
            id_to_idx.entry(n.id.as_str()).or_insert(idx);
        }

        let mut pairs = Vec::with_capacity(edges.len());
        let mut skipped = 0usize;
        for e in edges {
            let (Some(&a), Some(&b)) = (
                id_to_idx.get(e.source.as_str()),
                id_to_idx.get(e.target.as_str()),
            ) else {
                skipped += 1;
                continue;
            };
            pairs.push((a, b));
        }

        Self { pairs, skipped }
    }
}

struct Simulation<'a> {
    bodies: Vec<Body>,
    edges: EdgeIndex,
    canvas: Canvas,
    opts: &'a ForceOptions,
}

impl<'a> Simulation<'a> {
    fn new<T>(
        nodes: &[GraphNode<T>],
        edges: &[GraphEdge],
        canvas: Canvas,
        opts: &'a ForceOptions,
    ) -> Self {
        Self {
            bodies: seed_positions(nodes.len(), canvas, opts.initial_radius_ratio),
            edges: EdgeIndex::build(nodes, edges),
            canvas,
            opts,
        }
    }

    /// Runs the cooling loop and returns the number of iterations executed.
    fn run(&mut self) -> usize {
        let total = self.opts.iterations;
        for iteration in 0..total {
            let alpha = 1.0 - (iteration as f64) / (total as f64);
            self.step(alpha);

            if let Some(eps) = self.opts.convergence_threshold {
                if self.kinetic_energy() < eps {
                    tracing::trace!(iteration, "force layout converged early");
                    return iteration + 1;
                }
            }
        }
        total
    }

    fn step(&mut self, alpha: f64) {
        match self.opts.repulsion {
            Repulsion::Pairwise => self.apply_pairwise_repulsion(alpha),
            Repulsion::BarnesHut { theta } => self.apply_barnes_hut_repulsion(alpha, theta),
        }
        self.apply_attraction(alpha);
        self.apply_gravity(alpha);
        self.integrate();
    }

    fn apply_pairwise_repulsion(&mut self, alpha: f64) {
        let strength = self.opts.repulsion_strength * alpha;
        let min_distance = self.opts.min_distance;
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (left, right) = self.bodies.split_at_mut(j);
                let (a, b) = (&mut left[i], &mut right[0]);
                let dx = b.x - a.x;
                let dy = b.y - a.y;
                let dist = dx.hypot(dy).max(min_distance);
                let force = strength / (dist * dist);
                let fx = dx / dist * force;
                let fy = dy / dist * force;
                a.vx -= fx;
                a.vy -= fy;
                b.vx += fx;
                b.vy += fy;
            }
        }
    }

    fn apply_barnes_hut_repulsion(&mut self, alpha: f64, theta: f64) {
        let strength = self.opts.repulsion_strength * alpha;
        let points: Vec<(f64, f64)> = self.bodies.iter().map(|b| (b.x, b.y)).collect();
        let Some(tree) = QuadTree::build(&points) else {
            return;
        };
        for (i, body) in self.bodies.iter_mut().enumerate() {
            let (fx, fy) = tree.repulsion_on(i, &points, theta, self.opts.min_distance);
            body.vx -= fx * strength;
            body.vy -= fy * strength;
        }
    }

    fn apply_attraction(&mut self, alpha: f64) {
        let strength = self.opts.attraction_strength * alpha;
        let min_distance = self.opts.min_edge_distance;
        for &(s, t) in &self.edges.pairs {
            let dx = self.bodies[t].x - self.bodies[s].x;
            let dy = self.bodies[t].y - self.bodies[s].y;
            let dist = dx.hypot(dy).max(min_distance);
            let force = strength * dist;
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            self.bodies[s].vx += fx;
            self.bodies[s].vy += fy;
            self.bodies[t].vx -= fx;
            self.bodies[t].vy -= fy;
        }
    }

    fn apply_gravity(&mut self, alpha: f64) {
        let center = self.canvas.center();
        let k = self.opts.center_gravity * alpha;
        for b in &mut self.bodies {
            b.vx += (center.x - b.x) * k;
            b.vy += (center.y - b.y) * k;
        }
    }

    fn integrate(&mut self) {
        let damping = self.opts.damping;
        let (min_x, max_x) = self.canvas.x_bounds(self.opts.padding);
        let (min_y, max_y) = self.canvas.y_bounds(self.opts.padding);
        for b in &mut self.bodies {
            b.vx *= damping;
            b.vy *= damping;
            b.x = (b.x + b.vx).clamp(min_x, max_x);
            b.y = (b.y + b.vy).clamp(min_y, max_y);
        }
    }

    fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(|b| b.vx * b.vx + b.vy * b.vy).sum()
    }
}
