//! Barnes–Hut quadtree for approximate inverse-square repulsion.

/// Coincident bodies stop subdividing here and share a leaf.
const MAX_DEPTH: usize = 24;

#[derive(Debug, Clone)]
struct Cell {
    // Square cell: centre and half side length.
    cx: f64,
    cy: f64,
    half: f64,
    mass: f64,
    mass_x: f64,
    mass_y: f64,
    children: Option<[usize; 4]>,
    bodies: Vec<usize>,
}

impl Cell {
    fn new(cx: f64, cy: f64, half: f64) -> Self {
        Self {
            cx,
            cy,
            half,
            mass: 0.0,
            mass_x: 0.0,
            mass_y: 0.0,
            children: None,
            bodies: Vec::new(),
        }
    }

    fn quadrant(&self, x: f64, y: f64) -> usize {
        usize::from(x >= self.cx) | (usize::from(y >= self.cy) << 1)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        (x - self.cx).abs() <= self.half && (y - self.cy).abs() <= self.half
    }

    fn center_of_mass(&self) -> (f64, f64) {
        (self.mass_x / self.mass, self.mass_y / self.mass)
    }
}

#[derive(Debug, Clone)]
pub(super) struct QuadTree {
    cells: Vec<Cell>,
}

impl QuadTree {
    pub(super) fn build(points: &[(f64, f64)]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }

        let half = ((max_x - min_x).max(max_y - min_y) / 2.0).max(1.0);
        let root = Cell::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0, half);
        let mut tree = Self { cells: vec![root] };
        for (idx, &(x, y)) in points.iter().enumerate() {
            tree.insert(idx, x, y, points);
        }
        Some(tree)
    }

    fn insert(&mut self, body: usize, x: f64, y: f64, points: &[(f64, f64)]) {
        let mut cell = 0usize;
        let mut depth = 0usize;
        loop {
            {
                let c = &mut self.cells[cell];
                c.mass += 1.0;
                c.mass_x += x;
                c.mass_y += y;
            }

            if let Some(children) = self.cells[cell].children {
                cell = children[self.cells[cell].quadrant(x, y)];
                depth += 1;
                continue;
            }

            if self.cells[cell].bodies.is_empty() || depth >= MAX_DEPTH {
                self.cells[cell].bodies.push(body);
                return;
            }

            // Occupied leaf: split and push its residents one level down.
            let children = self.subdivide(cell);
            let residents = std::mem::take(&mut self.cells[cell].bodies);
            for r in residents {
                let (rx, ry) = points[r];
                let child = children[self.cells[cell].quadrant(rx, ry)];
                let c = &mut self.cells[child];
                c.mass += 1.0;
                c.mass_x += rx;
                c.mass_y += ry;
                c.bodies.push(r);
            }
            cell = children[self.cells[cell].quadrant(x, y)];
            depth += 1;
        }
    }

    fn subdivide(&mut self, cell: usize) -> [usize; 4] {
        let (cx, cy, half) = {
            let c = &self.cells[cell];
            (c.cx, c.cy, c.half / 2.0)
        };
        let base = self.cells.len();
        // Quadrant bit 0 is "east", bit 1 is "south".
        self.cells.push(Cell::new(cx - half, cy - half, half));
        self.cells.push(Cell::new(cx + half, cy - half, half));
        self.cells.push(Cell::new(cx - half, cy + half, half));
        self.cells.push(Cell::new(cx + half, cy + half, half));
        let children = [base, base + 1, base + 2, base + 3];
        self.cells[cell].children = Some(children);
        children
    }

    /// Unscaled repulsion on `body`: `Σ mass · d̂ / dist²` over the other bodies,
    /// where `d̂ = d / dist` points from `body` toward the source and `dist` is
    /// floored at `min_distance`. The caller subtracts it scaled by strength.
    pub(super) fn repulsion_on(
        &self,
        body: usize,
        points: &[(f64, f64)],
        theta: f64,
        min_distance: f64,
    ) -> (f64, f64) {
        let (x, y) = points[body];
        let mut fx = 0.0;
        let mut fy = 0.0;
        let mut accumulate = |sx: f64, sy: f64, mass: f64| {
            let dx = sx - x;
            let dy = sy - y;
            let dist = dx.hypot(dy).max(min_distance);
            let force = mass / (dist * dist);
            fx += dx / dist * force;
            fy += dy / dist * force;
        };

        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            let cell = &self.cells[idx];
            if cell.mass == 0.0 {
                continue;
            }

            let Some(children) = cell.children else {
                for &other in &cell.bodies {
                    if other != body {
                        let (ox, oy) = points[other];
                        accumulate(ox, oy, 1.0);
                    }
                }
                continue;
            };

            if !cell.contains(x, y) {
                let (mx, my) = cell.center_of_mass();
                let dist = (mx - x).hypot(my - y);
                if dist > 0.0 && (2.0 * cell.half) / dist < theta {
                    accumulate(mx, my, cell.mass);
                    continue;
                }
            }
            // Reverse push keeps the visiting order fixed.
            stack.extend(children.iter().rev());
        }

        (fx, fy)
    }
}

#[cfg(test)]
mod tests {
    use super::QuadTree;

    fn exact(points: &[(f64, f64)], body: usize, min_distance: f64) -> (f64, f64) {
        let (x, y) = points[body];
        let mut out = (0.0, 0.0);
        for (j, &(ox, oy)) in points.iter().enumerate() {
            if j == body {
                continue;
            }
            let dx = ox - x;
            let dy = oy - y;
            let dist = dx.hypot(dy).max(min_distance);
            let force = 1.0 / (dist * dist);
            out.0 += dx / dist * force;
            out.1 += dy / dist * force;
        }
        out
    }

    #[test]
    fn theta_zero_matches_exact_summation() {
        let points = vec![
            (0.0, 0.0),
            (120.0, 10.0),
            (300.0, 250.0),
            (-80.0, 40.0),
            (15.0, -200.0),
        ];
        let tree = QuadTree::build(&points).expect("tree");
        for i in 0..points.len() {
            let (ax, ay) = tree.repulsion_on(i, &points, 0.0, 10.0);
            let (ex, ey) = exact(&points, i, 10.0);
            assert!((ax - ex).abs() < 1e-12, "x mismatch at {i}: {ax} vs {ex}");
            assert!((ay - ey).abs() < 1e-12, "y mismatch at {i}: {ay} vs {ey}");
        }
    }

    #[test]
    fn coincident_points_share_a_leaf_without_blowing_up() {
        let points = vec![(5.0, 5.0); 8];
        let tree = QuadTree::build(&points).expect("tree");
        let (fx, fy) = tree.repulsion_on(0, &points, 0.5, 40.0);
        assert_eq!((fx, fy), (0.0, 0.0));
    }

    #[test]
    fn far_cluster_is_approximated_by_its_center_of_mass() {
        let mut points = vec![(0.0, 0.0)];
        for i in 0..4 {
            points.push((1000.0 + i as f64, 1000.0));
        }
        let tree = QuadTree::build(&points).expect("tree");
        let (ax, ay) = tree.repulsion_on(0, &points, 0.9, 1.0);
        let (ex, ey) = exact(&points, 0, 1.0);
        assert!(((ax - ex) / ex).abs() < 1e-3, "x: {ax} vs {ex}");
        assert!(((ay - ey) / ey).abs() < 1e-3, "y: {ay} vs {ey}");
    }

    #[test]
    fn build_rejects_empty_and_non_finite_input() {
        assert!(QuadTree::build(&[]).is_none());
        assert!(QuadTree::build(&[(f64::NAN, 0.0)]).is_none());
    }
}
