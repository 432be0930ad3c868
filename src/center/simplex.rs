//! Nelder-Mead simplex in two dimensions, maximizing an objective.

/// Objective value given to positions where the ring could not be fit. Low enough that such a
/// vertex is always the first to be replaced.
pub(crate) const FAILED_FIT_PENALTY: f64 = -999.0;

/// A trial center and its cached objective value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexVertex {
    /// km east of the radar.
    pub x: f64,
    /// km north of the radar.
    pub y: f64,
    /// Mean tangential wind at this center, m/s.
    pub vt: f64,
}

/// Settings for one simplex run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimplexSettings {
    pub influence_radius: f64,
    pub convergence: f64,
    pub max_iterations: usize,
}

struct Simplex<F> {
    vertices: [SimplexVertex; 3],
    sum: (f64, f64),
    objective: F,
}

impl<F> Simplex<F>
where
    F: Fn(f64, f64) -> f64,
{
    fn new(x: f64, y: f64, radius: f64, objective: F) -> Self {
        let corners = [
            (x, y + radius),
            (x + 0.866 * radius, y - 0.5 * radius),
            (x - 0.866 * radius, y - 0.5 * radius),
        ];

        let vertex = |(x, y): (f64, f64)| SimplexVertex {
            x,
            y,
            vt: objective(x, y),
        };
        let vertices = [vertex(corners[0]), vertex(corners[1]), vertex(corners[2])];

        let mut simplex = Simplex {
            vertices,
            sum: (0.0, 0.0),
            objective,
        };
        simplex.update_sum();
        simplex
    }

    fn update_sum(&mut self) {
        self.sum = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), v| (sx + v.x, sy + v.y));
    }

    /// Indices of the lowest, middle and highest vertex.
    fn order(&self) -> (usize, usize, usize) {
        let mut idx = [0, 1, 2];
        idx.sort_by(|&a, &b| {
            self.vertices[a]
                .vt
                .partial_cmp(&self.vertices[b].vt)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        (idx[0], idx[1], idx[2])
    }

    /// Move the lowest vertex through the opposite face by `factor` and keep it if it improved.
    fn trial(&mut self, low: usize, factor: f64) -> f64 {
        let f1 = (1.0 - factor) / 2.0;
        let f2 = f1 - factor;

        let x = self.sum.0 * f1 - self.vertices[low].x * f2;
        let y = self.sum.1 * f1 - self.vertices[low].y * f2;
        let vt = (self.objective)(x, y);

        if vt > self.vertices[low].vt {
            let old = self.vertices[low];
            self.vertices[low] = SimplexVertex { x, y, vt };
            self.sum.0 += x - old.x;
            self.sum.1 += y - old.y;
        }

        vt
    }

    /// Contract every vertex halfway toward the highest.
    fn shrink(&mut self, high: usize) {
        let best = self.vertices[high];
        for i in (0..3).filter(|&i| i != high) {
            let x = 0.5 * (self.vertices[i].x + best.x);
            let y = 0.5 * (self.vertices[i].y + best.y);
            self.vertices[i] = SimplexVertex {
                x,
                y,
                vt: (self.objective)(x, y),
            };
        }
        self.update_sum();
    }
}

/// Climb from (`x`, `y`) to a local maximum of `objective`.
///
/// Returns the best vertex once the relative spread of the simplex is below the convergence
/// criterion, or `None` if the iteration cap is hit first.
pub(crate) fn maximize<F>(
    x: f64,
    y: f64,
    settings: SimplexSettings,
    objective: F,
) -> Option<SimplexVertex>
where
    F: Fn(f64, f64) -> f64,
{
    let mut simplex = Simplex::new(x, y, settings.influence_radius, objective);
    let mut iterations = 0;

    loop {
        let (low, mid, high) = simplex.order();
        let vt_low = simplex.vertices[low].vt;
        let vt_high = simplex.vertices[high].vt;

        let spread = 2.0 * (vt_high - vt_low).abs() / (vt_high.abs() + vt_low.abs() + 1.0e-10);
        if spread < settings.convergence {
            return Some(simplex.vertices[high]);
        }

        if iterations > settings.max_iterations {
            return None;
        }
        iterations += 2;

        let vt_try = simplex.trial(low, -1.0);
        if vt_try >= vt_high {
            simplex.trial(low, 2.0);
        } else if vt_try <= simplex.vertices[mid].vt {
            let saved = simplex.vertices[low].vt;
            let vt_try = simplex.trial(low, 0.5);
            if vt_try <= saved {
                simplex.shrink(high);
                iterations += 2;
            }
        } else {
            iterations -= 1;
        }
    }
}
