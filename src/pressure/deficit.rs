//! Radial pressure deficit from gradient wind balance.
use itertools::izip;
use optional::Optioned;

/// Density of the reference atmosphere at the surface, kg/m³.
pub const SURFACE_DENSITY: f64 = 1.18;
/// Scale height of the reference atmosphere density, km.
pub const DENSITY_SCALE_HEIGHT: f64 = 10.0;

/// Reference air density at `height` km, kg/m³.
pub fn air_density(height: f64) -> f64 {
    SURFACE_DENSITY * (-height / DENSITY_SCALE_HEIGHT).exp()
}

/// Pressure relative to the center of the vortex along the analysis rings at one height.
///
/// Values are in hPa and are never positive for a cyclonic vortex: the outer ring carries the
/// smallest deficit and the inner ring the largest.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureProfile {
    radii: Vec<f64>,
    values: Vec<f64>,
}

impl PressureProfile {
    /// Integrate gradient wind balance inward from the outer ring.
    ///
    /// `mean_vt` is the mean tangential wind (m/s) on each ring of `radii` (km), `coriolis` is in
    /// 1/s. Only rings with a nonzero wind contribute a gradient. The outer boundary value is one
    /// ring's worth of gradient. Moving inward the gradient is averaged over a pair of rings when
    /// both have a wind, taken from the one that has it otherwise, and the profile is held flat
    /// across rings where neither has a wind.
    pub fn integrate(radii: &[f64], mean_vt: &[Optioned<f64>], height: f64, coriolis: f64) -> Self {
        debug_assert_eq!(radii.len(), mean_vt.len());

        let density = air_density(height);

        // hPa per km
        let gradient: Vec<Option<f64>> = izip!(radii, mean_vt)
            .map(|(&radius, vt)| {
                vt.into_option()
                    .filter(|&vt| vt != 0.0)
                    .map(|vt| density * (coriolis * vt + vt * vt / (radius * 1000.0)) * 10.0)
            })
            .collect();

        let mut values = vec![0.0; radii.len()];
        let last = match radii.len().checked_sub(1) {
            Some(last) => last,
            None => {
                return PressureProfile {
                    radii: vec![],
                    values,
                }
            }
        };

        let outer_step = if last > 0 {
            radii[last] - radii[last - 1]
        } else {
            1.0
        };
        values[last] = gradient[last].map_or(0.0, |dpdr| -dpdr * outer_step);

        for inner in (0..last).rev() {
            let outer = inner + 1;
            let dr = radii[outer] - radii[inner];
            let change = match (gradient[inner], gradient[outer]) {
                (Some(g_in), Some(g_out)) => 0.5 * (g_in + g_out) * dr,
                (Some(g), None) | (None, Some(g)) => g * dr,
                (None, None) => 0.0,
            };
            values[inner] = values[outer] - change;
        }

        PressureProfile {
            radii: radii.to_vec(),
            values,
        }
    }

    /// Ring radii, km.
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Pressure on each ring relative to the environment, hPa.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at the innermost ring, which stands in for the center.
    pub fn central(&self) -> f64 {
        self.values.first().cloned().unwrap_or(0.0)
    }

    /// Value at the outermost ring.
    pub fn outer(&self) -> f64 {
        self.values.last().cloned().unwrap_or(0.0)
    }

    /// Pressure rise from the center to the outer ring, hPa.
    pub fn total_deficit(&self) -> f64 {
        self.outer() - self.central()
    }

    /// Value at the last ring not beyond `radius` km. Radii inside the first ring take the first
    /// ring's value, radii beyond the last ring the last ring's value.
    pub fn at(&self, radius: f64) -> f64 {
        match self.radii.iter().rposition(|&r| r <= radius) {
            Some(i) => self.values[i],
            None => self.central(),
        }
    }
}
