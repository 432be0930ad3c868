//! Immutable parameters shared by every stage of a vortex analysis.
use crate::{
    error::{ConfigError, Result},
    keys::{Closure, Geometry},
};
use serde::{Deserialize, Serialize};

/// Hard cap on the number of optimizer starting points per cell.
pub const MAX_STARTING_POINTS: usize = 25;

/// How the center is displaced when estimating the uncertainty of the pressure retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UncertaintyPerturbation {
    /// Displace by the positional standard deviation reported by the center solver.
    CenterStdDev,
    /// Displace by a fixed distance in km.
    Fixed(f64),
}

/// Relative importance of the terms used to choose a center among the analyzed rings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterWeights {
    /// Weight of the mean tangential wind term.
    pub wind: f64,
    /// Weight of the positional spread term.
    pub std_dev: f64,
    /// Weight of the converging start count term.
    pub points: f64,
}

impl Default for CenterWeights {
    fn default() -> Self {
        CenterWeights {
            wind: 1.0,
            std_dev: 1.0,
            points: 1.0,
        }
    }
}

/// Parameters for one analysis. Distances are in km, angles in degrees, times in seconds.
///
/// Built with `Default` and chained `with_*` methods, or deserialized from any serde format by the
/// caller.
///
/// # Examples
///
/// ```rust
/// use vortex_analysis::{AnalysisConfig, Geometry};
///
/// let config = AnalysisConfig::default()
///     .with_geometry(Geometry::Gvtd)
///     .with_radii(10.0, 60.0)
///     .with_levels(1.0, 3.0)
///     .with_num_points(16);
///
/// assert!(config.validate().is_ok());
/// assert!(config.clone().with_num_points(26).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ring geometry.
    pub geometry: Geometry,
    /// Closure assumption for the cross beam mean wind.
    pub closure: Closure,
    /// Lowest analysis height, km.
    pub bottom_level: f64,
    /// Highest analysis height, km.
    pub top_level: f64,
    /// Smallest ring radius, km.
    pub inner_radius: f64,
    /// Largest ring radius, km.
    pub outer_radius: f64,
    /// Spacing between rings, km.
    pub ring_width: f64,
    /// Inner and outer ring radius searched for the center, km. The full ring range is searched
    /// when not set.
    pub search_radii: Option<(f64, f64)>,
    /// Diameter of the box of optimizer starting points, km.
    pub box_diameter: f64,
    /// Number of optimizer starting points, a perfect square no larger than 25.
    pub num_points: usize,
    /// Circumradius of the initial simplex, km.
    pub influence_radius: f64,
    /// Relative tolerance at which a simplex is considered converged.
    pub convergence: f64,
    /// Iteration cap for one simplex run.
    pub max_iterations: usize,
    /// Highest tangential wind asymmetry wavenumber resolved.
    pub max_wavenumber: u8,
    /// Largest tolerated azimuth gap in degrees for each wavenumber `0..=max_wavenumber`.
    pub max_data_gap: Vec<f64>,
    /// Oldest usable pressure observation relative to the volume time, seconds.
    pub max_obs_time_diff: f64,
    /// Farthest usable pressure observation from the center, km. Defaults to 50 km beyond the
    /// outer radius when not set.
    pub max_obs_radius: Option<f64>,
    /// RMW estimates with an uncertainty at or above this are left out of the average RMW, km.
    pub rmw_uncertainty_limit: f64,
    /// Displacement used for the uncertainty ensemble.
    pub perturbation: UncertaintyPerturbation,
    /// Weights for choosing the center among analyzed rings.
    pub center_weights: CenterWeights,
    /// Also solve the thermal wind system over all heights.
    pub thermal_wind: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            geometry: Geometry::Gbvtd,
            closure: Closure::Original,
            bottom_level: 1.0,
            top_level: 10.0,
            inner_radius: 5.0,
            outer_radius: 100.0,
            ring_width: 1.0,
            search_radii: None,
            box_diameter: 15.0,
            num_points: MAX_STARTING_POINTS,
            influence_radius: 4.0,
            convergence: 1.0e-4,
            max_iterations: 500,
            max_wavenumber: 3,
            max_data_gap: vec![120.0, 90.0, 60.0, 30.0],
            max_obs_time_diff: 59.0 * 60.0,
            max_obs_radius: None,
            rmw_uncertainty_limit: 10.0,
            perturbation: UncertaintyPerturbation::CenterStdDev,
            center_weights: CenterWeights::default(),
            thermal_wind: false,
        }
    }
}

impl AnalysisConfig {
    /// Set the ring geometry.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the closure assumption.
    pub fn with_closure(mut self, closure: Closure) -> Self {
        self.closure = closure;
        self
    }

    /// Set the bottom and top analysis heights in km.
    pub fn with_levels(mut self, bottom: f64, top: f64) -> Self {
        self.bottom_level = bottom;
        self.top_level = top;
        self
    }

    /// Set the inner and outer ring radii in km.
    pub fn with_radii(mut self, inner: f64, outer: f64) -> Self {
        self.inner_radius = inner;
        self.outer_radius = outer;
        self
    }

    /// Set the spacing between rings in km.
    pub fn with_ring_width(mut self, ring_width: f64) -> Self {
        self.ring_width = ring_width;
        self
    }

    /// Restrict the center search to rings from `inner` to `outer` km.
    pub fn with_search_radii(mut self, inner: f64, outer: f64) -> Self {
        self.search_radii = Some((inner, outer));
        self
    }

    /// Set the diameter of the box of starting points and the initial simplex size, km.
    pub fn with_search_box(mut self, box_diameter: f64, influence_radius: f64) -> Self {
        self.box_diameter = box_diameter;
        self.influence_radius = influence_radius;
        self
    }

    /// Set the number of optimizer starting points.
    pub fn with_num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }

    /// Set the convergence criterion and iteration cap for the simplex.
    pub fn with_convergence(mut self, convergence: f64, max_iterations: usize) -> Self {
        self.convergence = convergence;
        self.max_iterations = max_iterations;
        self
    }

    /// Set the maximum wavenumber and the gap limits, one per wavenumber starting at 0.
    pub fn with_wavenumbers<V>(mut self, max_wavenumber: u8, gaps: V) -> Self
    where
        V: Into<Vec<f64>>,
    {
        self.max_wavenumber = max_wavenumber;
        self.max_data_gap = gaps.into();
        self
    }

    /// Set the observation time (seconds) and radius (km) windows.
    pub fn with_obs_window(mut self, max_time_diff: f64, max_radius: f64) -> Self {
        self.max_obs_time_diff = max_time_diff;
        self.max_obs_radius = Some(max_radius);
        self
    }

    /// Set the displacement used for the uncertainty ensemble.
    pub fn with_perturbation(mut self, perturbation: UncertaintyPerturbation) -> Self {
        self.perturbation = perturbation;
        self
    }

    /// Set the weights used to choose a center among rings.
    pub fn with_center_weights(mut self, weights: CenterWeights) -> Self {
        self.center_weights = weights;
        self
    }

    /// Enable or disable the thermal wind retrieval.
    pub fn with_thermal_wind(mut self, enabled: bool) -> Self {
        self.thermal_wind = enabled;
        self
    }

    /// Check the parameters for consistency.
    pub fn validate(&self) -> Result<()> {
        let root = (self.num_points as f64).sqrt().round() as usize;
        if self.num_points == 0
            || self.num_points > MAX_STARTING_POINTS
            || root * root != self.num_points
        {
            return Err(ConfigError::NumPoints.into());
        }

        if !(self.inner_radius > 0.0
            && self.inner_radius < self.outer_radius
            && self.ring_width > 0.0)
        {
            return Err(ConfigError::Radii.into());
        }

        if let Some((inner, outer)) = self.search_radii {
            if !(inner > 0.0 && inner <= outer) {
                return Err(ConfigError::Radii.into());
            }
        }

        if self.bottom_level > self.top_level || self.bottom_level < 0.0 {
            return Err(ConfigError::Levels.into());
        }

        if self.max_wavenumber == 0 {
            return Err(ConfigError::MaxWavenumber.into());
        }

        if self.max_data_gap.is_empty() || self.max_data_gap.iter().any(|&gap| gap <= 0.0) {
            return Err(ConfigError::DataGaps.into());
        }

        if self.convergence <= 0.0 || self.max_iterations == 0 {
            return Err(ConfigError::Convergence.into());
        }

        if self.box_diameter < 0.0 || self.influence_radius < 0.0 {
            return Err(ConfigError::SearchBox.into());
        }

        if self.max_obs_time_diff <= 0.0 || self.max_obs_radius.map_or(false, |r| r <= 0.0) {
            return Err(ConfigError::ObservationWindow.into());
        }

        Ok(())
    }

    /// Gap limit for each wavenumber `0..=max_wavenumber`, padding a short list with its last
    /// value.
    pub fn data_gaps(&self) -> Vec<f64> {
        let last = self.max_data_gap.last().cloned().unwrap_or(0.0);
        (0..=self.max_wavenumber as usize)
            .map(|k| self.max_data_gap.get(k).cloned().unwrap_or(last))
            .collect()
    }

    /// Farthest usable pressure observation from the center, km.
    pub fn obs_radius_limit(&self) -> f64 {
        self.max_obs_radius.unwrap_or(self.outer_radius + 50.0)
    }

    /// Ring radii in km from the inner to the outer radius, one ring width apart.
    pub fn radii(&self) -> Vec<f64> {
        steps(self.inner_radius, self.outer_radius, self.ring_width)
    }

    /// Ring radii in km searched for the center, one ring width apart.
    pub fn center_radii(&self) -> Vec<f64> {
        let (inner, outer) = self
            .search_radii
            .unwrap_or((self.inner_radius, self.outer_radius));
        steps(inner, outer, self.ring_width)
    }

    /// Analysis heights in km from the bottom to the top level, 1 km apart.
    pub fn levels(&self) -> Vec<f64> {
        steps(self.bottom_level, self.top_level, 1.0)
    }
}

// `end` is included when it falls on a step, allowing for round off.
fn steps(start: f64, end: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) {
        return vec![];
    }

    let count = ((end - start) / step + 1.0e-9).floor() as isize + 1;
    (0..count.max(0)).map(|i| start + i as f64 * step).collect()
}
