//! Central pressure from gradient wind balance, anchored to surface observations.
//!
//! At every height the mean tangential wind profile is integrated inward from the outer ring to
//! get the pressure deficit, the deficit is anchored to the available pressure observations to
//! get a central pressure, and the center is displaced in four directions to see how much the
//! answer moves.
use crate::{
    cancel::CancelToken,
    center::VortexCenter,
    coefficients::CoefficientField,
    config::{AnalysisConfig, UncertaintyPerturbation},
    error::Result,
    field::FieldExtractor,
    geo::{adjusted_lat_lon, coriolis_parameter},
    grid::GriddedData,
    keys::WindParameter,
    utility::mean,
};
use log::{debug, info};
use metfor::Km;
use optional::{none, some, Optioned};
use rayon::prelude::*;

pub use self::central::{
    CentralPressure, ObservationWindow, PressureAnchors, MIN_OBS_RADIUS, STANDARD_PRESSURE,
};
pub use self::deficit::{air_density, PressureProfile, DENSITY_SCALE_HEIGHT, SURFACE_DENSITY};
pub use self::thermal::{reference_density, ReferenceLevel, ThermalField};
pub use self::uncertainty::{
    ensemble_uncertainty, perturbed_centers, PressureUncertainty, FEW_OBS_FLOOR, NO_OBS_FLOOR,
    NUM_PERTURBATIONS,
};

mod central;
mod deficit;
mod thermal;
mod uncertainty;

/// Mean RMW over the heights whose RMW is known with an uncertainty below `uncertainty_limit` km.
pub fn average_rmw(centers: &[Option<VortexCenter>], uncertainty_limit: f64) -> Optioned<f64> {
    let rmws: Vec<f64> = centers
        .iter()
        .flatten()
        .filter(|center| {
            center
                .rmw_uncertainty
                .map_or(false, |unc| unc < uncertainty_limit)
        })
        .filter_map(|center| center.rmw.into_option())
        .filter(|&rmw| rmw != 0.0)
        .collect();

    mean(&rmws).map(some).unwrap_or_else(none)
}

/// The pressure retrieval at one height.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPressure {
    /// Height, km.
    pub level: f64,
    /// Pressure along the rings relative to the environment. None without a center or any wind.
    pub profile: Option<PressureProfile>,
    /// Central pressure anchored to the observations.
    pub central: CentralPressure,
    /// Spread under displacement of the center.
    pub uncertainty: PressureUncertainty,
}

impl LevelPressure {
    fn missing(level: f64) -> Self {
        LevelPressure {
            level,
            profile: None,
            central: CentralPressure::missing(),
            uncertainty: PressureUncertainty::missing(),
        }
    }

    /// Environmental pressure at the outer ring implied by the central pressure, hPa.
    pub fn outer_pressure(&self) -> Optioned<f64> {
        if self.central.pressure.is_some() && self.central.deficit.is_some() {
            some(self.central.pressure.unpack() + self.central.deficit.unpack())
        } else {
            none()
        }
    }
}

/// Derives pressure at every analysis height from a coefficient field.
#[derive(Debug, Clone)]
pub struct PressureRetrieval<'a> {
    config: &'a AnalysisConfig,
    extractor: FieldExtractor<'a>,
}

impl<'a> PressureRetrieval<'a> {
    /// Create a retrieval for the analysis parameters.
    pub fn new(config: &'a AnalysisConfig) -> Self {
        PressureRetrieval {
            config,
            extractor: FieldExtractor::new(config),
        }
    }

    /// The observation window for this analysis.
    pub fn window(&self) -> ObservationWindow {
        ObservationWindow {
            max_time_diff: self.config.max_obs_time_diff,
            max_radius: self.config.obs_radius_limit(),
        }
    }

    /// Retrieve the pressure at every height of `field`.
    ///
    /// `centers` is indexed like the heights of `field`. The uncertainty ensemble refits the rings
    /// of `grid` around displaced centers with the same `mean_wind_correction` used for `field`.
    pub fn retrieve(
        &self,
        grid: &dyn GriddedData,
        field: &CoefficientField,
        centers: &[Option<VortexCenter>],
        anchors: &PressureAnchors,
        mean_wind_correction: Option<f64>,
        cancel: &CancelToken,
    ) -> Result<Vec<LevelPressure>> {
        let mut levels = Vec::with_capacity(field.levels().len());

        for (hi, &level) in field.levels().iter().enumerate() {
            cancel.check()?;

            let center = match centers.get(hi).cloned().flatten() {
                Some(center) => center,
                None => {
                    debug!("No center at {} km, no pressure.", level);
                    levels.push(LevelPressure::missing(level));
                    continue;
                }
            };

            let mean_vt = field.radial_profile(hi, WindParameter::VTC0);
            if mean_vt.iter().all(|vt| vt.is_none()) {
                debug!("No tangential winds at {} km, no pressure.", level);
                levels.push(LevelPressure::missing(level));
                continue;
            }

            let coriolis = coriolis_parameter(center.location.lat);
            let profile = PressureProfile::integrate(field.radii(), &mean_vt, level, coriolis);
            let central = anchors.central_pressure(&profile, center.location);

            let uncertainty = if central.pressure.is_some() {
                let num_anchors = central.num_anchors;
                self.ensemble(grid, level, &center, num_anchors, anchors, mean_wind_correction)
            } else {
                PressureUncertainty::missing()
            };

            levels.push(LevelPressure {
                level,
                profile: Some(profile),
                central,
                uncertainty,
            });
        }

        info!(
            "Retrieved pressure at {} of {} heights.",
            levels.iter().filter(|lp| lp.central.pressure.is_some()).count(),
            levels.len()
        );

        Ok(levels)
    }

    fn perturbation_distance(&self, grid: &dyn GriddedData, center: &VortexCenter) -> f64 {
        match self.config.perturbation {
            UncertaintyPerturbation::Fixed(distance) => distance,
            UncertaintyPerturbation::CenterStdDev => center
                .center_std_dev
                .into_option()
                .filter(|&std| std > 0.0)
                .unwrap_or_else(|| {
                    let Km(spacing) = grid.grid_spacing();
                    spacing
                }),
        }
    }

    fn ensemble(
        &self,
        grid: &dyn GriddedData,
        level: f64,
        center: &VortexCenter,
        num_anchors: usize,
        anchors: &PressureAnchors,
        mean_wind_correction: Option<f64>,
    ) -> PressureUncertainty {
        let distance = self.perturbation_distance(grid, center);
        let radar = grid.radar_location();
        let radii = self.config.radii();

        let (pressures, deficits): (Vec<f64>, Vec<f64>) =
            perturbed_centers(center.x, center.y, distance)
                .par_iter()
                .filter_map(|&(x, y)| {
                    if !grid.contains(x, y, level) {
                        debug!(
                            "Displaced center ({:.1}, {:.1}) is outside the grid at {} km.",
                            x, y, level
                        );
                        return None;
                    }

                    let mean_vt: Vec<Optioned<f64>> = self
                        .extractor
                        .fit_height(grid, (x, y), level, mean_wind_correction)
                        .iter()
                        .map(|row| row.get(WindParameter::VTC0))
                        .collect();

                    let location = adjusted_lat_lon(radar, x, y);
                    let profile = PressureProfile::integrate(
                        &radii,
                        &mean_vt,
                        level,
                        coriolis_parameter(location.lat),
                    );
                    let member = anchors.central_pressure(&profile, location);

                    member
                        .pressure
                        .into_option()
                        .map(|pressure| (pressure, member.deficit.unwrap_or(0.0)))
                })
                .unzip();

        ensemble_uncertainty(&pressures, &deficits, num_anchors)
    }
}

/// Solve the thermal wind system over every height with a pressure profile.
///
/// The surface pressure of the reference atmosphere is the outer ring pressure at the lowest
/// height with a central pressure, or standard pressure when there is none.
pub fn thermal_field(levels: &[LevelPressure]) -> ThermalField {
    let surface_pressure = levels
        .iter()
        .map(LevelPressure::outer_pressure)
        .find(|p| p.is_some())
        .map(|p| p.unpack())
        .unwrap_or(STANDARD_PRESSURE);

    let heights: Vec<f64> = levels.iter().map(|lp| lp.level).collect();
    let profiles: Vec<Option<PressureProfile>> =
        levels.iter().map(|lp| lp.profile.clone()).collect();

    ThermalField::solve(&heights, &profiles, surface_pressure)
}
