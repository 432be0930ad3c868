//! Run every stage of the analysis on one radar volume.
use crate::{
    cancel::CancelToken,
    center::{choose_centers, CenterSolver, VortexCenter},
    config::AnalysisConfig,
    error::Result,
    field::FieldExtractor,
    geo::{relative_xy, GeoPoint},
    grid::{EnvironmentalWind, GriddedData},
    keys::Closure,
    pressure::{average_rmw, thermal_field, PressureAnchors, PressureRetrieval},
    utility::mean,
    vortex::{PressureObservation, VortexLevel, VortexProfile},
};
use chrono::NaiveDateTime;
use itertools::izip;
use log::{info, warn};
use metfor::{Km, Quantity};
use optional::{none, some, Optioned};
use std::{fmt, sync::Arc};

pub use self::workers::{AnalysisOutput, AnalysisWorkers, VolumeRequest};

mod workers;

/// The analysis of radar volumes with fixed parameters.
#[derive(Clone)]
pub struct Analysis {
    config: AnalysisConfig,
    environmental_pressure: Option<f64>,
    environmental_wind: Option<Arc<dyn EnvironmentalWind>>,
}

impl fmt::Debug for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Analysis")
            .field("config", &self.config)
            .field("environmental_pressure", &self.environmental_pressure)
            .field("environmental_wind", &self.environmental_wind.is_some())
            .finish()
    }
}

impl Analysis {
    /// Create an analysis, failing if the configuration is invalid.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        Ok(Analysis {
            config,
            environmental_pressure: None,
            environmental_wind: None,
        })
    }

    /// Anchor the central pressure to a far field pressure in hPa as well as the observations.
    pub fn with_environmental_pressure(mut self, pressure: f64) -> Self {
        self.environmental_pressure = Some(pressure);
        self
    }

    /// Estimator for the environmental wind removed under the `hvvp` closure.
    pub fn with_environmental_wind(mut self, estimator: Arc<dyn EnvironmentalWind>) -> Self {
        self.environmental_wind = Some(estimator);
        self
    }

    /// The analysis parameters.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one volume from start to finish.
    ///
    /// `first_guess` seeds the center search. Returns `Err(Cancelled)` with no partial output if
    /// `cancel` is set before the run finishes.
    pub fn run_volume(
        &self,
        grid: &dyn GriddedData,
        first_guess: GeoPoint,
        volume_time: NaiveDateTime,
        observations: &[PressureObservation],
        cancel: &CancelToken,
    ) -> Result<VortexProfile> {
        let centers = self.find_centers(grid, first_guess, cancel)?;
        cancel.check()?;
        self.analyze_vortex(grid, &centers, volume_time, observations, cancel)
    }

    /// Search for the center and choose one for every height.
    pub fn find_centers(
        &self,
        grid: &dyn GriddedData,
        first_guess: GeoPoint,
        cancel: &CancelToken,
    ) -> Result<Vec<Option<VortexCenter>>> {
        let radar = grid.radar_location();
        let guess = relative_xy(radar, first_guess);

        let field = CenterSolver::new(&self.config).solve(grid, guess, cancel)?;
        cancel.check()?;

        Ok(choose_centers(&field, &self.config, radar, guess))
    }

    /// Extract the wind field and retrieve the pressure around known centers.
    pub fn analyze_vortex(
        &self,
        grid: &dyn GriddedData,
        centers: &[Option<VortexCenter>],
        volume_time: NaiveDateTime,
        observations: &[PressureObservation],
        cancel: &CancelToken,
    ) -> Result<VortexProfile> {
        let config = &self.config;

        let rmw = average_rmw(centers, config.rmw_uncertainty_limit);
        let mean_wind_correction = self.mean_wind_correction(grid, centers, rmw);

        let xy: Vec<Option<(f64, f64)>> = centers.iter().map(|c| c.map(|c| (c.x, c.y))).collect();
        let field = FieldExtractor::new(config).extract(grid, &xy, mean_wind_correction, cancel)?;

        let retrieval = PressureRetrieval::new(config);
        let anchors = PressureAnchors {
            volume_time,
            observations,
            environmental_pressure: self.environmental_pressure,
            window: retrieval.window(),
        };
        let pressures = retrieval.retrieve(
            grid,
            &field.coefficients,
            centers,
            &anchors,
            mean_wind_correction,
            cancel,
        )?;

        let thermal = if config.thermal_wind {
            Some(thermal_field(&pressures))
        } else {
            None
        };

        let levels: Vec<VortexLevel> = izip!(centers, pressures)
            .map(|(&center, pressure)| VortexLevel::new(center, pressure, grid.grid_spacing()))
            .collect();

        let profile = VortexProfile {
            time: volume_time,
            average_rmw_uncertainty: average_rmw_uncertainty(&levels, config.rmw_uncertainty_limit),
            levels,
            coefficients: field.coefficients,
            max_valid_radius: field.max_valid_radius.map_t(Km),
            average_rmw: rmw.map_t(Km),
            thermal,
            first_guess: centers.iter().flatten().any(|c| c.first_guess),
        };

        match profile.central_pressure().into_option() {
            Some(pressure) => info!(
                "Volume {} central pressure {:.1} hPa.",
                volume_time,
                pressure.unpack()
            ),
            None => warn!("Volume {} has no central pressure.", volume_time),
        }

        Ok(profile)
    }

    /// Environmental wind for the `hvvp` closure, estimated at the lowest center.
    fn mean_wind_correction(
        &self,
        grid: &dyn GriddedData,
        centers: &[Option<VortexCenter>],
        rmw: Optioned<f64>,
    ) -> Option<f64> {
        if self.config.closure != Closure::Hvvp {
            return None;
        }

        let estimator = match &self.environmental_wind {
            Some(estimator) => estimator,
            None => {
                warn!("No environmental wind estimator, hvvp closure runs uncorrected.");
                return None;
            }
        };

        let (center, rmw) = match (centers.iter().flatten().next(), rmw.into_option()) {
            (Some(center), Some(rmw)) => (center, rmw),
            _ => {
                warn!("No center or average RMW, hvvp closure runs uncorrected.");
                return None;
            }
        };

        let range = center.x.hypot(center.y);
        let bearing = center.x.atan2(center.y).to_degrees();

        match estimator.estimate(grid, range, bearing, rmw) {
            Ok((wind, std_err)) if wind.is_finite() && std_err.is_finite() => {
                info!("Environmental wind {:.2} +/- {:.2} m/s.", wind, std_err.abs());
                Some(wind)
            }
            Ok(_) => {
                warn!("Environmental wind estimate is not finite, hvvp closure runs uncorrected.");
                None
            }
            Err(err) => {
                warn!("Environmental wind estimate failed: {}", err);
                None
            }
        }
    }
}

fn average_rmw_uncertainty(levels: &[VortexLevel], limit: f64) -> Optioned<Km> {
    let vals: Vec<f64> = levels
        .iter()
        .filter(|lvl| lvl.rmw.map_or(false, |rmw| rmw > Km(0.0)))
        .filter_map(|lvl| lvl.rmw_uncertainty.into_option())
        .map(|Km(unc)| unc)
        .filter(|unc| unc.abs() < limit)
        .collect();

    mean(&vals).map(|unc| some(Km(unc))).unwrap_or_else(none)
}
