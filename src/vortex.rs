//! The published state of a vortex for one radar volume.
use crate::{
    center::VortexCenter,
    coefficients::{CoefficientField, CoefficientRow},
    geo::GeoPoint,
    pressure::{LevelPressure, PressureProfile, ThermalField},
};
use chrono::NaiveDateTime;
use metfor::{HectoPascal, Km, MetersPSec};
use optional::{none, Optioned};
use serde::{Deserialize, Serialize};

/// A surface pressure observation near the vortex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureObservation {
    /// Station identifier, for logging.
    pub station_id: String,
    /// Valid time.
    pub time: NaiveDateTime,
    /// Station location.
    pub location: GeoPoint,
    /// Sea level pressure, hPa. Non-positive values are treated as missing.
    pub pressure: f64,
}

/// The vortex at one analysis height.
#[derive(Debug, Clone, PartialEq)]
pub struct VortexLevel {
    /// Height above the radar.
    pub height: Km,
    /// The chosen center, if any.
    pub center: Option<VortexCenter>,
    /// Radius of maximum wind.
    pub rmw: Optioned<Km>,
    /// Uncertainty of the RMW, never less than half the grid spacing.
    pub rmw_uncertainty: Optioned<Km>,
    /// Mean tangential wind at the RMW.
    pub max_wind: Optioned<MetersPSec>,
    /// Pressure along the rings relative to the environment.
    pub pressure_profile: Option<PressureProfile>,
    /// Central pressure.
    pub central_pressure: Optioned<HectoPascal>,
    /// Pressure rise from the center to the outer ring.
    pub pressure_deficit: Optioned<HectoPascal>,
    /// Uncertainty of the central pressure.
    pub pressure_uncertainty: Optioned<HectoPascal>,
    /// Uncertainty of the pressure deficit.
    pub deficit_uncertainty: Optioned<HectoPascal>,
    /// Number of observations that anchored the central pressure.
    pub num_anchors: usize,
}

impl VortexLevel {
    pub(crate) fn new(
        center: Option<VortexCenter>,
        pressure: LevelPressure,
        grid_spacing: Km,
    ) -> Self {
        let Km(spacing) = grid_spacing;
        let rmw = center.map_or_else(none, |c| c.rmw);
        let rmw_uncertainty = center
            .map_or_else(none, |c| c.rmw_uncertainty)
            .map_t(|unc| unc.max(spacing / 2.0));

        VortexLevel {
            height: Km(pressure.level),
            center,
            rmw: rmw.map_t(Km),
            rmw_uncertainty: rmw_uncertainty.map_t(Km),
            max_wind: center.map_or_else(none, |c| c.max_vt).map_t(MetersPSec),
            pressure_profile: pressure.profile,
            central_pressure: pressure.central.pressure.map_t(HectoPascal),
            pressure_deficit: pressure.central.deficit.map_t(HectoPascal),
            pressure_uncertainty: pressure.uncertainty.pressure.map_t(HectoPascal),
            deficit_uncertainty: pressure.uncertainty.deficit.map_t(HectoPascal),
            num_anchors: pressure.central.num_anchors,
        }
    }

    /// Geographic position of the center.
    pub fn location(&self) -> Option<GeoPoint> {
        self.center.map(|c| c.location)
    }
}

/// Center, wind decomposition and pressure of a vortex for one radar volume.
///
/// Summary values such as [`VortexProfile::central_pressure`] come from the lowest height that
/// has a central pressure.
#[derive(Debug, Clone, PartialEq)]
pub struct VortexProfile {
    /// Time of the radar volume.
    pub time: NaiveDateTime,
    /// One entry per analysis height, bottom up.
    pub levels: Vec<VortexLevel>,
    /// Wind coefficients on every (height, ring) cell.
    pub coefficients: CoefficientField,
    /// Largest radius with a tangential wind at any height.
    pub max_valid_radius: Optioned<Km>,
    /// RMW averaged over heights where it is well determined.
    pub average_rmw: Optioned<Km>,
    /// Mean RMW uncertainty over the same heights.
    pub average_rmw_uncertainty: Optioned<Km>,
    /// Pressure, density and temperature perturbations, when requested.
    pub thermal: Option<ThermalField>,
    /// Too few cells converged and the first guess center was used at every height.
    pub first_guess: bool,
}

impl VortexProfile {
    fn summary_level(&self) -> Option<&VortexLevel> {
        self.levels.iter().find(|lvl| lvl.central_pressure.is_some())
    }

    /// Central pressure at the lowest height with one.
    pub fn central_pressure(&self) -> Optioned<HectoPascal> {
        self.summary_level()
            .map_or_else(none, |lvl| lvl.central_pressure)
    }

    /// Pressure deficit at the lowest height with a central pressure.
    pub fn pressure_deficit(&self) -> Optioned<HectoPascal> {
        self.summary_level()
            .map_or_else(none, |lvl| lvl.pressure_deficit)
    }

    /// Uncertainty of [`VortexProfile::central_pressure`].
    pub fn pressure_uncertainty(&self) -> Optioned<HectoPascal> {
        self.summary_level()
            .map_or_else(none, |lvl| lvl.pressure_uncertainty)
    }

    /// Center of the lowest height with one.
    pub fn center(&self) -> Option<GeoPoint> {
        self.levels.iter().find_map(VortexLevel::location)
    }

    /// The level at `height` km.
    pub fn level(&self, height: Km) -> Option<&VortexLevel> {
        self.levels.iter().find(|lvl| lvl.height == height)
    }

    /// Coefficient row at a height and ring index.
    pub fn coefficients_at(
        &self,
        height_index: usize,
        ring_index: usize,
    ) -> Option<&CoefficientRow> {
        self.coefficients.get(height_index, ring_index)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pressure::{CentralPressure, PressureUncertainty};
    use chrono::NaiveDate;
    use optional::some;

    fn center(level: f64) -> VortexCenter {
        VortexCenter {
            level,
            x: 60.0,
            y: 70.0,
            location: GeoPoint::new(26.0, -80.0),
            rmw: some(40.0),
            rmw_uncertainty: some(0.0),
            max_vt: some(50.0),
            center_std_dev: some(0.2),
            num_converging: 20,
            first_guess: false,
        }
    }

    fn level_pressure(level: f64, pressure: Optioned<f64>) -> LevelPressure {
        LevelPressure {
            level,
            profile: None,
            central: CentralPressure {
                pressure,
                deficit: pressure.map_t(|p| 1013.0 - p),
                num_anchors: 0,
            },
            uncertainty: PressureUncertainty::missing(),
        }
    }

    #[test]
    fn test_rmw_uncertainty_floor() {
        let level = VortexLevel::new(Some(center(1.0)), level_pressure(1.0, some(960.0)), Km(1.0));
        assert_eq!(level.rmw, some(Km(40.0)));
        assert_eq!(level.rmw_uncertainty, some(Km(0.5)));
        assert_eq!(level.max_wind, some(MetersPSec(50.0)));

        let no_center = VortexLevel::new(None, level_pressure(2.0, none()), Km(1.0));
        assert!(no_center.rmw_uncertainty.is_none());
        assert!(no_center.location().is_none());
    }

    #[test]
    fn test_summary_from_lowest_level() {
        let levels = vec![
            VortexLevel::new(None, level_pressure(1.0, none()), Km(1.0)),
            VortexLevel::new(Some(center(2.0)), level_pressure(2.0, some(955.0)), Km(1.0)),
            VortexLevel::new(Some(center(3.0)), level_pressure(3.0, some(965.0)), Km(1.0)),
        ];

        let profile = VortexProfile {
            time: NaiveDate::from_ymd_opt(2021, 8, 29)
                .and_then(|d| d.and_hms_opt(16, 0, 0))
                .unwrap(),
            levels,
            coefficients: CoefficientField::new(vec![1.0, 2.0, 3.0], vec![5.0, 6.0], 3),
            max_valid_radius: none(),
            average_rmw: some(Km(40.0)),
            average_rmw_uncertainty: some(Km(0.5)),
            thermal: None,
            first_guess: false,
        };

        assert_eq!(profile.central_pressure(), some(HectoPascal(955.0)));
        assert_eq!(profile.pressure_deficit(), some(HectoPascal(58.0)));
        assert!(profile.pressure_uncertainty().is_none());
        assert_eq!(profile.center(), Some(GeoPoint::new(26.0, -80.0)));
        assert!(profile.level(Km(3.0)).is_some());
        assert!(profile.level(Km(7.0)).is_none());
        assert!(profile.coefficients_at(1, 1).is_some());
    }
}
