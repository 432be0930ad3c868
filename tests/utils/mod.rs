use chrono::{Duration, NaiveDate, NaiveDateTime};
use vortex_analysis::{adjusted_lat_lon, AnalysisConfig, AnalyticVortex, GeoPoint, GriddedData};

pub mod center_checks;
pub mod pressure_checks;

/// Generate the end to end checks for a symmetric Rankine vortex.
#[allow(unused_macros)]
macro_rules! rankine_scenario {
    ($name:ident, $x:expr, $y:expr, $rmw:expr, $vmax:expr) => {
        mod $name {
            use super::utils;

            fn scenario() -> utils::Scenario {
                utils::Scenario::new($x, $y, $rmw, $vmax)
            }

            #[test]
            fn center_within_one_grid_cell() {
                utils::center_checks::center_within_one_grid_cell(&scenario());
            }

            #[test]
            fn rmw_recovered() {
                utils::center_checks::rmw_recovered(&scenario());
            }

            #[test]
            fn deficit_monotone_and_deep() {
                utils::pressure_checks::deficit_monotone_and_deep(&scenario());
            }

            #[test]
            fn symmetric_ensemble_agrees() {
                utils::pressure_checks::symmetric_ensemble_agrees(&scenario());
            }
        }
    };
}

/// A synthetic vortex and the analysis parameters suited to it.
pub struct Scenario {
    pub vortex: AnalyticVortex,
    pub rmw: f64,
    pub vmax: f64,
}

impl Scenario {
    pub fn new(x: f64, y: f64, rmw: f64, vmax: f64) -> Self {
        Scenario {
            vortex: AnalyticVortex::new(radar(), x, y, rmw, vmax),
            rmw,
            vmax,
        }
    }

    pub fn config(&self) -> AnalysisConfig {
        AnalysisConfig::default()
            .with_levels(1.0, 2.0)
            .with_radii(5.0, 70.0)
            .with_search_radii(self.rmw - 2.0, self.rmw + 2.0)
            .with_search_box(8.0, 4.0)
            .with_num_points(9)
    }

    /// A first guess a few km off the true center.
    pub fn first_guess(&self) -> GeoPoint {
        let (x, y) = self.vortex.center_xy();
        adjusted_lat_lon(self.vortex.radar_location(), x + 2.5, y - 2.0)
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn radar() -> GeoPoint {
    GeoPoint::new(27.7, -82.4)
}

pub fn volume_time(minutes: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 9, 10)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
        + Duration::minutes(minutes)
}
