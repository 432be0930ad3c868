#![warn(missing_docs)]
//! Center finding, wind decomposition and pressure retrieval for a vortex, such as a tropical
//! cyclone, observed by a single Doppler radar.
//!
//! Rings of radial velocity around a trial center are fit with a truncated Fourier series
//! ([`RingFitter`]), the center is found by maximizing the mean tangential wind from many starting
//! points ([`CenterSolver`]), every ring is then fit around the chosen centers
//! ([`FieldExtractor`]) and gradient wind balance gives the pressure deficit and central pressure
//! ([`PressureRetrieval`]). [`Analysis`] runs all of them on a volume, and [`AnalysisWorkers`] runs
//! them on a stream of volumes in the background.

//
// API
//
pub use crate::analytic::AnalyticVortex;
pub use crate::cancel::CancelToken;
pub use crate::center::{
    choose_centers, CenterEstimate, CenterField, CenterSolver, SimplexVertex, VortexCenter,
};
pub use crate::coefficients::{CoefficientField, CoefficientRow, WindCoefficient};
pub use crate::config::{
    AnalysisConfig, CenterWeights, UncertaintyPerturbation, MAX_STARTING_POINTS,
};
pub use crate::error::{AnalysisError, ConfigError, Result};
pub use crate::field::{ExtractedField, FieldExtractor};
pub use crate::geo::{adjusted_lat_lon, coriolis_parameter, km_per_degree, relative_xy, GeoPoint};
pub use crate::grid::{EnvironmentalWind, GriddedData, RingSample};
pub use crate::keys::{Closure, Geometry, WindParameter};
pub use crate::linear_solver::{least_squares, LeastSquares};
pub use crate::pipeline::{Analysis, AnalysisOutput, AnalysisWorkers, VolumeRequest};
pub use crate::pressure::{LevelPressure, PressureRetrieval, PressureProfile, ThermalField};
pub use crate::ring_fit::{RingFit, RingFitter};
pub use crate::trend::{IntensityTrend, Trend};
pub use crate::vortex::{PressureObservation, VortexLevel, VortexProfile};

pub mod pressure;

//
// Internal use only
//
mod analytic;
mod cancel;
mod center;
mod coefficients;
mod config;
mod error;
mod field;
mod geo;
mod grid;
mod keys;
mod linear_solver;
mod pipeline;
mod ring_fit;
mod trend;
mod utility;
mod vortex;

#[cfg(test)]
mod test_data;
