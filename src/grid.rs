//! Read-only access to gridded radial velocities.
//!
//! The analysis never builds or resamples grids itself. It asks a provider for rings of samples
//! around trial centers, with positions in km relative to the radar.
use crate::{error::Result, geo::GeoPoint};
use metfor::Km;
use optional::Optioned;

/// Radial velocity samples on one ring around a center.
///
/// Azimuths are in degrees, counterclockwise from east, measured around the ring's center.
/// Missing velocities are none. The order of the samples is irrelevant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingSample {
    azimuths: Vec<f64>,
    velocities: Vec<Optioned<f64>>,
}

impl RingSample {
    /// Create an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ring from parallel vectors. The shorter of the two sets the length.
    pub fn from_parts(mut azimuths: Vec<f64>, mut velocities: Vec<Optioned<f64>>) -> Self {
        let len = azimuths.len().min(velocities.len());
        azimuths.truncate(len);
        velocities.truncate(len);

        RingSample {
            azimuths,
            velocities,
        }
    }

    /// Add a sample.
    pub fn push<T>(&mut self, azimuth: f64, velocity: T)
    where
        Optioned<f64>: From<T>,
    {
        self.azimuths.push(azimuth);
        self.velocities.push(Optioned::from(velocity));
    }

    /// Number of samples, including missing ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.azimuths.len()
    }

    /// Whether there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.azimuths.is_empty()
    }

    /// Iterate over the non-missing samples as (azimuth, velocity) pairs.
    pub fn valid(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.azimuths
            .iter()
            .zip(&self.velocities)
            .filter(|(_, v)| v.is_some())
            .map(|(&az, v)| (az, v.unpack()))
    }
}

/// A source of radial velocity rings, such as a radar volume interpolated to a Cartesian grid.
///
/// Implementations are shared read-only between worker threads.
pub trait GriddedData: Sync + Send {
    /// Samples on a ring of `radius` km around (`center_x`, `center_y`) at `height` km.
    ///
    /// Fails with `OutOfBounds` if the center is outside the grid.
    fn ring(&self, center_x: f64, center_y: f64, radius: f64, height: f64) -> Result<RingSample>;

    /// Whether the point is inside the grid.
    fn contains(&self, x: f64, y: f64, height: f64) -> bool;

    /// Location of the radar, the origin of the Cartesian coordinates.
    fn radar_location(&self) -> GeoPoint;

    /// Spacing between grid points.
    fn grid_spacing(&self) -> Km;
}

/// Estimate of the environmental wind used by the `hvvp` closure.
pub trait EnvironmentalWind: Sync + Send {
    /// Mean cross beam wind and its standard error in m/s for a vortex at `range` km and
    /// `bearing` (degrees clockwise from north) from the radar with radius of maximum wind `rmw`
    /// km.
    fn estimate(
        &self,
        grid: &dyn GriddedData,
        range: f64,
        bearing: f64,
        rmw: f64,
    ) -> Result<(f64, f64)>;
}
