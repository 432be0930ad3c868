//! A synthetic vortex observed by a single Doppler radar.
//!
//! Useful as a stand-in for a real gridded radar volume when checking the analysis against a
//! known truth.
use crate::{
    error::{AnalysisError, Result},
    geo::{adjusted_lat_lon, relative_xy, GeoPoint},
    grid::{GriddedData, RingSample},
};
use metfor::Km;
use optional::{none, some, Optioned};
use std::f64::consts::PI;

const INNER_INFLOW_COEF: f64 = 0.1;
const OUTER_INFLOW_COEF: f64 = 3.0;

/// Rankine vortex with optional asymmetries, inflow and environmental wind.
///
/// Positions are in km relative to the radar, x east and y north. Ring azimuths are whole
/// degrees around the query center.
///
/// # Examples
///
/// ```rust
/// use vortex_analysis::{AnalyticVortex, GeoPoint, GriddedData};
///
/// let vortex = AnalyticVortex::new(GeoPoint::new(25.0, -80.0), 60.0, 40.0, 40.0, 50.0)
///     .with_environmental_wind(3.0, -2.0);
///
/// let ring = vortex.ring(60.0, 40.0, 40.0, 2.0).unwrap();
/// assert_eq!(ring.len(), 360);
/// assert!(vortex.ring(900.0, 0.0, 10.0, 2.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticVortex {
    radar: GeoPoint,
    center_x: f64,
    center_y: f64,
    rmw: f64,
    vmax: f64,
    asymmetries: Vec<(f64, f64)>,
    inflow: bool,
    environmental_wind: (f64, f64),
    vertical_decay: Option<f64>,
    max_range: f64,
    extent: f64,
    max_height: f64,
    blocked: Option<(f64, f64)>,
    spacing: f64,
}

impl AnalyticVortex {
    /// A symmetric vortex centered at (`center_x`, `center_y`) km from the radar with radius of
    /// maximum wind `rmw` km and peak tangential wind `vmax` m/s.
    pub fn new(radar: GeoPoint, center_x: f64, center_y: f64, rmw: f64, vmax: f64) -> Self {
        AnalyticVortex {
            radar,
            center_x,
            center_y,
            rmw,
            vmax,
            asymmetries: vec![],
            inflow: false,
            environmental_wind: (0.0, 0.0),
            vertical_decay: None,
            max_range: 250.0,
            extent: 250.0,
            max_height: 20.0,
            blocked: None,
            spacing: 1.0,
        }
    }

    /// Same as `new` with the center given as a latitude and longitude.
    pub fn centered_at(radar: GeoPoint, center: GeoPoint, rmw: f64, vmax: f64) -> Self {
        let (x, y) = relative_xy(radar, center);
        Self::new(radar, x, y, rmw, vmax)
    }

    /// Add a tangential wind asymmetry for the next wavenumber peaking at `phase` degrees around
    /// the center. It follows the symmetric profile and equals `amplitude` m/s at the RMW.
    pub fn with_asymmetry(mut self, amplitude: f64, phase: f64) -> Self {
        self.asymmetries.push((amplitude, phase.to_radians()));
        self
    }

    /// Add a radial wind, outflow inside the RMW and inflow outside.
    pub fn with_inflow(mut self) -> Self {
        self.inflow = true;
        self
    }

    /// Add a uniform wind with components `u` east and `v` north, m/s.
    pub fn with_environmental_wind(mut self, u: f64, v: f64) -> Self {
        self.environmental_wind = (u, v);
        self
    }

    /// Decay the vortex winds with height as `exp(-h / scale)`, `scale` in km.
    pub fn with_vertical_decay(mut self, scale: f64) -> Self {
        self.vertical_decay = Some(scale);
        self
    }

    /// Report `spacing` km between grid points.
    pub fn with_grid_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Treat everything beyond `max_range` km from the radar as missing.
    pub fn with_max_range(mut self, max_range: f64) -> Self {
        self.max_range = max_range;
        self
    }

    /// Blank radar azimuths from `start` to `end` degrees, counterclockwise from east.
    pub fn with_blocked_sector(mut self, start: f64, end: f64) -> Self {
        self.blocked = Some((start.rem_euclid(360.0), end.rem_euclid(360.0)));
        self
    }

    /// True center as km east and north of the radar.
    pub fn center_xy(&self) -> (f64, f64) {
        (self.center_x, self.center_y)
    }

    /// True center as a latitude and longitude.
    pub fn center(&self) -> GeoPoint {
        adjusted_lat_lon(self.radar, self.center_x, self.center_y)
    }

    /// Symmetric tangential wind at `r` km from the center and `height` km, m/s.
    pub fn tangential_wind(&self, r: f64, height: f64) -> f64 {
        let vt = if r > self.rmw {
            self.vmax * self.rmw / r
        } else {
            self.vmax * r / self.rmw
        };

        vt * self.decay(height)
    }

    fn decay(&self, height: f64) -> f64 {
        self.vertical_decay.map_or(1.0, |scale| (-height / scale).exp())
    }

    fn radial_wind(&self, r: f64, height: f64) -> f64 {
        if !self.inflow {
            return 0.0;
        }

        let vr = if r > self.rmw {
            -OUTER_INFLOW_COEF * (r - self.rmw).sqrt() * self.rmw / r
        } else {
            INNER_INFLOW_COEF * ((self.rmw - r) * r).sqrt()
        };

        vr * self.decay(height)
    }

    /// Doppler velocity at a point, positive away from the radar.
    pub fn radial_velocity(&self, x: f64, y: f64, height: f64) -> Optioned<f64> {
        let range = x.hypot(y);
        if range <= 0.0 || range > self.max_range || !self.contains(x, y, height) {
            return none();
        }

        if let Some((start, end)) = self.blocked {
            let az = y.atan2(x).to_degrees().rem_euclid(360.0);
            let inside = if start <= end {
                az >= start && az <= end
            } else {
                az >= start || az <= end
            };
            if inside {
                return none();
            }
        }

        let dx = x - self.center_x;
        let dy = y - self.center_y;
        let r = dx.hypot(dy);
        let phi = dy.atan2(dx);

        let mut vt = self.tangential_wind(r, height);
        if r > 0.0 {
            let scale = vt / self.vmax.max(f64::EPSILON);
            for (i, &(amplitude, phase)) in self.asymmetries.iter().enumerate() {
                let k = (i + 1) as f64;
                vt += scale * amplitude * (k * (phi - phase)).cos();
            }
        }
        let vr = self.radial_wind(r, height);

        let (u_env, v_env) = self.environmental_wind;
        let u = -vt * phi.sin() + vr * phi.cos() + u_env;
        let v = vt * phi.cos() + vr * phi.sin() + v_env;

        some((u * x + v * y) / range)
    }
}

impl GriddedData for AnalyticVortex {
    fn ring(&self, center_x: f64, center_y: f64, radius: f64, height: f64) -> Result<RingSample> {
        if !self.contains(center_x, center_y, height) {
            return Err(AnalysisError::OutOfBounds);
        }

        let mut ring = RingSample::new();
        for deg in 0..360 {
            let az = deg as f64;
            let angle = az * PI / 180.0;
            let x = center_x + radius * angle.cos();
            let y = center_y + radius * angle.sin();
            ring.push(az, self.radial_velocity(x, y, height));
        }

        Ok(ring)
    }

    fn contains(&self, x: f64, y: f64, height: f64) -> bool {
        x.abs() <= self.extent
            && y.abs() <= self.extent
            && height >= 0.0
            && height <= self.max_height
    }

    fn radar_location(&self) -> GeoPoint {
        self.radar
    }

    fn grid_spacing(&self) -> Km {
        Km(self.spacing)
    }
}
