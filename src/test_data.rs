//! Synthetic rings and vortices used in tests.
use crate::{analytic::AnalyticVortex, geo::GeoPoint, grid::RingSample};

/// Radar used by the synthetic vortices.
pub fn radar() -> GeoPoint {
    GeoPoint::new(25.0, -80.0)
}

/// A ring of Doppler velocities around (`center_x`, `center_y`) where the wind is given by
/// `winds(phi, radius) -> (tangential, radial)` with `phi` in radians counterclockwise from east
/// around the center.
pub fn sample_ring<F>(center_x: f64, center_y: f64, radius: f64, winds: F) -> RingSample
where
    F: Fn(f64, f64) -> (f64, f64),
{
    let mut ring = RingSample::new();
    for deg in 0..360 {
        let phi = (deg as f64).to_radians();
        let x = center_x + radius * phi.cos();
        let y = center_y + radius * phi.sin();
        let (vt, vr) = winds(phi, radius);

        let u = -vt * phi.sin() + vr * phi.cos();
        let v = vt * phi.cos() + vr * phi.sin();
        ring.push(deg as f64, (u * x + v * y) / x.hypot(y));
    }
    ring
}

/// A ring of Doppler velocities for a uniform wind `(u, v)`.
pub fn uniform_wind_ring(center_x: f64, center_y: f64, radius: f64, u: f64, v: f64) -> RingSample {
    let mut ring = RingSample::new();
    for deg in 0..360 {
        let phi = (deg as f64).to_radians();
        let x = center_x + radius * phi.cos();
        let y = center_y + radius * phi.sin();
        ring.push(deg as f64, (u * x + v * y) / x.hypot(y));
    }
    ring
}

/// Symmetric Rankine vortex, RMW 40 km and peak wind 50 m/s, about 90 km northeast of the radar.
pub fn rankine_vortex() -> AnalyticVortex {
    AnalyticVortex::new(radar(), 60.0, 70.0, 40.0, 50.0)
}
