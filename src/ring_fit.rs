//! Decompose a ring of radial velocities into tangential, radial and mean wind coefficients.
//!
//! A ring is first mapped onto storm relative angles, then fit with a Fourier series truncated to
//! what its azimuthal coverage supports, and finally the Fourier coefficients are converted to
//! named winds by the closure of the chosen geometry.
use crate::{
    coefficients::CoefficientRow,
    config::AnalysisConfig,
    error::{AnalysisError, Result},
    geo::fix_angle,
    grid::RingSample,
    keys::{Closure, Geometry, WindParameter},
    linear_solver::least_squares,
};

use self::closure::{ClosureStrategy, FourierSeries, RingGeometry};

mod closure;
mod truncation;

/// Outcome of a successful ring fit.
#[derive(Debug, Clone, PartialEq)]
pub struct RingFit {
    /// Named wind coefficients.
    pub coefficients: CoefficientRow,
    /// Standard deviation of the regression residuals, m/s.
    pub std_dev: f64,
    /// Number of Fourier coefficients fit after truncation.
    pub num_coefficients: usize,
    /// Fourier coefficients ordered `[A0, B1, A1, B2, A2, ...]`.
    pub fourier: Vec<f64>,
}

impl RingFit {
    /// Mean tangential wind, m/s.
    pub fn mean_tangential_wind(&self) -> f64 {
        self.coefficients.get(WindParameter::VTC0).unwrap_or(0.0)
    }
}

/// Fits rings with a fixed geometry, closure and truncation policy.
#[derive(Debug, Clone)]
pub struct RingFitter {
    geometry: Geometry,
    closure: Closure,
    max_wavenumber: u8,
    gaps: Vec<f64>,
}

impl RingFitter {
    /// Create a fitter from the analysis parameters.
    pub fn new(config: &AnalysisConfig) -> Self {
        RingFitter {
            geometry: config.geometry,
            closure: config.closure,
            max_wavenumber: config.max_wavenumber,
            gaps: config.data_gaps(),
        }
    }

    /// Highest tangential asymmetry resolved by this fitter.
    pub fn max_wavenumber(&self) -> u8 {
        self.max_wavenumber
    }

    /// Fit one ring of `radius` km at `height` km around the center (`center_x`, `center_y`),
    /// in km from the radar.
    ///
    /// `mean_wind_correction` is the environmental wind removed under the `hvvp` closure, it is
    /// ignored by every other closure.
    ///
    /// Fails with `NotEnoughData` when the coverage or number of samples can not support even
    /// the mean, with `SingularMatrix` when the regression is degenerate, and with `OutOfBounds`
    /// when the center sits on the radar.
    pub fn fit(
        &self,
        center_x: f64,
        center_y: f64,
        radius: f64,
        height: f64,
        ring: &RingSample,
        mean_wind_correction: Option<f64>,
    ) -> Result<RingFit> {
        let center_distance = center_x.hypot(center_y);
        if center_distance <= 0.0 {
            return Err(AnalysisError::OutOfBounds);
        }

        let (psi, vel) = self.storm_relative(center_x, center_y, radius, ring);

        let num_coefficients = truncation::num_coefficients(&psi, self.max_wavenumber, &self.gaps);
        if num_coefficients == 0 {
            return Err(AnalysisError::NotEnoughData);
        }

        let (fourier, std_dev) = fourier_fit(&psi, &vel, num_coefficients)?;

        let strategy = match (self.geometry, self.closure) {
            (Geometry::Gbvtd, Closure::Hvvp) => ClosureStrategy::Gbvtd(mean_wind_correction),
            (Geometry::Gbvtd, Closure::Original) => ClosureStrategy::Gbvtd(None),
            (Geometry::Gvtd, _) => ClosureStrategy::Gvtd,
        };

        let geometry = RingGeometry {
            level: height,
            radius,
            center_distance,
        };
        let series = FourierSeries::new(&fourier, self.max_wavenumber);
        let coefficients = strategy.name(&series, geometry, self.max_wavenumber);

        Ok(RingFit {
            coefficients,
            std_dev,
            num_coefficients,
            fourier,
        })
    }

    /// Storm relative angle (radians) and velocity of every valid sample.
    fn storm_relative(
        &self,
        center_x: f64,
        center_y: f64,
        radius: f64,
        ring: &RingSample,
    ) -> (Vec<f64>, Vec<f64>) {
        let theta_t = fix_angle(center_y.atan2(center_x));
        let center_distance = center_x.hypot(center_y);

        ring.valid()
            .map(|(azimuth, velocity)| {
                let angle = fix_angle(azimuth.to_radians() - theta_t);
                let x = center_x + radius * (angle + theta_t).cos();
                let y = center_y + radius * (angle + theta_t).sin();

                match self.geometry {
                    Geometry::Gbvtd => {
                        let psi = fix_angle(angle - (y.atan2(x) - theta_t));
                        (psi, velocity)
                    }
                    Geometry::Gvtd => (angle, velocity * x.hypot(y) / center_distance),
                }
            })
            .unzip()
    }
}

/// Least squares fit of `vel(psi)` with `num_coefficients` Fourier terms.
///
/// Returns coefficients ordered `[A0, B1, A1, B2, A2, ...]` and the residual standard deviation.
fn fourier_fit(psi: &[f64], vel: &[f64], num_coefficients: usize) -> Result<(Vec<f64>, f64)> {
    let mut design = Vec::with_capacity(num_coefficients);
    design.push(vec![1.0; psi.len()]);
    for k in 1..=(num_coefficients - 1) / 2 {
        let k = k as f64;
        design.push(psi.iter().map(|p| (k * p).sin()).collect());
        design.push(psi.iter().map(|p| (k * p).cos()).collect());
    }

    let fit = least_squares(&design, vel)?;
    Ok((fit.coefficients, fit.std_dev))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data::{sample_ring, uniform_wind_ring};
    use crate::utility::test_tools::*;
    use optional::none;
    use rand::{rngs::StdRng, SeedableRng};
    use rand_distr::{Distribution, Normal};

    #[test]
    fn test_recover_fourier_series() {
        let psi: Vec<f64> = (0..360).map(|d| (d as f64 + 0.3).to_radians()).collect();
        let truth = [12.0, -35.0, 4.0, 6.0, -2.5, 1.5, 0.75];
        let vel: Vec<f64> = psi
            .iter()
            .map(|p| {
                truth[0]
                    + truth[1] * p.sin()
                    + truth[2] * p.cos()
                    + truth[3] * (2.0 * p).sin()
                    + truth[4] * (2.0 * p).cos()
                    + truth[5] * (3.0 * p).sin()
                    + truth[6] * (3.0 * p).cos()
            })
            .collect();

        let (fit, std_dev) = fourier_fit(&psi, &vel, 7).unwrap();
        for (fitted, expected) in fit.iter().zip(&truth) {
            assert!(approx_equal(*fitted, *expected, 1.0e-9));
        }
        assert!(std_dev < 1.0e-9);
    }

    #[test]
    fn test_symmetric_vortex_both_geometries() {
        for &geometry in &[Geometry::Gbvtd, Geometry::Gvtd] {
            let config = AnalysisConfig::default().with_geometry(geometry);
            let fitter = RingFitter::new(&config);

            let ring = sample_ring(60.0, -35.0, 25.0, |_, _| (45.0, -4.0));
            let fit = fitter.fit(60.0, -35.0, 25.0, 2.0, &ring, None).unwrap();

            let vt = fit.coefficients.get(WindParameter::VTC0).unpack();
            let vr = fit.coefficients.get(WindParameter::VRC0).unpack();
            assert!(approx_equal(vt, 45.0, 1.0e-6), "{} {}", geometry, vt);
            assert!(approx_equal(vr, -4.0, 1.0e-6), "{} {}", geometry, vr);
            assert!(fit.std_dev < 1.0e-6);
            assert_eq!(fit.num_coefficients, 9);
            assert_eq!(fit.coefficients.level(), 2.0);
        }
    }

    #[test]
    fn test_wavenumber_one_asymmetry() {
        let config = AnalysisConfig::default().with_geometry(Geometry::Gvtd);
        let fitter = RingFitter::new(&config);

        // Tangential wind 40 + 10 cos(theta') where theta' is measured from the radar to center
        // line.
        let theta_t = (-20.0f64).atan2(-70.0);
        let ring = sample_ring(-70.0, -20.0, 20.0, |phi, _| {
            (40.0 + 10.0 * (phi - theta_t).cos(), 0.0)
        });
        let fit = fitter.fit(-70.0, -20.0, 20.0, 1.0, &ring, None).unwrap();

        let vt = fit.coefficients.get(WindParameter::VTC0).unpack();
        let vtc1 = fit.coefficients.get(WindParameter::VTC(1)).unpack();
        assert!(approx_equal(vt, 40.0, 1.0e-6));
        assert!(approx_equal(vtc1, 10.0, 1.0e-6));
    }

    #[test]
    fn test_noisy_ring() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 1.0).unwrap();

        let config = AnalysisConfig::default();
        let fitter = RingFitter::new(&config);

        let clean = sample_ring(40.0, 50.0, 30.0, |_, _| (50.0, 0.0));
        let mut noisy = RingSample::new();
        for (az, v) in clean.valid() {
            noisy.push(az, v + noise.sample(&mut rng));
        }

        let fit = fitter.fit(40.0, 50.0, 30.0, 1.0, &noisy, None).unwrap();
        assert!(approx_equal(fit.mean_tangential_wind(), 50.0, 0.5));
        assert!(approx_equal(fit.std_dev, 1.0, 0.2));
    }

    #[test]
    fn test_hvvp_correction_only_for_hvvp() {
        let ring = sample_ring(80.0, 0.0, 20.0, |_, _| (30.0, 0.0));

        let original = RingFitter::new(&AnalysisConfig::default())
            .fit(80.0, 0.0, 20.0, 1.0, &ring, Some(4.0))
            .unwrap();
        let hvvp = RingFitter::new(&AnalysisConfig::default().with_closure(Closure::Hvvp))
            .fit(80.0, 0.0, 20.0, 1.0, &ring, Some(4.0))
            .unwrap();

        assert!(approx_equal(original.mean_tangential_wind(), 30.0, 1.0e-6));
        assert!(approx_equal(hvvp.mean_tangential_wind(), 30.0 - 4.0 * 0.25, 1.0e-6));
    }

    #[test]
    fn test_along_beam_wind_is_not_rotation() {
        let fitter = RingFitter::new(&AnalysisConfig::default());
        let ring = uniform_wind_ring(50.0, 50.0, 15.0, 7.0, 7.0);
        let fit = fitter.fit(50.0, 50.0, 15.0, 1.0, &ring, None).unwrap();

        assert!(fit.mean_tangential_wind().abs() < 0.5);
    }

    #[test]
    fn test_failures() {
        let fitter = RingFitter::new(&AnalysisConfig::default());

        // Only a quarter of the ring has data.
        let mut ring = RingSample::new();
        for d in 0..360 {
            if d < 90 {
                ring.push(d as f64, 10.0);
            } else {
                ring.push(d as f64, none::<f64>());
            }
        }
        assert_eq!(
            fitter.fit(50.0, 0.0, 10.0, 1.0, &ring, None),
            Err(AnalysisError::NotEnoughData)
        );

        let ring = sample_ring(30.0, 0.0, 10.0, |_, _| (10.0, 0.0));
        assert_eq!(
            fitter.fit(0.0, 0.0, 10.0, 1.0, &ring, None),
            Err(AnalysisError::OutOfBounds)
        );
    }
}
