//! Conversion of Fourier coefficients into named wind coefficients.
use crate::{coefficients::CoefficientRow, keys::WindParameter};

/// The closure used to turn a Fourier series into winds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ClosureStrategy {
    /// GBVTD closure. The optional value is the environmental wind removed from the mean
    /// tangential wind.
    Gbvtd(Option<f64>),
    /// GVTD closure.
    Gvtd,
}

/// Position of the ring relative to the radar.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RingGeometry {
    pub level: f64,
    pub radius: f64,
    pub center_distance: f64,
}

/// Cosine (`a`) and sine (`b`) amplitudes of a truncated Fourier series, padded with zeros.
#[derive(Debug, Clone)]
pub(crate) struct FourierSeries {
    a: Vec<f64>,
    b: Vec<f64>,
    num_coefficients: usize,
}

impl FourierSeries {
    /// Unpack least squares coefficients ordered `[A0, B1, A1, B2, A2, ...]`.
    pub fn new(fit: &[f64], max_wavenumber: u8) -> Self {
        let len = (max_wavenumber as usize + 2).max(5);
        let mut a = vec![0.0; len];
        let mut b = vec![0.0; len];

        if let Some(&a0) = fit.first() {
            a[0] = a0;
        }
        for (i, pair) in fit[1.min(fit.len())..].chunks(2).enumerate() {
            if i + 1 >= len {
                break;
            }
            b[i + 1] = pair[0];
            if let Some(&cos) = pair.get(1) {
                a[i + 1] = cos;
            }
        }

        FourierSeries {
            a,
            b,
            num_coefficients: fit.len(),
        }
    }

    /// Whether wavenumber `k` of the series was part of the fit.
    fn resolved(&self, k: usize) -> bool {
        self.num_coefficients >= 2 * k + 1
    }
}

impl ClosureStrategy {
    /// Name the coefficients of a fitted series.
    pub fn name(
        self,
        series: &FourierSeries,
        ring: RingGeometry,
        max_wavenumber: u8,
    ) -> CoefficientRow {
        let mut row = CoefficientRow::missing(ring.level, ring.radius, max_wavenumber);
        let (a, b) = (&series.a, &series.b);
        let ratio = ring.radius / ring.center_distance;

        match self {
            ClosureStrategy::Gbvtd(correction) => {
                let sin_alpha_max = ratio;
                let cos_alpha_max = (1.0 - ratio * ratio).max(0.0).sqrt();

                let mut vtc0 = -b[1] - b[3];
                if let Some(correction) = correction {
                    if b[1] != 0.0 {
                        vtc0 -= correction * sin_alpha_max;
                    }
                }
                row.set(WindParameter::VTC0, vtc0);
                row.set(WindParameter::VRC0, a[1] + a[3]);
                row.set(WindParameter::VMC0, a[0] + a[2] + a[4]);

                if sin_alpha_max < 0.8 && series.num_coefficients >= 5 {
                    let vts1 = a[2] - a[0] + a[4] + (a[0] + a[2] + a[4]) * cos_alpha_max;
                    row.set(WindParameter::VTS(1), vts1);
                    row.set(WindParameter::VTC(1), -2.0 * (b[2] + b[4]));
                } else {
                    row.set(WindParameter::VTS(1), 0.0);
                    row.set(WindParameter::VTC(1), 0.0);
                }

                set_higher_wavenumbers(&mut row, series, 2, max_wavenumber);
            }
            ClosureStrategy::Gvtd => {
                row.set(WindParameter::VTC0, -b[1] - b[3]);

                let vrc0 = (a[0] + a[1] + a[2] + a[3] + a[4]) / (1.0 + ratio);
                row.set(WindParameter::VRC0, vrc0);

                set_higher_wavenumbers(&mut row, series, 1, max_wavenumber);
                if row.get(WindParameter::VTS(1)).is_none() {
                    row.set(WindParameter::VTS(1), 0.0);
                    row.set(WindParameter::VTC(1), 0.0);
                }

                let vts1 = row.get(WindParameter::VTS(1)).unwrap_or(0.0);
                row.set(WindParameter::VMC0, a[0] - ratio * vrc0 + 0.5 * vts1);
            }
        }

        row
    }
}

// VTCk = -2 B(k+1) and VTSk = 2 A(k+1) for every wavenumber the fit resolved.
fn set_higher_wavenumbers(row: &mut CoefficientRow, series: &FourierSeries, first: u8, last: u8) {
    for k in first..=last {
        let n = k as usize + 1;
        if !series.resolved(n) || n >= series.a.len() {
            break;
        }
        row.set(WindParameter::VTC(k), -2.0 * series.b[n]);
        row.set(WindParameter::VTS(k), 2.0 * series.a[n]);
    }
}
