//! Spread of the central pressure under small displacements of the center.
use crate::utility::{mean, sample_std_dev};
use log::debug;
use optional::{none, some, Optioned};
use std::f64::consts::FRAC_PI_2;

/// Number of displaced centers in the ensemble.
pub const NUM_PERTURBATIONS: usize = 4;
/// Smallest reported pressure uncertainty when at most one observation anchored the estimate, hPa.
pub const FEW_OBS_FLOOR: f64 = 2.5;
/// Smallest reported pressure uncertainty when no observation anchored the estimate, hPa.
pub const NO_OBS_FLOOR: f64 = 5.0;

/// Uncertainty of the central pressure and deficit at one height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureUncertainty {
    /// Central pressure uncertainty including the observation floors, hPa.
    pub pressure: Optioned<f64>,
    /// Spread of the pressure deficit across the ensemble, hPa.
    pub deficit: Optioned<f64>,
    /// Spread of the central pressure across the ensemble before any floor, hPa.
    pub ensemble_spread: Optioned<f64>,
    /// Number of displaced centers that produced an estimate.
    pub members: usize,
}

impl PressureUncertainty {
    /// No estimate.
    pub fn missing() -> Self {
        PressureUncertainty {
            pressure: none(),
            deficit: none(),
            ensemble_spread: none(),
            members: 0,
        }
    }
}

/// The centers displaced by `distance` km east, north, west and south of (`x`, `y`).
pub fn perturbed_centers(x: f64, y: f64, distance: f64) -> [(f64, f64); NUM_PERTURBATIONS] {
    let mut centers = [(x, y); NUM_PERTURBATIONS];
    for (p, center) in centers.iter_mut().enumerate() {
        let angle = p as f64 * FRAC_PI_2;
        center.0 += distance * angle.cos();
        center.1 += distance * angle.sin();
    }
    centers
}

/// Combine the ensemble of central pressures and deficits.
///
/// The spreads are sample standard deviations about the ensemble means. Fewer than two members
/// give no estimate. The pressure uncertainty is raised to [`FEW_OBS_FLOOR`] when at most one
/// observation anchored the estimate and to [`NO_OBS_FLOOR`] when none did.
pub fn ensemble_uncertainty(
    pressures: &[f64],
    deficits: &[f64],
    num_anchors: usize,
) -> PressureUncertainty {
    let members = pressures.len();
    if members < 2 {
        debug!("Only {} ensemble members, no pressure uncertainty.", members);
        return PressureUncertainty {
            members,
            ..PressureUncertainty::missing()
        };
    }

    let spread = |vals: &[f64]| -> Optioned<f64> {
        mean(vals)
            .map(|center| some(sample_std_dev(vals, center)))
            .unwrap_or_else(none)
    };

    let ensemble_spread = spread(pressures);
    let deficit = spread(deficits);

    let floor = match num_anchors {
        0 => NO_OBS_FLOOR,
        1 => FEW_OBS_FLOOR,
        _ => 0.0,
    };
    let pressure = ensemble_spread.map_t(|spread| {
        if spread < floor {
            debug!("Raising pressure uncertainty {:.2} to {} hPa.", spread, floor);
        }
        spread.max(floor)
    });

    PressureUncertainty {
        pressure,
        deficit,
        ensemble_spread,
        members,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::*;

    #[test]
    fn test_cardinal_displacements() {
        let centers = perturbed_centers(10.0, -5.0, 2.0);
        let expected = [(12.0, -5.0), (10.0, -3.0), (8.0, -5.0), (10.0, -7.0)];

        for (got, want) in centers.iter().zip(&expected) {
            assert!(approx_equal(got.0, want.0, 1.0e-12));
            assert!(approx_equal(got.1, want.1, 1.0e-12));
        }
    }

    #[test]
    fn test_spread_and_floors() {
        let pressures = [960.0, 962.0, 958.0, 960.0];
        let deficits = [40.0, 41.0, 39.0, 40.0];
        let spread = (8.0f64 / 3.0).sqrt();

        let anchored = ensemble_uncertainty(&pressures, &deficits, 3);
        assert!(approx_equal(anchored.pressure.unpack(), spread, 1.0e-12));
        assert!(approx_equal(anchored.ensemble_spread.unpack(), spread, 1.0e-12));
        assert!(approx_equal(anchored.deficit.unpack(), (2.0f64 / 3.0).sqrt(), 1.0e-12));
        assert_eq!(anchored.members, 4);

        let one = ensemble_uncertainty(&pressures, &deficits, 1);
        assert_eq!(one.pressure.unpack(), FEW_OBS_FLOOR);
        assert!(approx_equal(one.ensemble_spread.unpack(), spread, 1.0e-12));

        let unanchored = ensemble_uncertainty(&pressures, &deficits, 0);
        assert_eq!(unanchored.pressure.unpack(), NO_OBS_FLOOR);
    }

    #[test]
    fn test_large_spread_not_floored() {
        let pressures = [950.0, 970.0, 940.0, 980.0];
        let result = ensemble_uncertainty(&pressures, &pressures, 0);
        assert!(result.pressure.unpack() > NO_OBS_FLOOR);
        assert_eq!(result.pressure, result.ensemble_spread);
    }

    #[test]
    fn test_too_few_members() {
        let result = ensemble_uncertainty(&[960.0], &[40.0], 0);
        assert!(result.pressure.is_none());
        assert_eq!(result.members, 1);
    }
}
