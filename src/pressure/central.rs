//! Anchor the pressure deficit profile to surface observations.
use super::deficit::PressureProfile;
use crate::{
    geo::{relative_xy, GeoPoint},
    vortex::PressureObservation,
};
use chrono::NaiveDateTime;
use log::{debug, info};
use optional::{none, some, Optioned};

/// Environmental pressure assumed when no observation can anchor the profile, hPa.
pub const STANDARD_PRESSURE: f64 = 1013.0;
/// Observations closer than this to the center are not used, km.
pub const MIN_OBS_RADIUS: f64 = 20.0;

/// Which observations may anchor the profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationWindow {
    /// Oldest usable observation relative to the volume time, seconds.
    pub max_time_diff: f64,
    /// Farthest usable observation from the center, km.
    pub max_radius: f64,
}

/// Central pressure and the pressure deficit at one height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralPressure {
    /// Estimated pressure at the center, hPa. None if the profile is flat.
    pub pressure: Optioned<f64>,
    /// Pressure rise from the center to the outer ring, hPa.
    pub deficit: Optioned<f64>,
    /// Number of observations, including an environmental pressure, that anchored the estimate.
    pub num_anchors: usize,
}

impl CentralPressure {
    /// No estimate.
    pub fn missing() -> Self {
        CentralPressure {
            pressure: none(),
            deficit: none(),
            num_anchors: 0,
        }
    }
}

/// The inputs to the central pressure estimate that do not depend on the center.
#[derive(Debug, Clone, Copy)]
pub struct PressureAnchors<'a> {
    /// Time of the radar volume.
    pub volume_time: NaiveDateTime,
    /// Candidate surface observations.
    pub observations: &'a [PressureObservation],
    /// Far field pressure, treated as an observation at the window's maximum radius, hPa.
    pub environmental_pressure: Option<f64>,
    /// Which observations may be used.
    pub window: ObservationWindow,
}

impl<'a> PressureAnchors<'a> {
    /// Estimate the central pressure of a profile centered at `center`.
    ///
    /// Every usable observation gives an estimate of its pressure minus the profile's rise from
    /// the center out to the observation. The estimates are weighted by the mean of their time
    /// and distance proximity, each scaled by the window size. Without any usable observation
    /// the environment is taken to be at standard pressure at the outer ring.
    pub fn central_pressure(&self, profile: &PressureProfile, center: GeoPoint) -> CentralPressure {
        let deficit = profile.total_deficit();
        if deficit == 0.0 {
            debug!("Flat pressure profile, no central pressure.");
            return CentralPressure::missing();
        }

        let window = self.window;
        let rise = |radius: f64| profile.at(radius) - profile.central();
        let estimate = |pressure: f64, radius: f64| pressure - rise(radius);

        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        let mut num_anchors = 0;

        for obs in self.observations.iter().filter(|obs| obs.pressure > 0.0) {
            let time_diff = (self.volume_time - obs.time).num_seconds() as f64;
            if time_diff <= 0.0 || time_diff > window.max_time_diff {
                continue;
            }

            let (x, y) = relative_xy(center, obs.location);
            let radius = x.hypot(y);
            if radius < MIN_OBS_RADIUS || radius > window.max_radius {
                continue;
            }

            let weight = ((window.max_time_diff - time_diff) / window.max_time_diff
                + (window.max_radius - radius) / window.max_radius)
                / 2.0;

            debug!(
                "Anchoring to {} at {:.1} km, {:.0} s old, weight {:.2}.",
                obs.station_id, radius, time_diff, weight
            );

            weighted_sum += weight * estimate(obs.pressure, radius);
            weight_sum += weight;
            num_anchors += 1;
        }

        if let Some(pressure) = self.environmental_pressure {
            weighted_sum += estimate(pressure, window.max_radius);
            weight_sum += 1.0;
            num_anchors += 1;
        }

        let pressure = if num_anchors > 0 && weight_sum > 0.0 {
            weighted_sum / weight_sum
        } else {
            if num_anchors == 0 {
                info!(
                    "No pressure observations, assuming {} hPa outside the vortex.",
                    STANDARD_PRESSURE
                );
            }
            STANDARD_PRESSURE - deficit
        };

        CentralPressure {
            pressure: some(pressure),
            deficit: some(deficit),
            num_anchors,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{geo::adjusted_lat_lon, utility::test_tools::*};
    use chrono::{Duration, NaiveDate};
    use optional::some;

    const WINDOW: ObservationWindow = ObservationWindow {
        max_time_diff: 3600.0,
        max_radius: 100.0,
    };

    fn center() -> GeoPoint {
        GeoPoint::new(25.0, -80.0)
    }

    fn volume_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 8, 27)
            .and_then(|date| date.and_hms_opt(3, 0, 0))
            .unwrap()
    }

    fn profile() -> PressureProfile {
        let radii: Vec<f64> = (5..=80).map(f64::from).collect();
        let vt: Vec<_> = radii
            .iter()
            .map(|&r| some(if r < 30.0 { 40.0 * r / 30.0 } else { 40.0 * 30.0 / r }))
            .collect();
        PressureProfile::integrate(&radii, &vt, 1.0, 6.0e-5)
    }

    fn observation(east: f64, minutes_old: i64, pressure: f64) -> PressureObservation {
        PressureObservation {
            station_id: format!("OBS{}", east),
            time: volume_time() - Duration::minutes(minutes_old),
            location: adjusted_lat_lon(center(), east, 0.0),
            pressure,
        }
    }

    fn anchors(observations: &[PressureObservation]) -> PressureAnchors {
        PressureAnchors {
            volume_time: volume_time(),
            observations,
            environmental_pressure: None,
            window: WINDOW,
        }
    }

    #[test]
    fn test_standard_pressure_fallback() {
        let profile = profile();
        let result = anchors(&[]).central_pressure(&profile, center());

        assert_eq!(result.num_anchors, 0);
        assert!(approx_equal(
            result.pressure.unpack(),
            STANDARD_PRESSURE - profile.total_deficit(),
            1.0e-9
        ));
        assert!(result.deficit.unpack() > 10.0);
    }

    #[test]
    fn test_single_observation() {
        let profile = profile();
        let obs = [observation(50.5, 10, 1005.0)];
        let result = anchors(&obs).central_pressure(&profile, center());

        let expected = 1005.0 - (profile.at(50.5) - profile.central());
        assert_eq!(result.num_anchors, 1);
        assert!(approx_equal(result.pressure.unpack(), expected, 1.0e-3));
    }

    #[test]
    fn test_unusable_observations_ignored() {
        let profile = profile();
        let obs = [
            // too close
            observation(10.0, 10, 990.0),
            // too far
            observation(150.0, 10, 990.0),
            // too old
            observation(50.0, 90, 990.0),
            // after the volume
            observation(50.0, -5, 990.0),
            // missing pressure
            observation(50.0, 10, -999.0),
        ];
        let result = anchors(&obs).central_pressure(&profile, center());

        assert_eq!(result.num_anchors, 0);
        assert!(approx_equal(
            result.pressure.unpack(),
            STANDARD_PRESSURE - profile.total_deficit(),
            1.0e-9
        ));
    }

    #[test]
    fn test_weighted_by_proximity() {
        let profile = profile();
        let near = observation(30.0, 6, 1000.0);
        let far = observation(90.0, 54, 1010.0);

        let result = anchors(&[near.clone(), far.clone()]).central_pressure(&profile, center());
        let near_only = anchors(&[near]).central_pressure(&profile, center());
        let far_only = anchors(&[far]).central_pressure(&profile, center());

        let (p_near, p_far, p) = (
            near_only.pressure.unpack(),
            far_only.pressure.unpack(),
            result.pressure.unpack(),
        );
        assert_eq!(result.num_anchors, 2);
        assert!(p > p_near.min(p_far) && p < p_near.max(p_far));
        // The nearer, fresher observation dominates.
        assert!((p - p_near).abs() < (p - p_far).abs());
    }

    #[test]
    fn test_environmental_pressure_anchor() {
        let profile = profile();
        let mut anchors = anchors(&[]);
        anchors.environmental_pressure = Some(1010.0);

        let result = anchors.central_pressure(&profile, center());
        assert_eq!(result.num_anchors, 1);
        assert!(approx_equal(
            result.pressure.unpack(),
            1010.0 - (profile.outer() - profile.central()),
            1.0e-9
        ));
    }

    #[test]
    fn test_flat_profile_has_no_pressure() {
        let radii = vec![10.0, 11.0];
        let flat = PressureProfile::integrate(&radii, &[some(0.0), some(0.0)], 1.0, 6.0e-5);
        let result = anchors(&[]).central_pressure(&flat, center());
        assert_eq!(result, CentralPressure::missing());
    }
}
