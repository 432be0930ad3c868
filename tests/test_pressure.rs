use chrono::Duration;
use metfor::Quantity;
use vortex_analysis::{adjusted_lat_lon, relative_xy, Analysis, CancelToken, PressureObservation};

mod utils;

fn observation(
    scenario: &utils::Scenario,
    east: f64,
    minutes_old: i64,
    pressure: f64,
) -> PressureObservation {
    let center = scenario.vortex.center();
    PressureObservation {
        station_id: format!("K{:03}", east as i64),
        time: utils::volume_time(0) - Duration::minutes(minutes_old),
        location: adjusted_lat_lon(center, east, 0.0),
        pressure,
    }
}

#[test]
fn test_observation_anchors_central_pressure() {
    utils::init_logging();

    let scenario = utils::Scenario::new(60.0, 70.0, 40.0, 50.0);
    let analysis = Analysis::new(scenario.config()).unwrap();
    let obs = [observation(&scenario, 60.5, 15, 1002.0)];

    let profile = analysis
        .run_volume(
            &scenario.vortex,
            scenario.first_guess(),
            utils::volume_time(0),
            &obs,
            &CancelToken::new(),
        )
        .unwrap();

    let level = &profile.levels[0];
    let center = level.location().unwrap();
    let (x, y) = relative_xy(center, obs[0].location);
    let pressure = level.pressure_profile.as_ref().unwrap();
    let expected = 1002.0 - (pressure.at(x.hypot(y)) - pressure.central());

    assert_eq!(level.num_anchors, 1);
    assert!((level.central_pressure.unpack().unpack() - expected).abs() < 1.0e-6);
    // One anchor keeps the lower floor.
    assert!(level.pressure_uncertainty.unpack().unpack() >= 2.5);
}

#[test]
fn test_environmental_pressure_anchor() {
    utils::init_logging();

    let scenario = utils::Scenario::new(60.0, 70.0, 40.0, 50.0);
    let analysis = Analysis::new(scenario.config())
        .unwrap()
        .with_environmental_pressure(1008.0);

    let profile = analysis
        .run_volume(
            &scenario.vortex,
            scenario.first_guess(),
            utils::volume_time(0),
            &[],
            &CancelToken::new(),
        )
        .unwrap();

    // The environmental pressure sits beyond the outer ring, so it anchors the whole deficit.
    let central = profile.central_pressure().unpack().unpack();
    let deficit = profile.pressure_deficit().unpack().unpack();
    assert!((central + deficit - 1008.0).abs() < 1.0e-6);
}

#[test]
fn test_calm_volume_has_no_vortex() {
    utils::init_logging();

    let scenario = utils::Scenario::new(60.0, 70.0, 40.0, 0.0);
    let analysis = Analysis::new(scenario.config()).unwrap();

    let profile = analysis
        .run_volume(
            &scenario.vortex,
            scenario.first_guess(),
            utils::volume_time(0),
            &[],
            &CancelToken::new(),
        )
        .unwrap();

    assert_eq!(profile.levels.len(), 2);
    assert!(profile.central_pressure().is_none());
    assert!(profile.average_rmw.is_none());
    for level in &profile.levels {
        assert!(level.rmw.is_none());
        assert!(level.central_pressure.is_none());
    }
}

#[test]
fn test_thermal_wind_mode() {
    utils::init_logging();

    let scenario = utils::Scenario::new(60.0, 70.0, 40.0, 50.0);
    let config = scenario.config().with_levels(1.0, 3.0).with_thermal_wind(true);
    let analysis = Analysis::new(config).unwrap();

    let vortex = scenario.vortex.clone().with_vertical_decay(6.0);
    let profile = analysis
        .run_volume(
            &vortex,
            scenario.first_guess(),
            utils::volume_time(0),
            &[],
            &CancelToken::new(),
        )
        .unwrap();

    let thermal = profile.thermal.expect("thermal mode was requested");
    let outer = thermal.radii().len() - 1;
    for hi in 0..3 {
        // Winds weaken upward, so the core is warm.
        assert!(thermal.pressure(hi, 0).unpack() < 0.0);
        assert!(thermal.theta(hi, 0).unpack() > 0.0);
        assert_eq!(thermal.pressure(hi, outer).unpack(), 0.0);
    }
}
