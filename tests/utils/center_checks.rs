use super::Scenario;
use metfor::Quantity;
use vortex_analysis::{Analysis, CancelToken, GriddedData};

pub fn center_within_one_grid_cell(scenario: &Scenario) {
    super::init_logging();

    let analysis = Analysis::new(scenario.config()).unwrap();
    let centers = analysis
        .find_centers(&scenario.vortex, scenario.first_guess(), &CancelToken::new())
        .unwrap();

    let (cx, cy) = scenario.vortex.center_xy();
    let spacing = scenario.vortex.grid_spacing().unpack();
    assert_eq!(centers.len(), 2);

    for center in centers {
        let center = center.expect("no center chosen");
        assert!(!center.first_guess);
        let miss = (center.x - cx).hypot(center.y - cy);
        assert!(miss < spacing, "missed the center by {:.2} km", miss);
    }
}

pub fn rmw_recovered(scenario: &Scenario) {
    super::init_logging();

    let analysis = Analysis::new(scenario.config()).unwrap();
    let profile = analysis
        .run_volume(
            &scenario.vortex,
            scenario.first_guess(),
            super::volume_time(0),
            &[],
            &CancelToken::new(),
        )
        .unwrap();

    for level in &profile.levels {
        let rmw = level.rmw.unpack().unpack();
        assert!((rmw - scenario.rmw).abs() <= 2.0, "rmw {}", rmw);

        let max_wind = level.max_wind.unpack().unpack();
        assert!((max_wind - scenario.vmax).abs() < 0.1 * scenario.vmax);

        assert!(level.rmw_uncertainty.unpack().unpack() >= 0.5);
    }

    assert!(profile.average_rmw.is_some());
}
