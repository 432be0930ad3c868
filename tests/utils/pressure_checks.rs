use super::Scenario;
use itertools::Itertools;
use metfor::Quantity;
use vortex_analysis::{Analysis, CancelToken, UncertaintyPerturbation};

pub fn deficit_monotone_and_deep(scenario: &Scenario) {
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
        let pressure = level.pressure_profile.as_ref().expect("no pressure profile");
        for (inner, outer) in pressure.values().iter().tuple_windows::<(_, _)>() {
            assert!(inner < outer);
        }
        assert!(pressure.values().iter().all(|&p| p < 0.0));

        let deficit = level.pressure_deficit.unpack().unpack();
        assert!(deficit > 10.0 && deficit < 100.0, "deficit {}", deficit);

        // No observations, so the environment is at standard pressure.
        let central = level.central_pressure.unpack().unpack();
        assert!((central + deficit - 1013.0).abs() < 1.0e-9);
        assert_eq!(level.num_anchors, 0);
    }

    assert_eq!(profile.central_pressure(), profile.levels[0].central_pressure);
}

pub fn symmetric_ensemble_agrees(scenario: &Scenario) {
    super::init_logging();

    let displaced = scenario.config().with_perturbation(UncertaintyPerturbation::Fixed(1.0));
    let analysis = Analysis::new(displaced).unwrap();
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
        // The spread itself is near zero, what is reported is the no observation floor.
        assert_eq!(level.pressure_uncertainty.unpack().unpack(), 5.0);
        assert!(level.deficit_uncertainty.unpack().unpack() < 1.0);
    }
}
