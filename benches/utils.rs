use criterion::Criterion;
use vortex_analysis::{AnalysisConfig, AnalyticVortex, GeoPoint};

pub fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

/// A Rankine vortex 90 km from the radar with a slight wavenumber one asymmetry.
pub fn test_vortex() -> AnalyticVortex {
    AnalyticVortex::new(GeoPoint::new(29.5, -95.1), 60.0, -65.0, 30.0, 45.0)
        .with_asymmetry(5.0, 45.0)
        .with_inflow()
}

pub fn test_config() -> AnalysisConfig {
    AnalysisConfig::default()
        .with_levels(1.0, 3.0)
        .with_radii(5.0, 80.0)
        .with_search_radii(26.0, 34.0)
        .with_search_box(10.0, 4.0)
        .with_num_points(16)
}
