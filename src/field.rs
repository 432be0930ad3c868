//! Fit every ring of the analysis domain around a fixed center per height.
use crate::{
    cancel::CancelToken,
    coefficients::{CoefficientField, CoefficientRow},
    config::AnalysisConfig,
    error::Result,
    grid::GriddedData,
    keys::WindParameter,
    ring_fit::RingFitter,
};
use log::{debug, info};
use optional::{none, some, Optioned};
use rayon::prelude::*;

/// Coefficients over the full analysis domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedField {
    /// One row per (height, ring) cell. Cells that could not be fit are missing.
    pub coefficients: CoefficientField,
    /// Largest radius with a nonzero mean tangential wind at any height, km.
    pub max_valid_radius: Optioned<f64>,
}

/// Fills a [`CoefficientField`] from a gridded volume.
#[derive(Debug, Clone)]
pub struct FieldExtractor<'a> {
    config: &'a AnalysisConfig,
    fitter: RingFitter,
}

impl<'a> FieldExtractor<'a> {
    /// Create an extractor for the analysis parameters.
    pub fn new(config: &'a AnalysisConfig) -> Self {
        FieldExtractor {
            config,
            fitter: RingFitter::new(config),
        }
    }

    /// Fit every ring from the inner to the outer radius at every analysis height.
    ///
    /// `centers` holds the center (km east, km north of the radar) for each height of
    /// [`AnalysisConfig::levels`]. Heights without a center, or whose center is off the grid,
    /// are left missing. `mean_wind_correction` is passed to every fit.
    pub fn extract(
        &self,
        grid: &dyn GriddedData,
        centers: &[Option<(f64, f64)>],
        mean_wind_correction: Option<f64>,
        cancel: &CancelToken,
    ) -> Result<ExtractedField> {
        let levels = self.config.levels();
        let radii = self.config.radii();
        let num_radii = radii.len();

        let mut coefficients =
            CoefficientField::new(levels.clone(), radii, self.fitter.max_wavenumber());

        for (hi, &height) in levels.iter().enumerate() {
            cancel.check()?;

            let (cx, cy) = match centers.get(hi).cloned().flatten() {
                Some(center) => center,
                None => {
                    debug!("No center at {} km, skipping the height.", height);
                    continue;
                }
            };

            if !grid.contains(cx, cy, height) {
                debug!(
                    "Center ({:.1}, {:.1}) is outside the grid at {} km, skipping the height.",
                    cx, cy, height
                );
                continue;
            }

            let row = self.fit_height(grid, (cx, cy), height, mean_wind_correction);
            coefficients.set_height_row(hi, row);
        }

        let max_valid_radius = max_valid_radius(&coefficients);
        info!(
            "Extracted {} heights by {} rings, winds out to {} km.",
            levels.len(),
            num_radii,
            max_valid_radius
                .into_option()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "none".to_owned())
        );

        Ok(ExtractedField {
            coefficients,
            max_valid_radius,
        })
    }

    /// Fit every ring at one height around a center. Rings that can not be fit are missing.
    pub fn fit_height(
        &self,
        grid: &dyn GriddedData,
        center: (f64, f64),
        height: f64,
        mean_wind_correction: Option<f64>,
    ) -> Vec<CoefficientRow> {
        let (cx, cy) = center;
        let max_wavenumber = self.fitter.max_wavenumber();

        self.config
            .radii()
            .into_par_iter()
            .map(|radius| {
                grid.ring(cx, cy, radius, height)
                    .and_then(|ring| {
                        self.fitter
                            .fit(cx, cy, radius, height, &ring, mean_wind_correction)
                    })
                    .map(|fit| fit.coefficients)
                    .unwrap_or_else(|err| {
                        debug!("Ring {} km at {} km not fit: {}", radius, height, err);
                        CoefficientRow::missing(height, radius, max_wavenumber)
                    })
            })
            .collect()
    }
}

fn max_valid_radius(field: &CoefficientField) -> Optioned<f64> {
    (0..field.levels().len())
        .flat_map(|hi| {
            field
                .radial_profile(hi, WindParameter::VTC0)
                .into_iter()
                .zip(field.radii().iter().cloned())
                .filter(|(vt, _)| vt.is_some() && vt.unpack() != 0.0)
                .map(|(_, radius)| radius)
                .collect::<Vec<_>>()
        })
        .fold(none(), |max: Optioned<f64>, radius| {
            if max.is_none() || radius > max.unpack() {
                some(radius)
            } else {
                max
            }
        })
}
