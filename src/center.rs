//! Locate the vortex center by maximizing the ring mean tangential wind.
//!
//! Every (height, ring) cell is searched independently from a box of starting points around the
//! first guess. Each start climbs to a local maximum with a Nelder-Mead simplex, and the local
//! maxima are reduced to one consensus center per cell.
use crate::{
    cancel::CancelToken,
    config::AnalysisConfig,
    error::{AnalysisError, Result},
    grid::GriddedData,
    ring_fit::RingFitter,
};
use log::{debug, info};
use optional::{none, some, Optioned};
use rayon::prelude::*;

pub use self::choose::{choose_centers, VortexCenter};
pub use self::simplex::SimplexVertex;

use self::{
    consensus::consensus,
    simplex::{maximize, SimplexSettings, FAILED_FIT_PENALTY},
};

mod choose;
mod consensus;
mod simplex;

/// Consensus center for one (height, ring) cell.
///
/// All values are none and `num_converging` is 0 when no start converged to a plausible
/// center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterEstimate {
    /// Height, km.
    pub level: f64,
    /// Ring radius, km.
    pub radius: f64,
    /// Mean center, km east of the radar.
    pub mean_x: Optioned<f64>,
    /// Mean center, km north of the radar.
    pub mean_y: Optioned<f64>,
    /// Mean tangential wind at the converged centers, m/s.
    pub mean_vt: Optioned<f64>,
    /// Spread of the converged centers about their mean, km.
    pub center_std_dev: Optioned<f64>,
    /// Spread of the tangential wind at the converged centers, m/s.
    pub vt_std_dev: Optioned<f64>,
    /// Number of starts retained by the consensus.
    pub num_converging: usize,
}

impl CenterEstimate {
    /// A cell without a consensus.
    pub fn null(level: f64, radius: f64) -> Self {
        CenterEstimate {
            level,
            radius,
            mean_x: none(),
            mean_y: none(),
            mean_vt: none(),
            center_std_dev: none(),
            vt_std_dev: none(),
            num_converging: 0,
        }
    }

    /// Whether the cell has a consensus center.
    pub fn is_null(&self) -> bool {
        self.num_converging == 0
    }
}

/// Center estimates for every searched cell, indexed by (height index, ring index).
#[derive(Debug, Clone, PartialEq)]
pub struct CenterField {
    levels: Vec<f64>,
    radii: Vec<f64>,
    cells: Vec<Vec<CenterEstimate>>,
}

impl CenterField {
    /// Searched heights, km.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Searched ring radii, km.
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// The estimate for one cell.
    pub fn get(&self, height_index: usize, ring_index: usize) -> Option<&CenterEstimate> {
        self.cells.get(height_index).and_then(|row| row.get(ring_index))
    }

    /// All estimates at one height, inner ring first.
    pub fn height_row(&self, height_index: usize) -> Option<&[CenterEstimate]> {
        self.cells.get(height_index).map(Vec::as_slice)
    }

    /// Number of cells with a consensus center.
    pub fn num_converged(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_null())
            .count()
    }

    /// Total number of cells.
    pub fn num_cells(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}

/// Multi-start simplex center finder.
#[derive(Debug, Clone)]
pub struct CenterSolver<'a> {
    config: &'a AnalysisConfig,
    fitter: RingFitter,
}

impl<'a> CenterSolver<'a> {
    /// Create a solver for the analysis parameters.
    pub fn new(config: &'a AnalysisConfig) -> Self {
        CenterSolver {
            config,
            fitter: RingFitter::new(config),
        }
    }

    /// Starting points on a square grid spanning the search box, centered on the guess.
    pub fn starting_points(&self, guess_x: f64, guess_y: f64) -> Vec<(f64, f64)> {
        let row_length = (self.config.num_points as f64).sqrt().round().max(1.0) as usize;
        let increment = self.config.box_diameter / row_length as f64;
        let corner = -increment * (row_length - 1) as f64 / 2.0;

        (0..row_length * row_length)
            .map(|p| {
                let i = (p % row_length) as f64;
                let j = (p / row_length) as f64;
                (guess_x + corner + i * increment, guess_y + corner + j * increment)
            })
            .collect()
    }

    /// Mean tangential wind of a ring around a trial center, or a penalty if it can not be fit.
    fn objective(&self, grid: &dyn GriddedData, x: f64, y: f64, radius: f64, height: f64) -> f64 {
        grid.ring(x, y, radius, height)
            .and_then(|ring| self.fitter.fit(x, y, radius, height, &ring, None))
            .map(|fit| fit.mean_tangential_wind())
            .unwrap_or(FAILED_FIT_PENALTY)
    }

    /// Search one cell from every starting point around the guess.
    pub fn solve_cell(
        &self,
        grid: &dyn GriddedData,
        guess: (f64, f64),
        radius: f64,
        height: f64,
    ) -> CenterEstimate {
        let settings = SimplexSettings {
            influence_radius: self.config.influence_radius,
            convergence: self.config.convergence,
            max_iterations: self.config.max_iterations,
        };

        let converged: Vec<SimplexVertex> = self
            .starting_points(guess.0, guess.1)
            .into_par_iter()
            .filter(|&(x, y)| {
                let inside = grid.contains(x, y, height);
                if !inside {
                    debug!(
                        "Skipping start ({:.1}, {:.1}) outside the grid at {} km.",
                        x, y, height
                    );
                }
                inside
            })
            .filter_map(|(x, y)| {
                maximize(x, y, settings, |x, y| self.objective(grid, x, y, radius, height))
            })
            .collect();

        match consensus(&converged) {
            Ok(result) => CenterEstimate {
                level: height,
                radius,
                mean_x: some(result.mean_x),
                mean_y: some(result.mean_y),
                mean_vt: some(result.mean_vt),
                center_std_dev: some(result.center_std_dev),
                vt_std_dev: some(result.vt_std_dev),
                num_converging: result.count,
            },
            Err(err) => {
                debug!("{} Ring {} km at {} km.", err, radius, height);
                CenterEstimate::null(height, radius)
            }
        }
    }

    /// Search every (height, ring) cell of the configured search domain.
    ///
    /// Cells are independent and searched in parallel. Returns `Err(Cancelled)` if the token is
    /// cancelled before all cells are done.
    pub fn solve(
        &self,
        grid: &dyn GriddedData,
        guess: (f64, f64),
        cancel: &CancelToken,
    ) -> Result<CenterField> {
        let levels = self.config.levels();
        let radii = self.config.center_radii();

        let cells: Vec<Vec<CenterEstimate>> = levels
            .par_iter()
            .map(|&height| {
                radii
                    .par_iter()
                    .map(|&radius| {
                        cancel.check()?;
                        Ok(self.solve_cell(grid, guess, radius, height))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        cancel.check()?;

        let field = CenterField {
            levels,
            radii,
            cells,
        };

        info!(
            "Center search converged in {} of {} cells.",
            field.num_converged(),
            field.num_cells()
        );

        if field.num_cells() == 0 {
            return Err(AnalysisError::NotEnoughData);
        }

        Ok(field)
    }
}
