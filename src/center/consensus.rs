//! Reduce the local maxima found from many starting points to one center.
use super::simplex::SimplexVertex;
use crate::{
    error::{AnalysisError, Result},
    utility::{mean, sample_std_dev},
};

/// Tangential winds outside this range are not physical and are rejected, m/s.
const VT_RANGE: (f64, f64) = (0.0, 100.0);

/// Mean of the retained starts and their spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Consensus {
    pub mean_x: f64,
    pub mean_y: f64,
    pub mean_vt: f64,
    pub center_std_dev: f64,
    pub vt_std_dev: f64,
    pub count: usize,
}

/// Two pass consensus.
///
/// The first pass averages every start with a plausible wind. The second keeps only the starts
/// strictly within one positional standard deviation of that mean, so starts that all landed on
/// the same point have no spread to agree within. `NoConsensus` if either pass is left empty.
pub(crate) fn consensus(converged: &[SimplexVertex]) -> Result<Consensus> {
    let mut plausible: Vec<SimplexVertex> = converged
        .iter()
        .filter(|v| v.vt > VT_RANGE.0 && v.vt < VT_RANGE.1)
        .cloned()
        .collect();

    // Summation order must not depend on the order of the starts.
    plausible.sort_by(|a, b| {
        (a.x, a.y, a.vt)
            .partial_cmp(&(b.x, b.y, b.vt))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let first = summarize(&plausible).ok_or(AnalysisError::NoConsensus)?;

    let retained: Vec<SimplexVertex> = plausible
        .into_iter()
        .filter(|v| (v.x - first.mean_x).hypot(v.y - first.mean_y) < first.center_std_dev)
        .collect();

    summarize(&retained).ok_or(AnalysisError::NoConsensus)
}

fn summarize(vertices: &[SimplexVertex]) -> Option<Consensus> {
    let xs: Vec<f64> = vertices.iter().map(|v| v.x).collect();
    let ys: Vec<f64> = vertices.iter().map(|v| v.y).collect();
    let vts: Vec<f64> = vertices.iter().map(|v| v.vt).collect();

    let mean_x = mean(&xs)?;
    let mean_y = mean(&ys)?;
    let mean_vt = mean(&vts)?;

    let distances: Vec<f64> = vertices
        .iter()
        .map(|v| (v.x - mean_x).hypot(v.y - mean_y))
        .collect();

    Some(Consensus {
        mean_x,
        mean_y,
        mean_vt,
        center_std_dev: sample_std_dev(&distances, 0.0),
        vt_std_dev: sample_std_dev(&vts, mean_vt),
        count: vertices.len(),
    })
}
