//! Pick one center per height from the searched rings.
use super::{CenterEstimate, CenterField};
use crate::{
    config::AnalysisConfig,
    geo::{adjusted_lat_lon, GeoPoint},
    utility::sample_std_dev,
};
use log::{debug, warn};
use optional::{none, some, Optioned};
use std::f64::consts::E;

const MAX_BEST_STD_DEV: f64 = 50.0;
const MIN_STD_DEV: f64 = 0.01;

/// The center chosen for one height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VortexCenter {
    /// Height, km.
    pub level: f64,
    /// km east of the radar.
    pub x: f64,
    /// km north of the radar.
    pub y: f64,
    /// Geographic position.
    pub location: GeoPoint,
    /// Radius of maximum wind, km. None when the first guess was used.
    pub rmw: Optioned<f64>,
    /// Spread of the candidate radii about the RMW, km.
    pub rmw_uncertainty: Optioned<f64>,
    /// Mean tangential wind of the chosen ring, m/s.
    pub max_vt: Optioned<f64>,
    /// Positional spread of the chosen ring's consensus, km.
    pub center_std_dev: Optioned<f64>,
    /// Starts retained by the chosen ring's consensus.
    pub num_converging: usize,
    /// The first guess was used because too few cells converged.
    pub first_guess: bool,
}

/// Choose a center for every searched height.
///
/// At each height the rings at local maxima of the mean tangential wind, and their neighbors,
/// are scored on wind, positional spread and number of converging starts. The best scoring ring
/// gives the center and the RMW. Heights without a peak get `None`.
///
/// When fewer than a third of all cells converged, every height gets the first guess with no RMW.
pub fn choose_centers(
    field: &CenterField,
    config: &AnalysisConfig,
    radar: GeoPoint,
    first_guess: (f64, f64),
) -> Vec<Option<VortexCenter>> {
    if field.num_converged() * 3 < field.num_cells() {
        warn!(
            "Only {} of {} cells converged, using the first guess center.",
            field.num_converged(),
            field.num_cells()
        );

        let (x, y) = first_guess;
        return field
            .levels()
            .iter()
            .map(|&level| {
                Some(VortexCenter {
                    level,
                    x,
                    y,
                    location: adjusted_lat_lon(radar, x, y),
                    rmw: none(),
                    rmw_uncertainty: none(),
                    max_vt: none(),
                    center_std_dev: none(),
                    num_converging: 0,
                    first_guess: true,
                })
            })
            .collect();
    }

    (0..field.levels().len())
        .map(|hi| {
            let row = field.height_row(hi)?;
            let center = choose_in_row(row, config, radar);
            if center.is_none() {
                debug!("No wind peak at {} km.", field.levels()[hi]);
            }
            center
        })
        .collect()
}

fn choose_in_row(
    row: &[CenterEstimate],
    config: &AnalysisConfig,
    radar: GeoPoint,
) -> Option<VortexCenter> {
    let candidates: Vec<&CenterEstimate> = candidate_indexes(row)
        .into_iter()
        .map(|i| &row[i])
        .collect();

    let best_vt = candidates
        .iter()
        .map(|c| c.mean_vt.unpack())
        .fold(f64::NEG_INFINITY, f64::max);
    let best_std = candidates
        .iter()
        .map(|c| c.center_std_dev.unpack().max(MIN_STD_DEV))
        .fold(MAX_BEST_STD_DEV, f64::min);

    let weights = config.center_weights;
    let expected_points = config.num_points as f64 / E;
    let score = |c: &CenterEstimate| {
        let std_dev = c.center_std_dev.unpack().max(MIN_STD_DEV);
        (c.mean_vt.unpack() - best_vt).exp() * weights.wind
            + best_std / std_dev * weights.std_dev
            + (c.num_converging as f64 / expected_points).ln() * weights.points
    };

    let chosen = candidates.iter().cloned().fold(None, |best: Option<(&CenterEstimate, f64)>, c| {
        let s = score(c);
        match best {
            Some((_, best_score)) if best_score >= s => best,
            _ => Some((c, s)),
        }
    })?;
    let chosen = chosen.0;

    let radii: Vec<f64> = candidates.iter().map(|c| c.radius).collect();
    let rmw_uncertainty = sample_std_dev(&radii, chosen.radius);

    let x = chosen.mean_x.unpack();
    let y = chosen.mean_y.unpack();

    Some(VortexCenter {
        level: chosen.level,
        x,
        y,
        location: adjusted_lat_lon(radar, x, y),
        rmw: some(chosen.radius),
        rmw_uncertainty: some(rmw_uncertainty),
        max_vt: chosen.mean_vt,
        center_std_dev: chosen.center_std_dev,
        num_converging: chosen.num_converging,
        first_guess: false,
    })
}

/// Rings at interior local maxima of the mean tangential wind plus their converged neighbors, in
/// ring order without repeats.
fn candidate_indexes(row: &[CenterEstimate]) -> Vec<usize> {
    let vt = |i: usize| -> Option<f64> {
        let cell = &row[i];
        if cell.is_null() {
            None
        } else {
            cell.mean_vt.into_option()
        }
    };

    let mut keep = vec![false; row.len()];
    for i in 1..row.len().saturating_sub(1) {
        let center = match vt(i) {
            Some(val) => val,
            None => continue,
        };
        let below = vt(i - 1).unwrap_or(f64::NEG_INFINITY);
        let above = vt(i + 1).unwrap_or(f64::NEG_INFINITY);

        if center > below && center >= above {
            keep[i] = true;
            if vt(i - 1).is_some() {
                keep[i - 1] = true;
            }
            if vt(i + 1).is_some() {
                keep[i + 1] = true;
            }
        }
    }

    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| if k { Some(i) } else { None })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::*;

    fn cell(radius: f64, vt: f64, std_dev: f64, count: usize) -> CenterEstimate {
        CenterEstimate {
            level: 2.0,
            radius,
            mean_x: some(50.0 + radius / 100.0),
            mean_y: some(-20.0),
            mean_vt: some(vt),
            center_std_dev: some(std_dev),
            vt_std_dev: some(0.5),
            num_converging: count,
        }
    }

    fn field(rows: Vec<Vec<CenterEstimate>>) -> CenterField {
        let radii = rows[0].iter().map(|c| c.radius).collect();
        let levels = (0..rows.len()).map(|i| 2.0 + i as f64).collect();
        CenterField {
            levels,
            radii,
            cells: rows,
        }
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig::default().with_num_points(9)
    }

    #[test]
    fn test_peak_ring_is_chosen() {
        let row = vec![
            cell(20.0, 30.0, 1.0, 9),
            cell(21.0, 34.0, 1.0, 9),
            cell(22.0, 38.0, 0.5, 9),
            cell(23.0, 36.0, 1.0, 9),
            cell(24.0, 33.0, 1.0, 9),
        ];
        let radar = GeoPoint::new(25.0, -80.0);
        let centers = choose_centers(&field(vec![row]), &config(), radar, (0.0, 0.0));

        let center = centers[0].unwrap();
        assert!(!center.first_guess);
        assert_eq!(center.rmw.unpack(), 22.0);
        assert!(approx_equal(center.x, 50.22, 1.0e-12));
        assert!(approx_equal(center.y, -20.0, 1.0e-12));
        // Candidates 21, 22 and 23 km about 22 km.
        assert!(approx_equal(center.rmw_uncertainty.unpack(), 1.0, 1.0e-12));
    }

    #[test]
    fn test_tight_neighbor_can_win() {
        // The neighbor's much smaller spread outweighs the slightly higher wind at the peak.
        let row = vec![
            cell(20.0, 30.0, 1.0, 9),
            cell(21.0, 40.0, 4.0, 9),
            cell(22.0, 39.9, 0.1, 9),
            cell(23.0, 30.0, 1.0, 9),
        ];
        let radar = GeoPoint::new(25.0, -80.0);
        let centers = choose_centers(&field(vec![row]), &config(), radar, (0.0, 0.0));
        assert_eq!(centers[0].unwrap().rmw.unpack(), 22.0);
    }

    #[test]
    fn test_no_interior_peak() {
        // Monotonically increasing wind peaks at the edge, which never counts.
        let row = vec![
            cell(20.0, 30.0, 1.0, 9),
            cell(21.0, 31.0, 1.0, 9),
            cell(22.0, 32.0, 1.0, 9),
        ];
        let radar = GeoPoint::new(25.0, -80.0);
        let centers = choose_centers(&field(vec![row]), &config(), radar, (0.0, 0.0));
        assert!(centers[0].is_none());
    }

    #[test]
    fn test_falls_back_to_first_guess() {
        let mut row: Vec<CenterEstimate> = (0..6)
            .map(|i| CenterEstimate::null(2.0, 20.0 + i as f64))
            .collect();
        row[2] = cell(22.0, 40.0, 1.0, 9);

        let radar = GeoPoint::new(25.0, -80.0);
        let cells = field(vec![row.clone(), row]);
        let centers = choose_centers(&cells, &config(), radar, (30.0, 40.0));

        assert_eq!(centers.len(), 2);
        for center in centers {
            let center = center.unwrap();
            assert!(center.first_guess);
            assert_eq!((center.x, center.y), (30.0, 40.0));
            assert!(center.rmw.is_none());
            assert_eq!(center.location, adjusted_lat_lon(radar, 30.0, 40.0));
        }
    }
}
