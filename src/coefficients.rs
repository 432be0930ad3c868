//! Named wind coefficients and the (height, ring) table that holds them.
use crate::keys::WindParameter;
use optional::{none, Optioned};

/// One named coefficient recovered from a ring fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindCoefficient {
    /// Height of the ring, km.
    pub level: f64,
    /// Radius of the ring, km.
    pub radius: f64,
    /// Which component this is.
    pub parameter: WindParameter,
    /// Value in m/s, none if the fit failed or did not resolve this wavenumber.
    pub value: Optioned<f64>,
}

impl WindCoefficient {
    /// Whether a value is available.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }
}

/// All named coefficients for one (height, ring) cell, in the order given by
/// [`WindParameter::row_layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientRow {
    level: f64,
    radius: f64,
    coefficients: Vec<WindCoefficient>,
}

impl CoefficientRow {
    /// A row with every coefficient missing.
    pub fn missing(level: f64, radius: f64, max_wavenumber: u8) -> Self {
        let coefficients = WindParameter::row_layout(max_wavenumber)
            .into_iter()
            .map(|parameter| WindCoefficient {
                level,
                radius,
                parameter,
                value: none(),
            })
            .collect();

        CoefficientRow {
            level,
            radius,
            coefficients,
        }
    }

    /// Height of the cell, km.
    #[inline]
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Radius of the cell, km.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Value of a named coefficient, none if missing or not part of this row.
    pub fn get(&self, parameter: WindParameter) -> Optioned<f64> {
        self.coefficients
            .get(parameter.row_index())
            .map(|c| c.value)
            .unwrap_or_else(none)
    }

    /// Set the value of a named coefficient. Parameters beyond this row's wavenumbers are ignored.
    pub(crate) fn set<T>(&mut self, parameter: WindParameter, value: T)
    where
        Optioned<f64>: From<T>,
    {
        if let Some(c) = self.coefficients.get_mut(parameter.row_index()) {
            c.value = Optioned::from(value);
        }
    }

    /// Number of coefficients in the row.
    #[inline]
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Whether the row holds no coefficients at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Iterate over the coefficients in row order.
    pub fn iter(&self) -> impl Iterator<Item = &WindCoefficient> {
        self.coefficients.iter()
    }

    /// Mean tangential wind if it was recovered and is not trivially zero.
    pub fn mean_tangential_wind(&self) -> Optioned<f64> {
        let vt = self.get(WindParameter::VTC0);
        if vt.is_some() && vt.unpack() != 0.0 {
            vt
        } else {
            none()
        }
    }
}

/// Coefficient rows indexed by (height index, ring index).
///
/// The ring index is `radius - inner_radius`, the height index counts the analyzed heights from
/// the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientField {
    levels: Vec<f64>,
    radii: Vec<f64>,
    rows: Vec<Vec<CoefficientRow>>,
}

impl CoefficientField {
    /// A field with every coefficient missing.
    pub fn new(levels: Vec<f64>, radii: Vec<f64>, max_wavenumber: u8) -> Self {
        let rows = levels
            .iter()
            .map(|&level| {
                radii
                    .iter()
                    .map(|&radius| CoefficientRow::missing(level, radius, max_wavenumber))
                    .collect()
            })
            .collect();

        CoefficientField {
            levels,
            radii,
            rows,
        }
    }

    /// Analyzed heights, km.
    #[inline]
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Ring radii, km.
    #[inline]
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Number of coefficients per cell.
    pub fn row_length(&self) -> usize {
        self.rows
            .first()
            .and_then(|row| row.first())
            .map(CoefficientRow::len)
            .unwrap_or(0)
    }

    /// The row for a cell.
    pub fn get(&self, height_index: usize, ring_index: usize) -> Option<&CoefficientRow> {
        self.rows.get(height_index).and_then(|row| row.get(ring_index))
    }

    /// All cells at one height, inner ring first.
    pub fn height_row(&self, height_index: usize) -> Option<&[CoefficientRow]> {
        self.rows.get(height_index).map(Vec::as_slice)
    }

    /// Replace a whole height of the field.
    pub(crate) fn set_height_row(&mut self, height_index: usize, row: Vec<CoefficientRow>) {
        debug_assert_eq!(row.len(), self.radii.len());
        if let Some(slot) = self.rows.get_mut(height_index) {
            *slot = row;
        }
    }

    /// Index of the height closest to `level`.
    pub fn height_index(&self, level: f64) -> Option<usize> {
        nearest_index(&self.levels, level)
    }

    /// Index of the ring closest to `radius`.
    pub fn ring_index(&self, radius: f64) -> Option<usize> {
        nearest_index(&self.radii, radius)
    }

    /// One named coefficient along every ring at a height.
    pub fn radial_profile(
        &self,
        height_index: usize,
        parameter: WindParameter,
    ) -> Vec<Optioned<f64>> {
        self.rows
            .get(height_index)
            .map(|row| row.iter().map(|cell| cell.get(parameter)).collect())
            .unwrap_or_default()
    }
}

fn nearest_index(vals: &[f64], target: f64) -> Option<usize> {
    vals.iter()
        .enumerate()
        .map(|(i, v)| (i, (v - target).abs()))
        .filter(|&(_, dist)| dist <= 0.5)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}
