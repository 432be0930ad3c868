//! Enums used as keys for selecting options and naming coefficients.
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// How a ring of radial velocities is mapped onto storm relative angles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum Geometry {
    /// Ground-Based Velocity Track Display. Azimuths are corrected for the offset between the
    /// radar beam and the storm centered circle.
    #[strum(to_string = "GBVTD", serialize = "gbvtd")]
    #[serde(rename = "GBVTD")]
    Gbvtd,
    /// Generalized Velocity Track Display. Velocities are rescaled by their distance from the
    /// radar relative to the distance to the center.
    #[strum(to_string = "GVTD", serialize = "gvtd")]
    #[serde(rename = "GVTD")]
    Gvtd,
}

/// How the unresolved cross beam mean wind is handled when naming coefficients.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum Closure {
    /// Assume the cross beam component of the mean wind is zero.
    #[strum(to_string = "original", serialize = "Original")]
    #[serde(rename = "original")]
    Original,
    /// Remove an externally estimated environmental wind from the mean tangential wind.
    #[strum(to_string = "hvvp", serialize = "HVVP")]
    #[serde(rename = "hvvp")]
    Hvvp,
}

/// Named wind coefficient produced by a ring fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindParameter {
    /// Azimuthal mean tangential wind.
    VTC0,
    /// Azimuthal mean radial wind.
    VRC0,
    /// Mean wind projected on the radar to center line.
    VMC0,
    /// Cosine component of the tangential wind at wavenumber `k >= 1`.
    VTC(u8),
    /// Sine component of the tangential wind at wavenumber `k >= 1`.
    VTS(u8),
}

impl WindParameter {
    /// Canonical order of the parameters in a coefficient row with asymmetries up to
    /// `max_wavenumber`.
    pub fn row_layout(max_wavenumber: u8) -> Vec<WindParameter> {
        use WindParameter::*;

        let mut layout = Vec::with_capacity(row_length(max_wavenumber));
        layout.extend_from_slice(&[VTC0, VRC0, VMC0]);
        for k in 1..=max_wavenumber {
            layout.push(VTC(k));
            layout.push(VTS(k));
        }
        layout
    }

    /// Position of this parameter in a row built by `row_layout`.
    pub fn row_index(self) -> usize {
        use WindParameter::*;

        match self {
            VTC0 => 0,
            VRC0 => 1,
            VMC0 => 2,
            VTC(k) => 1 + 2 * k as usize,
            VTS(k) => 2 + 2 * k as usize,
        }
    }
}

/// Number of named coefficients in a row resolving asymmetries up to `max_wavenumber`.
pub fn row_length(max_wavenumber: u8) -> usize {
    2 * max_wavenumber as usize + 3
}

impl fmt::Display for WindParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use WindParameter::*;

        match self {
            VTC0 => write!(f, "VTC0"),
            VRC0 => write!(f, "VRC0"),
            VMC0 => write!(f, "VMC0"),
            VTC(k) => write!(f, "VTC{}", k),
            VTS(k) => write!(f, "VTS{}", k),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_names() {
        assert_eq!(Geometry::from_str("GBVTD").unwrap(), Geometry::Gbvtd);
        assert_eq!(Geometry::from_str("gvtd").unwrap(), Geometry::Gvtd);
        assert_eq!(Closure::from_str("hvvp").unwrap(), Closure::Hvvp);
        assert_eq!(Closure::from_str("original").unwrap(), Closure::Original);
        assert!(Closure::from_str("bogus").is_err());

        for geometry in Geometry::iter() {
            assert_eq!(Geometry::from_str(&geometry.to_string()).unwrap(), geometry);
        }
    }

    #[test]
    fn test_row_layout_matches_index() {
        for max_wave in 1..=5 {
            let layout = WindParameter::row_layout(max_wave);
            assert_eq!(layout.len(), row_length(max_wave));
            for (i, param) in layout.iter().enumerate() {
                assert_eq!(param.row_index(), i, "{}", param);
            }
        }

        assert_eq!(WindParameter::VTS(2).to_string(), "VTS2");
    }
}
