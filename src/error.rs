//! Error types for the vortex-analysis crate.
use std::fmt;

/// Error type for the crate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnalysisError {
    /// Not enough data available for analysis. Either fewer samples than unknowns, or an azimuth
    /// gap too wide to fit even the mean of a ring.
    NotEnoughData,
    /// A zero pivot was hit while solving the normal equations.
    SingularMatrix,
    /// A trial center or reference point is outside the gridded data.
    OutOfBounds,
    /// None of the optimizer starts converged to a physically plausible center.
    NoConsensus,
    /// A configuration parameter is out of range or inconsistent with another.
    InvalidConfig(ConfigError),
    /// The run was aborted by an external signal.
    Cancelled,
}

/// Detail for [`AnalysisError::InvalidConfig`], naming the offending parameter.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConfigError {
    /// The number of optimizer starting points is zero, too large, or not a perfect square.
    NumPoints,
    /// The inner radius is not inside the outer radius, or the ring width is not positive.
    Radii,
    /// The bottom level is above the top level.
    Levels,
    /// The maximum wavenumber is zero.
    MaxWavenumber,
    /// A data gap limit is not positive.
    DataGaps,
    /// Convergence criterion or iteration cap is not positive.
    Convergence,
    /// The starting box or radius of influence is negative.
    SearchBox,
    /// Observation windows are not positive.
    ObservationWindow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ConfigError::*;

        let msg = match self {
            NumPoints => "number of starting points must be a perfect square in 1..=25",
            Radii => "inner radius must be below outer radius and ring width positive",
            Levels => "bottom level must not be above top level",
            MaxWavenumber => "maximum wavenumber must be at least 1",
            DataGaps => "data gap limits must be positive",
            Convergence => "convergence criterion and iteration cap must be positive",
            SearchBox => "box diameter and radius of influence must not be negative",
            ObservationWindow => "observation time and radius windows must be positive",
        };

        write!(f, "{}", msg)
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use AnalysisError::*;

        match self {
            NotEnoughData => write!(f, "Not enough data available for analysis."),
            SingularMatrix => write!(f, "Singular matrix in least squares fit."),
            OutOfBounds => write!(f, "Location is outside the gridded data."),
            NoConsensus => write!(f, "No converging optimizer starts."),
            InvalidConfig(err) => write!(f, "Invalid configuration: {}.", err),
            Cancelled => write!(f, "Analysis cancelled."),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl From<ConfigError> for AnalysisError {
    fn from(err: ConfigError) -> Self {
        AnalysisError::InvalidConfig(err)
    }
}
