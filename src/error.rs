//! Error taxonomy for circle packing.
//!
//! Every failure in the geometry core belongs to one of three families:
//! - **Configuration**: the caller asked for something contradictory or
//!   meaningless (both stop rules, a negative depth, a zero-length bound).
//! - **Degeneracy**: the input geometry cannot support the construction
//!   (collinear vertices, circles that do not touch).
//! - **Numerical overflow**: the construction ran past what `f64` can
//!   represent, usually because the fractal depth was too large.
//!
//! [`PackError::kind`] exposes the family so callers can react to it without
//! matching every variant.

use thiserror::Error;

/// The family a [`PackError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Degeneracy,
    NumericalOverflow,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackError {
    #[error("no stopping rule given: supply either a depth or a length")]
    MissingStopRule,

    #[error("both depth ({depth}) and length ({length}) were given; supply exactly one")]
    AmbiguousStopRule { depth: i64, length: f64 },

    #[error("conflicting values for 'length' ({length}) and legacy 'lenght' ({lenght})")]
    ConflictingLength { length: f64, lenght: f64 },

    #[error("depth must be non-negative, got {0}")]
    NegativeDepth(i64),

    #[error("length must be a positive finite number, got {0}")]
    InvalidLength(f64),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("radius must be positive (or +inf for a straight boundary), got {0}")]
    InvalidRadius(f64),

    #[error("circle center must be finite, got ({0}, {1})")]
    InvalidCenter(f64, f64),

    #[error("triangle vertices are collinear (area = {area})")]
    CollinearVertices { area: f64 },

    #[error("polygon needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),

    #[error("polygon has zero area")]
    ZeroAreaPolygon,

    #[error("circle center is {distance} from its target vertex, too close to place a tangent circle")]
    VertexTooClose { distance: f64 },

    #[error("circles not tangent: centers are {distance} apart but radii sum to {radii_sum}")]
    NotTangent { distance: f64, radii_sum: f64 },

    #[error("a straight-boundary circle cannot anchor the tangent construction")]
    LineAnchor,

    #[error("invalid curvature sum {0} under the square root")]
    InvalidCurvatureSum(f64),

    #[error("non-finite value while computing {0}")]
    NonFinite(&'static str),

    #[error("radius {radius} fell below the floating-point resolution {resolution}; reduce depth or increase length")]
    BelowResolution { radius: f64, resolution: f64 },
}

impl PackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PackError::MissingStopRule
            | PackError::AmbiguousStopRule { .. }
            | PackError::ConflictingLength { .. }
            | PackError::NegativeDepth(_)
            | PackError::InvalidLength(_)
            | PackError::InvalidParameter { .. } => ErrorKind::Configuration,
            PackError::InvalidRadius(_)
            | PackError::InvalidCenter(..)
            | PackError::CollinearVertices { .. }
            | PackError::TooFewVertices(_)
            | PackError::ZeroAreaPolygon
            | PackError::VertexTooClose { .. }
            | PackError::NotTangent { .. }
            | PackError::LineAnchor => ErrorKind::Degeneracy,
            PackError::InvalidCurvatureSum(_)
            | PackError::NonFinite(_)
            | PackError::BelowResolution { .. } => ErrorKind::NumericalOverflow,
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
