//! Stopping rules for the fractal packing loop.
//!
//! The loop in [`crate::triangle::Triangle::pack_circles`] runs until a
//! [`StopRule`] says otherwise: either after a fixed number of fractal levels
//! per vertex, or once the next circle would be smaller than a target
//! diameter.
//!
//! Callers describe the rule with [`PackingOptions`], the raw form read from
//! configuration files, the command line and the Python bindings. It carries
//! the historical misspelling `lenght` next to `length`;
//! [`PackingOptions::resolve`] maps the two onto one canonical value and
//! rejects contradictory input.

use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};


/// When the fractal expansion toward a vertex stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopRule {
    /// Expand exactly this many levels per vertex.
    Depth(u32),
    /// Expand while the next circle's diameter exceeds this length.
    Length(f64),
}

impl StopRule {
    /// `true` once `levels` expansions have been made under a depth bound.
    pub fn depth_reached(&self, levels: u32) -> bool {
        match self {
            StopRule::Depth(depth) => levels >= *depth,
            StopRule::Length(_) => false,
        }
    }

    /// `true` when a candidate circle of this radius is too small to keep
    /// under a length bound.
    pub fn length_reached(&self, radius: f64) -> bool {
        match self {
            StopRule::Depth(_) => false,
            StopRule::Length(length) => 2.0 * radius <= *length,
        }
    }
}

/// Raw stopping options, as written by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Legacy spelling of `length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lenght: Option<f64>,
}

impl PackingOptions {
    pub fn depth(depth: i64) -> Self {
        Self {
            depth: Some(depth),
            ..Default::default()
        }
    }

    pub fn length(length: f64) -> Self {
        Self {
            length: Some(length),
            ..Default::default()
        }
    }

    /// The length bound after folding in the legacy alias.
    pub fn canonical_length(&self) -> Result<Option<f64>> {
        match (self.length, self.lenght) {
            (Some(length), Some(lenght)) if length != lenght => {
                Err(PackError::ConflictingLength { length, lenght })
            }
            (Some(length), _) => Ok(Some(length)),
            (None, lenght) => Ok(lenght),
        }
    }

    pub fn resolve(&self) -> Result<StopRule> {
        match (self.depth, self.canonical_length()?) {
            (Some(depth), Some(length)) => Err(PackError::AmbiguousStopRule { depth, length }),
            (None, None) => Err(PackError::MissingStopRule),
            (Some(depth), None) => {
                if depth < 0 {
                    return Err(PackError::NegativeDepth(depth));
                }
                u32::try_from(depth)
                    .map(StopRule::Depth)
                    .map_err(|_| PackError::InvalidParameter {
                        field: "depth",
                        reason: format!("{depth} exceeds the supported maximum {}", u32::MAX),
                    })
            }
            (None, Some(length)) => {
                if !(length > 0.0) || !length.is_finite() {
                    return Err(PackError::InvalidLength(length));
                }
                Ok(StopRule::Length(length))
            }
        }
    }
}
