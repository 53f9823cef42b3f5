//! Size statistics of a packing.
//!
//! Packed particles are usually handed to a discrete-element model, where
//! the grading curve matters as much as the count. This module summarises
//! the diameters of a packing and bins them into a frequency histogram.

use std::fmt;

use itertools::Itertools;
use ndarray::Array1;
use ndarray_stats::{errors::MinMaxError, QuantileExt};
use serde::Serialize;

use crate::error::{PackError, Result};
use crate::stopping::StopRule;


/// Frequency of diameters over equal-width bins between the smallest and
/// largest diameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiameterHistogram {
    /// Bin edges, one more than the number of bins.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

fn range_error(err: MinMaxError) -> PackError {
    match err {
        MinMaxError::EmptyInput => PackError::InvalidParameter {
            field: "diameters",
            reason: "no circles have been packed".to_string(),
        },
        MinMaxError::UndefinedOrder => PackError::NonFinite("diameter range"),
    }
}

impl DiameterHistogram {
    pub fn new(diameters: &Array1<f64>, bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(PackError::InvalidParameter {
                field: "bins",
                reason: "histogram needs at least one bin".to_string(),
            });
        }
        let min = *diameters.min().map_err(range_error)?;
        let max = *diameters.max().map_err(range_error)?;
        if !min.is_finite() || !max.is_finite() {
            return Err(PackError::NonFinite("diameter range"));
        }

        let width = (max - min) / bins as f64;
        let edges = (0..bins)
            .map(|i| min + width * i as f64)
            .chain(std::iter::once(max))
            .collect();

        let occupied = diameters
            .iter()
            .map(|d| {
                if width > 0.0 {
                    (((d - min) / width) as usize).min(bins - 1)
                } else {
                    0
                }
            })
            .counts();
        let counts = (0..bins)
            .map(|i| occupied.get(&i).copied().unwrap_or(0))
            .collect();

        Ok(Self { edges, counts })
    }
}

/// Overall figures for a packed polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackingSummary {
    pub generated: String,
    pub rule: StopRule,
    pub max_area: Option<f64>,
    pub num_triangles: usize,
    pub num_circles: usize,
    pub polygon_area: f64,
    pub packed_area: f64,
    /// Packed area over polygon area.
    pub coverage: f64,
    pub min_diameter: f64,
    pub max_diameter: f64,
    pub mean_diameter: f64,
    pub std_diameter: f64,
    pub histogram: DiameterHistogram,
}

impl fmt::Display for PackingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Packing:
  - Stopping rule: {:?}
  - Triangles: {}
  - Circles: {}
  - Polygon area: {:.6}
  - Packed area: {:.6} ({:.2}%)
  - Diameter range: {:.6} .. {:.6}
  - Diameter mean: {:.6} (std {:.6})
  ",
            self.rule,
            self.num_triangles,
            self.num_circles,
            self.polygon_area,
            self.packed_area,
            100.0 * self.coverage,
            self.min_diameter,
            self.max_diameter,
            self.mean_diameter,
            self.std_diameter,
        )
    }
}
