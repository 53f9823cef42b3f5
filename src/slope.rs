//! Geotechnical slope cross-sections.
//!
//! Both builders produce a closed boundary ring that starts and ends at the
//! bottom-left corner `(x_first, 0)` and runs counter-clockwise: along the
//! base, up the toe side, back along the ground surface from toe to crown and
//! down the crown side. The crown is always on the left.
//!
//! - [`AnthropicSlope`]: an engineered slope from its height, dip, crown and
//!   toe lengths.
//! - [`NaturalSlope`]: an arbitrary surface polyline.
//!
//! When no depth is given, the depth below the toe defaults to the maximum
//! depth reached by the largest circular failure surface through both
//! extreme surface points.

use nalgebra::Point2;

use crate::error::{PackError, Result};
use crate::polygon::Polygon;


/// Depth below the toe reached by the largest circle that passes through the
/// crown start and the toe end and is orthogonal to both vertical boundaries.
fn max_depth(crown_start: Point2<f64>, toe_end: Point2<f64>) -> f64 {
    let delta = toe_end - crown_start;
    let radius = delta.norm_squared() / (2.0 * delta.x);
    radius - (crown_start.y - toe_end.y)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> PackError {
    PackError::InvalidParameter {
        field,
        reason: reason.into(),
    }
}

fn check_depth(depth: Option<f64>) -> Result<()> {
    match depth {
        Some(depth) if !(depth > 0.0) || !depth.is_finite() => {
            Err(invalid("depth", format!("must be positive, got {depth}")))
        }
        _ => Ok(()),
    }
}

/// An engineered slope: flat crown, straight face, flat toe.
#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicSlope {
    pub slope_height: f64,
    /// Face inclination as `[run, rise]`.
    pub slope_dip: [f64; 2],
    pub crown_dist: f64,
    pub toe_dist: f64,
    depth: f64,
    max_depth: f64,
    bound_coords: Vec<Point2<f64>>,
}

impl AnthropicSlope {
    pub fn new(
        slope_height: f64,
        slope_dip: [f64; 2],
        crown_dist: f64,
        toe_dist: f64,
        depth: Option<f64>,
    ) -> Result<Self> {
        if !(slope_height > 0.0) || !slope_height.is_finite() {
            return Err(invalid("slope_height", format!("must be positive, got {slope_height}")));
        }
        let [run, rise] = slope_dip;
        if !(rise > 0.0) || !(run >= 0.0) || !run.is_finite() || !rise.is_finite() {
            return Err(invalid(
                "slope_dip",
                format!("expected [run >= 0, rise > 0], got [{run}, {rise}]"),
            ));
        }
        if !(crown_dist >= 0.0) || !(toe_dist >= 0.0) {
            return Err(invalid(
                "crown_dist",
                format!("crown and toe lengths must be non-negative, got {crown_dist} and {toe_dist}"),
            ));
        }
        check_depth(depth)?;

        let slope_dist = slope_height * run / rise;
        let total_dist = crown_dist + slope_dist + toe_dist;
        if !(total_dist > 0.0) || !total_dist.is_finite() {
            return Err(invalid("crown_dist", "slope has no horizontal extent"));
        }

        // origin at the toe end, at toe level
        let max_depth = max_depth(
            Point2::new(0.0, slope_height),
            Point2::new(total_dist, 0.0),
        );
        let depth = depth.unwrap_or(max_depth);
        let top = depth + slope_height;

        let bound_coords = vec![
            Point2::new(0.0, 0.0),
            Point2::new(total_dist, 0.0),
            Point2::new(total_dist, depth),
            Point2::new(crown_dist + slope_dist, depth),
            Point2::new(crown_dist, top),
            Point2::new(0.0, top),
            Point2::new(0.0, 0.0),
        ];

        Ok(Self {
            slope_height,
            slope_dip,
            crown_dist,
            toe_dist,
            depth,
            max_depth,
            bound_coords,
        })
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn max_depth(&self) -> f64 {
        self.max_depth
    }

    pub fn bound_coords(&self) -> &[Point2<f64>] {
        &self.bound_coords
    }

    pub fn polygon(&self) -> Result<Polygon> {
        Polygon::new(self.bound_coords.clone())
    }
}

/// A slope following a measured ground surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalSlope {
    surface: Vec<Point2<f64>>,
    depth: f64,
    max_depth: f64,
    bound_coords: Vec<Point2<f64>>,
}

impl NaturalSlope {
    /// Builds the section from a surface polyline ordered from crown to toe.
    ///
    /// With `depth = None` the surface is used in place and must lie above
    /// `y = 0`. Otherwise it is shifted vertically so that its lowest point
    /// sits `depth` above the base.
    pub fn new(surface: Vec<Point2<f64>>, depth: Option<f64>) -> Result<Self> {
        if surface.len() < 2 {
            return Err(invalid("surface", format!("needs at least 2 points, got {}", surface.len())));
        }
        if surface.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(invalid("surface", "coordinates must be finite"));
        }
        if surface.windows(2).any(|w| !(w[1].x >= w[0].x)) {
            return Err(invalid("surface", "x coordinates must not decrease"));
        }
        check_depth(depth)?;

        let first = surface[0];
        let last = surface[surface.len() - 1];
        if !(last.x > first.x) || !(first.y > last.y) {
            return Err(invalid("surface", "expected the crown on the left, higher than the toe"));
        }

        let lowest = surface.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let surface: Vec<Point2<f64>> = match depth {
            Some(depth) => surface
                .iter()
                .map(|p| Point2::new(p.x, p.y - lowest + depth))
                .collect(),
            None if lowest > 0.0 => surface,
            None => return Err(invalid("surface", "must lie above y = 0 when no depth is given")),
        };
        let depth = depth.unwrap_or(lowest);

        let max_depth = max_depth(surface[0], surface[surface.len() - 1]);

        let mut bound_coords = vec![Point2::new(first.x, 0.0), Point2::new(last.x, 0.0)];
        bound_coords.extend(surface.iter().rev());
        bound_coords.push(Point2::new(first.x, 0.0));

        Ok(Self {
            surface,
            depth,
            max_depth,
            bound_coords,
        })
    }

    pub fn from_coords(surface: &[[f64; 2]], depth: Option<f64>) -> Result<Self> {
        Self::new(
            surface.iter().map(|&[x, y]| Point2::new(x, y)).collect(),
            depth,
        )
    }

    pub fn surface(&self) -> &[Point2<f64>] {
        &self.surface
    }

    /// Height of the lowest surface point above the base.
    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn max_depth(&self) -> f64 {
        self.max_depth
    }

    pub fn bound_coords(&self) -> &[Point2<f64>] {
        &self.bound_coords
    }

    pub fn polygon(&self) -> Result<Polygon> {
        Polygon::new(self.bound_coords.clone())
    }
}
