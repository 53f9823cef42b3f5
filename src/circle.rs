//! Circles and the Descartes tangent-circle construction.
//!
//! A [`Circle`] is an immutable value: its curvature, diameter, area and
//! perimeter are computed once when it is built. The only operation with real
//! content is [`Circle::tangent_circles`], which combines Descartes' circle
//! theorem (for the radius) with a two-circle intersection (for the centers).
//!
//! # Key Components
//!
//! - [`Circle`]: center, radius and derived quantities
//! - [`Circle::line`]: the infinite-radius sentinel standing in for a straight boundary
//! - [`Circle::tangent_circles`]: the special and general Descartes cases

use std::f64::consts::PI;

use itertools::Itertools;
use nalgebra::{Point2, Vector2};
use serde::Serialize;

use crate::error::{PackError, Result};
use crate::settings::{COORDINATE_ULPS, TANGENCY_TOLERANCE};


/// A circle in the plane.
///
/// The radius is strictly positive, or `+inf` for the straight-boundary
/// sentinel built by [`Circle::line`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    center: Point2<f64>,
    radius: f64,
    curvature: f64,
    diameter: f64,
    area: f64,
    perimeter: f64,
}

impl Circle {
    pub fn new(center: Point2<f64>, radius: f64) -> Result<Self> {
        if !(radius > 0.0) {
            return Err(PackError::InvalidRadius(radius));
        }
        if !center.x.is_finite() || !center.y.is_finite() {
            return Err(PackError::InvalidCenter(center.x, center.y));
        }

        Ok(Self {
            center,
            radius,
            curvature: 1.0 / radius,
            diameter: 2.0 * radius,
            area: PI * radius.powi(2),
            perimeter: 2.0 * radius * PI,
        })
    }

    /// The infinite-radius circle standing in for a straight boundary.
    /// Only meaningful as the third input of [`Circle::tangent_circles`].
    pub fn line() -> Self {
        Self {
            center: Point2::origin(),
            radius: f64::INFINITY,
            curvature: 0.0,
            diameter: f64::INFINITY,
            area: f64::INFINITY,
            perimeter: f64::INFINITY,
        }
    }

    pub fn center(&self) -> Point2<f64> {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    pub fn is_line(&self) -> bool {
        self.radius.is_infinite()
    }

    /// Whether the two circles touch externally, i.e. their centers are one
    /// radii-sum apart.
    ///
    /// The tolerance is relative to the radii sum, plus a floor of a few ulps
    /// of the coordinate magnitude.
    pub fn is_tangent_to(&self, other: &Circle) -> bool {
        let (distance, radii_sum, tolerance) = self.tangency_gap(other);
        (distance - radii_sum).abs() <= tolerance
    }

    fn tangency_gap(&self, other: &Circle) -> (f64, f64, f64) {
        let distance = nalgebra::distance(&self.center, &other.center);
        let radii_sum = self.radius + other.radius;
        let magnitude = [self.center, other.center]
            .iter()
            .flat_map(|p| [p.x.abs(), p.y.abs()])
            .fold(1.0, f64::max);
        let tolerance = TANGENCY_TOLERANCE * radii_sum + COORDINATE_ULPS * f64::EPSILON * magnitude;
        (distance, radii_sum, tolerance)
    }

    /// Computes the two circles tangent to `self` and `other` given by
    /// Descartes' theorem.
    ///
    /// **Special case** (`third = None`): the implied third circle is a
    /// straight line, so the new curvature is `k0 + k1 + 2·sqrt(k0·k1)`.
    ///
    /// **General case**: `k0 + k1 + k2 + 2·sqrt(k0·k1 + k1·k2 + k2·k0)`. A
    /// [`Circle::line`] third has zero curvature and falls back to the special
    /// case.
    ///
    /// The centers are the two intersections of the circles of radius
    /// `self.r + r` around `self` and `other.r + r` around `other` (Paul
    /// Bourke's construction). Both results touch `self` and `other`; in the
    /// general case the one on the same side as `third` also touches it.
    /// A finite `third` must itself touch both `self` and `other`.
    pub fn tangent_circles(&self, other: &Circle, third: Option<&Circle>) -> Result<(Circle, Circle)> {
        if self.is_line() || other.is_line() {
            return Err(PackError::LineAnchor);
        }
        let (distance, radii_sum, tolerance) = self.tangency_gap(other);
        if !((distance - radii_sum).abs() <= tolerance) {
            return Err(PackError::NotTangent {
                distance,
                radii_sum,
            });
        }

        let mut curvatures = vec![self.curvature, other.curvature];
        if let Some(third) = third {
            if !third.is_line() {
                for anchor in [self, other] {
                    let (distance, radii_sum, tolerance) = third.tangency_gap(anchor);
                    if !((distance - radii_sum).abs() <= tolerance) {
                        return Err(PackError::NotTangent {
                            distance,
                            radii_sum,
                        });
                    }
                }
            }
            curvatures.push(third.curvature);
        }
        let radius = descartes_curvature(&curvatures)?.recip();

        let (center3, center4) = intersections(
            self.center,
            self.radius + radius,
            other.center,
            other.radius + radius,
        )?;

        Ok((
            Circle::new(center3, radius)?,
            Circle::new(center4, radius)?,
        ))
    }
}

/// Curvature of the circle inscribed between mutually tangent circles.
fn descartes_curvature(curvatures: &[f64]) -> Result<f64> {
    let sum: f64 = curvatures.iter().sum();
    let products: f64 = curvatures
        .iter()
        .tuple_combinations()
        .map(|(a, b)| a * b)
        .sum();

    if !(products >= 0.0) || !products.is_finite() {
        return Err(PackError::InvalidCurvatureSum(products));
    }

    let curvature = sum + 2.0 * products.sqrt();
    if !curvature.is_finite() || !(curvature > 0.0) {
        return Err(PackError::NonFinite("tangent circle curvature"));
    }
    Ok(curvature)
}

/// Intersection points of two circles, by projecting onto the line between
/// the centers and offsetting by the half chord.
fn intersections(
    center0: Point2<f64>,
    radius0: f64,
    center1: Point2<f64>,
    radius1: f64,
) -> Result<(Point2<f64>, Point2<f64>)> {
    let offset = center1 - center0;
    let dist = offset.norm();
    let unit = offset / dist;
    let normal = Vector2::new(-unit.y, unit.x);

    let chord_dist = (radius0.powi(2) - radius1.powi(2) + dist.powi(2)) / (2.0 * dist);
    let half_chord = (radius0.powi(2) - chord_dist.powi(2)).sqrt();
    if !half_chord.is_finite() || !chord_dist.is_finite() {
        return Err(PackError::NonFinite("tangent circle center"));
    }

    let midpoint = center0 + unit * chord_dist;
    let first = midpoint + normal * half_chord;
    let second = midpoint - normal * half_chord;

    if [first.x, first.y, second.x, second.y]
        .iter()
        .any(|v| !v.is_finite())
    {
        return Err(PackError::NonFinite("tangent circle center"));
    }
    Ok((first, second))
}
