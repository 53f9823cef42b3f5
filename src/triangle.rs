//! Triangles, their incircle, and the fractal circle packing.
//!
//! A [`Triangle`] stores its vertices in the order `A`, `B`, `C`. Side `a` is
//! opposite `A` (the segment `BC`), `b` is opposite `B` and `c` opposite `C`.
//! Everything derived from the vertices is computed once on construction.
//!
//! [`Triangle::pack_circles`] fills the triangle with mutually tangent
//! circles. Starting from the incircle it walks toward each vertex in turn,
//! placing at every level a circle squeezed into the corner and the Descartes
//! circles that fill the gaps around it.

use geo::Area;
use geo_types::{coord, Triangle as GeoTriangle};
use log::debug;
use nalgebra::Point2;

use crate::circle::Circle;
use crate::error::{PackError, Result};
use crate::settings::{DEGENERACY_TOLERANCE, MIN_VERTEX_DISTANCE, RESOLUTION_FACTOR};
use crate::stopping::StopRule;

/// Vertex labels, in storage order.
pub const VERTEX_LABELS: [char; 3] = ['A', 'B', 'C'];

/// Circles emitted per fractal level toward one vertex.
pub const CIRCLES_PER_LEVEL: usize = 9;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn fixture() -> Triangle {
        Triangle::from_coords(&[[2.0, 1.5], [4.5, 4.0], [6.0, 2.0]]).unwrap()
    }

    /// Signed distances from a point to the three sides, positive inside.
    fn side_distances(triangle: &Triangle, point: Point2<f64>) -> [f64; 3] {
        let v = triangle.vertices();
        let orientation = (v[1] - v[0]).perp(&(v[2] - v[0])).signum();
        [0, 1, 2].map(|i| {
            let (p, q) = (v[i], v[(i + 1) % 3]);
            orientation * (q - p).perp(&(point - p)) / (q - p).norm()
        })
    }

    /// Tangency to 1e-9 relative to the radii sum.
    fn assert_touching(p: &Circle, q: &Circle) {
        let sum = p.radius() + q.radius();
        let gap = nalgebra::distance(&p.center(), &q.center()) - sum;
        assert!(gap.abs() <= 1e-9 * sum, "{p:?} and {q:?} are {gap:e} apart");
    }

    #[test]
    fn incircle_and_geometry() {
        let triangle = fixture();
        assert_eq!(triangle.area(), 4.375);
        assert!((triangle.perimeter() - 10.066662780082012).abs() < 1e-12);
        assert!((triangle.incircle().radius() - 0.8692056336001268).abs() < 1e-12);
        assert!((triangle.incircle().center().x - 4.405957).abs() < 1e-6);
        assert!((triangle.incircle().center().y - 2.67671461).abs() < 1e-6);

        let [a, b, c] = triangle.sides();
        assert!((a - 1.5f64.hypot(2.0)).abs() < 1e-12);
        assert!((b - 4.0f64.hypot(0.5)).abs() < 1e-12);
        assert!((c - 2.5f64.hypot(2.5)).abs() < 1e-12);

        for (vertex, dist) in triangle.vertices().iter().zip(triangle.dist_to_incenter()) {
            let expected = nalgebra::distance(vertex, &triangle.incircle().center());
            assert_eq!(dist, expected);
        }
    }

    #[test]
    fn incircle_touches_every_side() {
        let triangle = fixture();
        for d in side_distances(&triangle, triangle.incircle().center()) {
            assert!((d - triangle.incircle().radius()).abs() < 1e-12);
        }
    }

    #[test]
    fn depth_zero_is_just_the_incircle() {
        let mut triangle = fixture();
        let circles = triangle.pack_circles(&StopRule::Depth(0)).unwrap();
        assert_eq!(circles, vec![triangle.incircle()]);
    }

    #[test]
    fn depth_levels_add_nine_circles_per_vertex() {
        let mut triangle = fixture();
        for depth in 1..=4 {
            let circles = triangle.pack_circles(&StopRule::Depth(depth)).unwrap();
            assert_eq!(circles.len(), 1 + 3 * CIRCLES_PER_LEVEL * depth as usize);
        }
    }

    #[test]
    fn length_bound_stops_on_diameter() {
        let mut triangle = fixture();
        let circles = triangle.pack_circles(&StopRule::Length(0.5)).unwrap();
        assert_eq!(circles.len(), 19);
        // every corner circle placed toward a vertex is above the bound
        for level in circles[1..].chunks(CIRCLES_PER_LEVEL) {
            assert!(level[0].diameter() > 0.5);
        }

        let finer = triangle.pack_circles(&StopRule::Length(0.25)).unwrap();
        assert_eq!(finer.len(), 37);
        assert_eq!(&finer[..1], &circles[..1]);
    }

    #[test]
    fn packing_is_cached_and_repeatable() {
        let mut triangle = fixture();
        assert!(triangle.circles().is_none());
        let first = triangle.pack_circles(&StopRule::Depth(3)).unwrap();
        assert_eq!(triangle.circles(), Some(first.as_slice()));
        let second = triangle.pack_circles(&StopRule::Depth(3)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn generated_circles_touch_their_generators() {
        let mut triangle = fixture();
        let circles = triangle.pack_circles(&StopRule::Depth(5)).unwrap();
        let incircle = circles[0];

        for branch in circles[1..].chunks(5 * CIRCLES_PER_LEVEL) {
            let mut previous = incircle;
            for level in branch.chunks(CIRCLES_PER_LEVEL) {
                let [new, c31, c32, c41, c42, c52, c61, c71, c82] = level else {
                    panic!("short level");
                };
                for (p, q) in [
                    (new, &previous),
                    (c31, &previous),
                    (c31, new),
                    (c32, &previous),
                    (c32, new),
                    (c41, &previous),
                    (c41, new),
                    (c41, c31),
                    (c42, &previous),
                    (c42, new),
                    (c52, new),
                    (c52, c31),
                    (c61, new),
                    (c61, c32),
                    (c71, &previous),
                    (c71, c31),
                    (c82, &previous),
                    (c82, c32),
                ] {
                    assert_touching(p, q);
                }
                assert!(new.is_tangent_to(&previous));
                for c in [c31, c32] {
                    assert!(c.is_tangent_to(&previous) && c.is_tangent_to(new));
                }
                assert!(c41.is_tangent_to(&previous) && c41.is_tangent_to(new));
                assert!(c41.is_tangent_to(c31));
                assert!(c42.is_tangent_to(&previous) && c42.is_tangent_to(new));
                assert!(c52.is_tangent_to(new) && c52.is_tangent_to(c31));
                assert!(c61.is_tangent_to(new) && c61.is_tangent_to(c32));
                assert!(c71.is_tangent_to(&previous) && c71.is_tangent_to(c31));
                assert!(c82.is_tangent_to(&previous) && c82.is_tangent_to(c32));
                previous = *new;
            }
        }
    }

    #[test]
    fn circles_stay_inside() {
        for coords in [
            [[2.0, 1.5], [4.5, 4.0], [6.0, 2.0]],
            [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            [[1.0, 1.5], [6.0, 2.5], [4.0, 5.5]],
        ] {
            let mut triangle = Triangle::from_coords(&coords).unwrap();
            for circle in triangle.pack_circles(&StopRule::Depth(4)).unwrap() {
                for d in side_distances(&triangle, circle.center()) {
                    assert!(d >= circle.radius() - 1e-9, "{circle:?} crosses a side");
                }
            }
        }
    }

    #[test]
    fn excessive_depth_overflows() {
        let mut triangle = fixture();
        let err = triangle.pack_circles(&StopRule::Depth(100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericalOverflow, "{err}");
        // a failed call leaves the previous result in place
        assert!(triangle.circles().is_none());
    }

    #[test]
    fn tiny_length_overflows() {
        let mut triangle = fixture();
        let err = triangle.pack_circles(&StopRule::Length(1e-300)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericalOverflow, "{err}");
    }

    #[test]
    fn vertex_floor_scales_with_magnitude() {
        let floor = MIN_VERTEX_DISTANCE * 1e6;
        assert!(matches!(
            corner_radius(1.0, floor / 2.0, floor, 1e-9),
            Err(PackError::VertexTooClose { .. })
        ));
        assert!(corner_radius(1e-7, floor * 1e3, floor, 1e-20).is_ok());

        let mut far = Triangle::from_coords(&[[1e4, 1e4], [1e4 + 4.0, 1e4], [1e4, 1e4 + 3.0]])
            .unwrap();
        let circles = far.pack_circles(&StopRule::Depth(3)).unwrap();
        assert_eq!(circles.len(), 1 + 3 * 3 * CIRCLES_PER_LEVEL);
    }

    #[test]
    fn collinear_vertices_are_rejected() {
        let err = Triangle::from_coords(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).unwrap_err();
        assert!(matches!(err, PackError::CollinearVertices { .. }));
        assert_eq!(err.kind(), ErrorKind::Degeneracy);
        assert!(matches!(
            Triangle::from_coords(&[[0.0, 0.0], [1.0, 1.0]]),
            Err(PackError::TooFewVertices(2))
        ));
    }

    #[test]
    fn bisect_splits_longest_side() {
        let triangle = Triangle::from_coords(&[[0.0, 0.0], [4.0, 0.0], [0.0, 2.0]]).unwrap();
        let [left, right] = triangle.bisect().unwrap();
        assert_eq!(left.area() + right.area(), triangle.area());
        assert!(left.vertices().contains(&Point2::new(2.0, 1.0)));
        assert!(right.vertices().contains(&Point2::new(2.0, 1.0)));
    }
}

/// A triangle with its incircle and most recent packing.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    vertices: [Point2<f64>; 3],
    sides: [f64; 3],
    perimeter: f64,
    area: f64,
    incircle: Circle,
    dist_to_incenter: [f64; 3],
    circles: Option<Vec<Circle>>,
}

impl Triangle {
    pub fn new(vertices: [Point2<f64>; 3]) -> Result<Self> {
        if let Some(v) = vertices
            .iter()
            .find(|v| !v.x.is_finite() || !v.y.is_finite())
        {
            return Err(PackError::InvalidCenter(v.x, v.y));
        }
        let [a, b, c] = vertices;

        let area = GeoTriangle::new(
            coord! { x: a.x, y: a.y },
            coord! { x: b.x, y: b.y },
            coord! { x: c.x, y: c.y },
        )
        .unsigned_area();

        let sides = [
            nalgebra::distance(&b, &c),
            nalgebra::distance(&a, &c),
            nalgebra::distance(&a, &b),
        ];
        let perimeter = sides[0] + sides[1] + sides[2];
        if !(area > DEGENERACY_TOLERANCE * perimeter.powi(2)) {
            return Err(PackError::CollinearVertices { area });
        }

        // incenter: vertices weighted by the length of the opposite side
        let center = Point2::from(
            (a.coords * sides[0] + b.coords * sides[1] + c.coords * sides[2]) / perimeter,
        );
        let incircle = Circle::new(center, 2.0 * area / perimeter)?;
        let dist_to_incenter = vertices.map(|v| nalgebra::distance(&center, &v));

        Ok(Self {
            vertices,
            sides,
            perimeter,
            area,
            incircle,
            dist_to_incenter,
            circles: None,
        })
    }

    pub fn from_coords(coords: &[[f64; 2]]) -> Result<Self> {
        let [a, b, c] = coords else {
            return Err(PackError::TooFewVertices(coords.len()));
        };
        Self::new([
            Point2::new(a[0], a[1]),
            Point2::new(b[0], b[1]),
            Point2::new(c[0], c[1]),
        ])
    }

    pub fn vertices(&self) -> &[Point2<f64>; 3] {
        &self.vertices
    }

    /// Side lengths `[a, b, c]`, each opposite the vertex of the same index.
    pub fn sides(&self) -> [f64; 3] {
        self.sides
    }

    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn incircle(&self) -> Circle {
        self.incircle
    }

    /// Distance from the incenter to each vertex, in vertex order.
    pub fn dist_to_incenter(&self) -> [f64; 3] {
        self.dist_to_incenter
    }

    /// Result of the last successful [`Triangle::pack_circles`] call.
    pub fn circles(&self) -> Option<&[Circle]> {
        self.circles.as_deref()
    }

    /// Packs the triangle with tangent circles.
    ///
    /// The sequence starts with the incircle, followed by the levels generated
    /// toward `A`, then `B`, then `C`. Each level holds
    /// [`CIRCLES_PER_LEVEL`] circles in a fixed order: the corner circle, the
    /// two circles between it, the previous circle and the sides, the two
    /// gap circles between those three, and four smaller circles in the
    /// remaining side gaps.
    ///
    /// The result is cached on the triangle and also returned.
    pub fn pack_circles(&mut self, rule: &StopRule) -> Result<Vec<Circle>> {
        let circles = self.generate(rule)?;
        self.circles = Some(circles.clone());
        Ok(circles)
    }

    fn generate(&self, rule: &StopRule) -> Result<Vec<Circle>> {
        let magnitude = self.magnitude();
        let resolution = RESOLUTION_FACTOR * f64::EPSILON * magnitude;
        let min_distance = MIN_VERTEX_DISTANCE * magnitude;
        let mut circles = vec![self.incircle];

        for ((label, vertex), &start) in VERTEX_LABELS
            .iter()
            .zip(&self.vertices)
            .zip(&self.dist_to_incenter)
        {
            let mut current = self.incircle;
            let mut distance = start;
            let mut levels = 0;

            loop {
                if rule.depth_reached(levels) {
                    break;
                }
                let radius = corner_radius(current.radius(), distance, min_distance, resolution)?;
                if rule.length_reached(radius) {
                    break;
                }
                if radius < resolution {
                    return Err(PackError::BelowResolution { radius, resolution });
                }

                let next = corner_circle(&current, vertex, distance, radius)?;
                circles.extend(expand_level(&current, &next)?);

                distance = nalgebra::distance(vertex, &next.center());
                current = next;
                levels += 1;
            }
            debug!(
                "vertex {label}: {levels} levels, smallest corner radius {:.3e}",
                current.radius()
            );
        }

        Ok(circles)
    }

    /// Splits the triangle at the midpoint of its longest side.
    pub fn bisect(&self) -> Result<[Triangle; 2]> {
        let (apex, _) = self
            .sides
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &side)| {
                if side > best.1 {
                    (i, side)
                } else {
                    best
                }
            });
        let p = self.vertices[apex];
        let q = self.vertices[(apex + 1) % 3];
        let r = self.vertices[(apex + 2) % 3];
        let midpoint = nalgebra::center(&q, &r);

        Ok([Triangle::new([p, q, midpoint])?, Triangle::new([p, midpoint, r])?])
    }

    /// Largest absolute coordinate, at least 1.
    fn magnitude(&self) -> f64 {
        self.vertices
            .iter()
            .flat_map(|v| [v.x.abs(), v.y.abs()])
            .fold(1.0, f64::max)
    }
}

/// Radius of the circle squeezed between `current` and the corner it faces.
///
/// The new circle touches `current` and the two sides meeting at the vertex,
/// which gives `r = (R·D − R²) / (R + D)` for a current radius `R` at
/// distance `D` from the vertex. Distances below `min_distance` are rejected.
fn corner_radius(radius: f64, distance: f64, min_distance: f64, resolution: f64) -> Result<f64> {
    if !(distance >= min_distance) {
        return Err(PackError::VertexTooClose { distance });
    }
    let next = (radius * distance - radius.powi(2)) / (radius + distance);
    if !next.is_finite() {
        return Err(PackError::NonFinite("corner circle radius"));
    }
    if next <= 0.0 {
        return Err(PackError::BelowResolution {
            radius: next,
            resolution,
        });
    }
    Ok(next)
}

/// The corner circle, placed on the segment from `current`'s center to the
/// vertex at one radii-sum from `current`.
fn corner_circle(
    current: &Circle,
    vertex: &Point2<f64>,
    distance: f64,
    radius: f64,
) -> Result<Circle> {
    let origin = current.center();
    let center = origin + (vertex - origin) * ((current.radius() + radius) / distance);
    if !center.x.is_finite() || !center.y.is_finite() {
        return Err(PackError::NonFinite("corner circle center"));
    }
    Circle::new(center, radius)
}

/// One fractal level: the corner circle and the Descartes circles around it.
fn expand_level(current: &Circle, next: &Circle) -> Result<[Circle; CIRCLES_PER_LEVEL]> {
    let (c31, c32) = current.tangent_circles(next, None)?;
    let (c41, c42) = current.tangent_circles(next, Some(&c31))?;
    let (_, c52) = next.tangent_circles(&c31, None)?;
    let (c61, _) = next.tangent_circles(&c32, None)?;
    let (c71, _) = current.tangent_circles(&c31, None)?;
    let (_, c82) = current.tangent_circles(&c32, None)?;

    Ok([*next, c31, c32, c41, c42, c52, c61, c71, c82])
}
