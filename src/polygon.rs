//! Closed polygons and their decomposition into triangles.
//!
//! The packer only knows how to fill triangles, so any other region is first
//! split by a [`Triangulate`] implementation. [`Earcut`] is the default: ear
//! clipping through `geo`, optionally followed by longest-side bisection
//! until no triangle exceeds a maximum area.

use geo::{Area, TriangulateEarcut};
use geo_types::{Coord, LineString, Polygon as GeoPolygon};
use itertools::Itertools;
use log::{debug, warn};
use nalgebra::Point2;

use crate::error::{PackError, Result};
use crate::settings::DEGENERACY_TOLERANCE;
use crate::triangle::Triangle;

#[cfg(test)]
mod tests {
    use super::*;

    fn hexagon() -> Polygon {
        Polygon::from_coords(&[
            [1.0, 1.0],
            [2.0, 5.0],
            [4.5, 6.0],
            [8.0, 3.0],
            [7.0, 1.0],
            [4.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn polygon_area() {
        assert_eq!(hexagon().area(), 27.5);
        let triangle = Polygon::from_coords(&[[1.0, 1.0], [4.0, 8.0], [8.0, 5.0]]).unwrap();
        assert_eq!(triangle.area(), 18.5);
    }

    #[test]
    fn closing_vertex_is_dropped() {
        let square =
            Polygon::from_coords(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]])
                .unwrap();
        assert_eq!(square.coordinates().len(), 4);
        assert_eq!(square.bound_coords().len(), 5);
        assert_eq!(square.bound_coords()[0], square.bound_coords()[4]);
        assert_eq!(square.area(), 1.0);
        assert_eq!(square.perimeter(), 4.0);
    }

    #[test]
    fn rejects_degenerate_polygons() {
        assert_eq!(
            Polygon::from_coords(&[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]).unwrap_err(),
            PackError::TooFewVertices(2)
        );
        assert_eq!(
            Polygon::from_coords(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]).unwrap_err(),
            PackError::ZeroAreaPolygon
        );
    }

    #[test]
    fn earcut_covers_the_polygon() {
        let polygon = hexagon();
        let triangles = Earcut::default().triangulate(&polygon).unwrap();
        assert_eq!(triangles.len(), 4);
        let total: f64 = triangles.iter().map(Triangle::area).sum();
        assert!((total - polygon.area()).abs() < 1e-9);
    }

    #[test]
    fn max_area_refines() {
        let polygon = hexagon();
        let triangles = Earcut::with_max_area(2.0).triangulate(&polygon).unwrap();
        assert!(triangles.len() > 4);
        assert!(triangles.iter().all(|t| t.area() <= 2.0));
        let total: f64 = triangles.iter().map(Triangle::area).sum();
        assert!((total - polygon.area()).abs() < 1e-9);
    }

    #[test]
    fn invalid_max_area() {
        let err = Earcut::with_max_area(0.0)
            .triangulate(&hexagon())
            .unwrap_err();
        assert!(matches!(
            err,
            PackError::InvalidParameter {
                field: "max_area",
                ..
            }
        ));
    }
}

/// A simple polygon given by its vertices in order, without repeating the
/// first vertex at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    coordinates: Vec<Point2<f64>>,
    area: f64,
    perimeter: f64,
}

impl Polygon {
    pub fn new(mut coordinates: Vec<Point2<f64>>) -> Result<Self> {
        if let Some(v) = coordinates
            .iter()
            .find(|v| !v.x.is_finite() || !v.y.is_finite())
        {
            return Err(PackError::InvalidCenter(v.x, v.y));
        }
        if coordinates.len() > 1 && coordinates.first() == coordinates.last() {
            coordinates.pop();
        }
        if coordinates.len() < 3 {
            return Err(PackError::TooFewVertices(coordinates.len()));
        }

        let area = to_geo(&coordinates).unsigned_area();
        let perimeter: f64 = coordinates
            .iter()
            .circular_tuple_windows()
            .map(|(p, q)| nalgebra::distance(p, q))
            .sum();
        if !(area > DEGENERACY_TOLERANCE * perimeter.powi(2)) {
            return Err(PackError::ZeroAreaPolygon);
        }

        Ok(Self {
            coordinates,
            area,
            perimeter,
        })
    }

    pub fn from_coords(coords: &[[f64; 2]]) -> Result<Self> {
        Self::new(coords.iter().map(|&[x, y]| Point2::new(x, y)).collect())
    }

    pub fn coordinates(&self) -> &[Point2<f64>] {
        &self.coordinates
    }

    /// The boundary as a closed ring, first vertex repeated at the end.
    pub fn bound_coords(&self) -> Vec<Point2<f64>> {
        let mut ring = self.coordinates.clone();
        ring.push(self.coordinates[0]);
        ring
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    pub fn to_geo(&self) -> GeoPolygon<f64> {
        to_geo(&self.coordinates)
    }
}

fn to_geo(coordinates: &[Point2<f64>]) -> GeoPolygon<f64> {
    let exterior: Vec<Coord<f64>> = coordinates
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect();
    GeoPolygon::new(LineString(exterior), vec![])
}

/// Decomposes a polygon into triangles covering it.
pub trait Triangulate {
    fn triangulate(&self, polygon: &Polygon) -> Result<Vec<Triangle>>;
}

/// Ear-clipping triangulation with optional area refinement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Earcut {
    pub max_area: Option<f64>,
}

impl Earcut {
    pub fn with_max_area(max_area: f64) -> Self {
        Self {
            max_area: Some(max_area),
        }
    }

    /// Bisects `triangle` along its longest side until every piece is at
    /// most `max_area`.
    fn refine(triangle: Triangle, max_area: f64, out: &mut Vec<Triangle>) -> Result<()> {
        if triangle.area() <= max_area {
            out.push(triangle);
            return Ok(());
        }
        let [left, right] = triangle.bisect()?;
        Self::refine(left, max_area, out)?;
        Self::refine(right, max_area, out)
    }
}

impl Triangulate for Earcut {
    fn triangulate(&self, polygon: &Polygon) -> Result<Vec<Triangle>> {
        if let Some(max_area) = self.max_area {
            if !(max_area > 0.0) || !max_area.is_finite() {
                return Err(PackError::InvalidParameter {
                    field: "max_area",
                    reason: format!("must be a positive finite area, got {max_area}"),
                });
            }
        }

        let mut triangles = Vec::new();
        for (i, ear) in polygon.to_geo().earcut_triangles().into_iter().enumerate() {
            let vertices = ear.to_array().map(|c| Point2::new(c.x, c.y));
            let triangle = match Triangle::new(vertices) {
                Ok(triangle) => triangle,
                // ear clipping emits slivers where three boundary vertices are collinear
                Err(PackError::CollinearVertices { area }) => {
                    warn!("skipping sliver triangle {i} (area {area:.3e})");
                    continue;
                }
                Err(err) => return Err(err),
            };
            match self.max_area {
                Some(max_area) => Self::refine(triangle, max_area, &mut triangles)?,
                None => triangles.push(triangle),
            }
        }

        debug!(
            "triangulated polygon of area {:.4} into {} triangles",
            polygon.area(),
            triangles.len()
        );
        Ok(triangles)
    }
}
