//! Rendering seam between packings and whatever draws them.
//!
//! Geometry code never draws. A [`Renderer`] receives boundary vertices and
//! circles through [`render`]; the window-based implementation lives in
//! [`crate::helpers`] behind the `visualization` feature.

use nalgebra::Point2;

use crate::circle::Circle;


/// A drawing target for packings.
pub trait Renderer {
    /// Draws a closed boundary through `vertices`.
    fn draw_boundary(&mut self, vertices: &[Point2<f64>]);

    fn draw_circle(&mut self, circle: &Circle);
}

/// Draws a boundary followed by its circles in generation order.
pub fn render<R: Renderer + ?Sized>(renderer: &mut R, vertices: &[Point2<f64>], circles: &[Circle]) {
    renderer.draw_boundary(vertices);
    for circle in circles {
        renderer.draw_circle(circle);
    }
}

/// Axis-aligned bounds of a set of vertices and circles, or `None` if both
/// are empty.
pub fn bounds(vertices: &[Point2<f64>], circles: &[Circle]) -> Option<(Point2<f64>, Point2<f64>)> {
    let corners = vertices.iter().map(|v| (*v, *v)).chain(circles.iter().map(|c| {
        let r = c.radius();
        let center = c.center();
        (
            Point2::new(center.x - r, center.y - r),
            Point2::new(center.x + r, center.y + r),
        )
    }));
    corners.reduce(|(min, max), (lo, hi)| (min.inf(&lo), max.sup(&hi)))
}
