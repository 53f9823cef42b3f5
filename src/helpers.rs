//! Interactive visualization of packings.
//!
//! This module renders triangles and packed circles in a macroquad window
//! to inspect the fractal pattern during development.
//!
//! The helper system provides:
//! - A [`Renderer`] backed by macroquad's immediate-mode drawing
//! - Fitting world coordinates to the window, y axis pointing up
//! - A blocking viewer for a solved [`CircPacking`]

use macroquad::prelude::{
    clear_background, draw_circle_lines, draw_line, is_key_pressed, next_frame, screen_height,
    screen_width, Color, KeyCode, BLACK, DARKGRAY, LIGHTGRAY, WHITE,
};
use macroquad::Window;
use nalgebra::Point2;

use crate::circle::Circle;
use crate::packing::CircPacking;
use crate::render::{bounds, render, Renderer};

const MARGIN: f32 = 20.0; // pixels kept free around the drawing

/// Renderer drawing into the current macroquad frame.
///
/// **Context**: Packings live in world units that rarely match the window,
/// and world y grows upward while screen y grows downward.
///
/// **How it Works**: Stores a uniform scale and the world point mapped to
/// the lower-left margin, then converts each coordinate on the fly.
pub struct MacroquadRenderer {
    scale: f32,
    origin: Point2<f64>,
    height: f32,
    pub boundary_color: Color,
    pub circle_color: Color,
    pub thickness: f32,
}

impl MacroquadRenderer {
    /// Fits the view to the bounds of `vertices` and `circles`.
    pub fn fit(vertices: &[Point2<f64>], circles: &[Circle], width: f32, height: f32) -> Self {
        let (min, max) = bounds(vertices, circles)
            .unwrap_or((Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)));
        let span_x = (max.x - min.x).max(f64::EPSILON) as f32;
        let span_y = (max.y - min.y).max(f64::EPSILON) as f32;
        let scale = ((width - 2.0 * MARGIN) / span_x).min((height - 2.0 * MARGIN) / span_y);

        Self {
            scale,
            origin: min,
            height,
            boundary_color: BLACK,
            circle_color: DARKGRAY,
            thickness: 1.0,
        }
    }

    fn to_screen(&self, point: &Point2<f64>) -> (f32, f32) {
        let x = (point.x - self.origin.x) as f32 * self.scale + MARGIN;
        let y = self.height - ((point.y - self.origin.y) as f32 * self.scale + MARGIN);
        (x, y)
    }
}

impl Renderer for MacroquadRenderer {
    fn draw_boundary(&mut self, vertices: &[Point2<f64>]) {
        let screen_points: Vec<(f32, f32)> = vertices.iter().map(|v| self.to_screen(v)).collect();
        for i in 0..screen_points.len() {
            let (x1, y1) = screen_points[i];
            let (x2, y2) = screen_points[(i + 1) % screen_points.len()]; // Wrap around
            draw_line(x1, y1, x2, y2, 2.0 * self.thickness, self.boundary_color);
        }
    }

    fn draw_circle(&mut self, circle: &Circle) {
        let (x, y) = self.to_screen(&circle.center());
        draw_circle_lines(
            x,
            y,
            circle.radius() as f32 * self.scale,
            self.thickness,
            self.circle_color,
        );
    }
}

/// Opens a window showing every triangle of a solved packing with its
/// circles. Blocks until the window is closed or `Escape`/`Q` is pressed.
pub fn show(title: &str, packing: &CircPacking) {
    let outline = packing.polygon.coordinates().to_vec();
    let triangles: Vec<(Vec<Point2<f64>>, Vec<Circle>)> = packing
        .triangles
        .iter()
        .map(|t| (t.vertices().to_vec(), t.circles().unwrap_or_default().to_vec()))
        .collect();
    let circles = packing.circles.clone();

    Window::new(title, async move {
        loop {
            clear_background(WHITE);
            let mut renderer =
                MacroquadRenderer::fit(&outline, &circles, screen_width(), screen_height());

            renderer.boundary_color = LIGHTGRAY;
            renderer.circle_color = DARKGRAY;
            for (vertices, circles) in &triangles {
                render(&mut renderer, vertices, circles);
            }
            renderer.boundary_color = BLACK;
            renderer.draw_boundary(&outline);

            if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                break;
            }
            next_frame().await;
        }
    });
}
