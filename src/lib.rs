//! Packing of mutually tangent circles inside closed 2-D regions.
//!
//! Every triangle is filled with a deterministic fractal pattern: its
//! incircle, then one circle per corner and the circles tangent to those,
//! found with Descartes' circle theorem, level after level until a depth or
//! a smallest diameter is reached. Polygons are triangulated first and each
//! triangle is packed independently.
//!
//! # Key Components
//!
//! - [`circle::Circle`]: circle geometry and the Descartes construction
//! - [`triangle::Triangle`]: triangle geometry and the fractal packing loop
//! - [`polygon::Polygon`] and [`packing::CircPacking`]: polygon packing
//! - [`slope`]: geotechnical slope cross-sections
//! - [`settings`]: configuration file, environment and command line

pub mod circle;
pub mod error;
#[cfg(feature = "macroquad")]
pub mod helpers;
pub mod output;
pub mod packing;
pub mod polygon;
pub mod render;
pub mod settings;
pub mod slope;
pub mod stats;
pub mod stopping;
pub mod triangle;
