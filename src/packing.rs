//! Packing an arbitrary polygon.
//!
//! The driver decomposes a polygon into triangles, packs every triangle
//! independently and concatenates the results in triangle order. Triangles
//! share no state, so the per-triangle work fans out over a rayon thread pool
//! and the aggregated sequence is still deterministic.
//!
//! # Key Components
//!
//! - [`CircPacking`]: polygon, stopping rule, triangles and packed circles
//! - [`CircPacking::solve`]: the parallel packing pass
//! - [`CircPacking::summary`]: size statistics for reporting

use std::time::Instant;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use ndarray::Array1;
use rayon::prelude::*;

use crate::{
    circle::Circle,
    error::{PackError, Result},
    polygon::{Earcut, Polygon, Triangulate},
    stats::{DiameterHistogram, PackingSummary},
    stopping::{PackingOptions, StopRule},
    triangle::Triangle,
};

/// Circle packing of a polygon.
///
/// **Context**: Irregular domains such as slope cross-sections are packed by
/// splitting them into triangles, each of which is filled with the fractal
/// tangent-circle pattern.
///
/// **How it Works**: The stopping options are resolved once on construction,
/// the polygon is triangulated, and [`CircPacking::solve`] packs every
/// triangle in parallel. Each triangle keeps its own circles; the
/// concatenation is stored in `circles`.
#[derive(Debug, Clone)]
pub struct CircPacking {
    pub polygon: Polygon,
    pub options: PackingOptions,
    pub rule: StopRule,
    pub max_area: Option<f64>,
    pub triangles: Vec<Triangle>,
    pub circles: Vec<Circle>,
}

impl CircPacking {
    /// Builds a packing with the default ear-clipping triangulation.
    pub fn new(polygon: Polygon, options: PackingOptions, max_area: Option<f64>) -> Result<Self> {
        Self::with_triangulator(polygon, options, max_area, &Earcut { max_area })
    }

    pub fn with_triangulator(
        polygon: Polygon,
        options: PackingOptions,
        max_area: Option<f64>,
        triangulator: &impl Triangulate,
    ) -> Result<Self> {
        let rule = options.resolve()?;
        let triangles = triangulator.triangulate(&polygon)?;
        info!(
            "polygon with {} vertices split into {} triangles",
            polygon.coordinates().len(),
            triangles.len()
        );

        Ok(Self {
            polygon,
            options,
            rule,
            max_area,
            triangles,
            circles: Vec::new(),
        })
    }

    /// The canonical length bound, if the packing is length-bounded.
    pub fn length(&self) -> Option<f64> {
        match self.rule {
            StopRule::Length(length) => Some(length),
            StopRule::Depth(_) => None,
        }
    }

    /// Legacy spelling of [`CircPacking::length`].
    pub fn lenght(&self) -> Option<f64> {
        self.length()
    }

    pub fn depth(&self) -> Option<u32> {
        match self.rule {
            StopRule::Depth(depth) => Some(depth),
            StopRule::Length(_) => None,
        }
    }

    /// Packs every triangle and aggregates the circles in triangle order.
    ///
    /// The first failing triangle aborts the pass; `circles` then keeps its
    /// previous value.
    pub fn solve(&mut self) -> Result<&[Circle]> {
        let start = Instant::now();

        let pb = ProgressBar::new(self.triangles.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▇▆▅▄▃▂▁"),
        );
        pb.set_message("triangles");

        let rule = self.rule;
        let packed = self
            .triangles
            .par_iter_mut()
            .map(|triangle| {
                let circles = triangle.pack_circles(&rule);
                pb.inc(1);
                circles
            })
            .collect::<Result<Vec<Vec<Circle>>>>();
        pb.finish_and_clear();

        self.circles = packed?.into_iter().flatten().collect();

        info!(
            "packed {} circles into {} triangles in {:.2?}",
            self.circles.len(),
            self.triangles.len(),
            start.elapsed()
        );
        Ok(&self.circles)
    }

    pub fn diameters(&self) -> Array1<f64> {
        self.circles.iter().map(Circle::diameter).collect()
    }

    pub fn packed_area(&self) -> f64 {
        self.circles.iter().map(Circle::area).sum()
    }

    /// Packed area over polygon area.
    pub fn coverage(&self) -> f64 {
        self.packed_area() / self.polygon.area()
    }

    pub fn histogram(&self, bins: usize) -> Result<DiameterHistogram> {
        DiameterHistogram::new(&self.diameters(), bins)
    }

    pub fn summary(&self, bins: usize) -> Result<PackingSummary> {
        let diameters = self.diameters();
        let histogram = DiameterHistogram::new(&diameters, bins)?;
        let mean_diameter = diameters
            .mean()
            .ok_or(PackError::NonFinite("mean diameter"))?;

        Ok(PackingSummary {
            generated: Local::now().to_rfc3339(),
            rule: self.rule,
            max_area: self.max_area,
            num_triangles: self.triangles.len(),
            num_circles: self.circles.len(),
            polygon_area: self.polygon.area(),
            packed_area: self.packed_area(),
            coverage: self.coverage(),
            min_diameter: histogram.edges[0],
            max_diameter: histogram.edges[bins],
            mean_diameter,
            std_diameter: diameters.std(0.0),
            histogram,
        })
    }
}
