use circpack::{
    circle::Circle,
    error::PackError,
    packing::CircPacking,
    polygon::Polygon,
    stopping::PackingOptions,
    triangle::Triangle,
};
use nalgebra::Point2;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py(err: PackError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// A circle in the plane.
#[pyclass(name = "Circle", frozen)]
#[derive(Debug, Clone)]
pub struct PyCircle(Circle);

#[pymethods]
impl PyCircle {
    #[new]
    fn py_new(center: [f64; 2], radius: f64) -> PyResult<Self> {
        Circle::new(Point2::from(center), radius).map(PyCircle).map_err(to_py)
    }

    #[getter]
    fn center(&self) -> (f64, f64) {
        let center = self.0.center();
        (center.x, center.y)
    }

    #[getter]
    fn radius(&self) -> f64 {
        self.0.radius()
    }

    #[getter]
    fn curvature(&self) -> f64 {
        self.0.curvature()
    }

    #[getter]
    fn diameter(&self) -> f64 {
        self.0.diameter()
    }

    #[getter]
    fn area(&self) -> f64 {
        self.0.area()
    }

    #[getter]
    fn perimeter(&self) -> f64 {
        self.0.perimeter()
    }

    /// The two circles tangent to this circle and `circle1`. With `circle2`
    /// given, the first one is also tangent to it; otherwise both touch the
    /// common tangent line of the pair.
    #[pyo3(name = "descartesTheorem", signature = (circle1, circle2 = None))]
    fn descartes_theorem(
        &self,
        circle1: &PyCircle,
        circle2: Option<PyRef<'_, PyCircle>>,
    ) -> PyResult<(PyCircle, PyCircle)> {
        let third = circle2.as_ref().map(|c| &c.0);
        let (first, second) = self.0.tangent_circles(&circle1.0, third).map_err(to_py)?;
        Ok((PyCircle(first), PyCircle(second)))
    }

    fn __repr__(&self) -> String {
        let center = self.0.center();
        format!(
            "Circle(center=({}, {}), radius={})",
            center.x,
            center.y,
            self.0.radius()
        )
    }
}

/// A triangle that can be packed with tangent circles.
#[pyclass(name = "Triangle")]
#[derive(Debug, Clone)]
pub struct PyTriangle(Triangle);

#[pymethods]
impl PyTriangle {
    #[new]
    fn py_new(coords: Vec<[f64; 2]>) -> PyResult<Self> {
        Triangle::from_coords(&coords).map(PyTriangle).map_err(to_py)
    }

    #[getter]
    fn vertices(&self) -> Vec<(f64, f64)> {
        self.0.vertices().iter().map(|v| (v.x, v.y)).collect()
    }

    #[getter]
    fn area(&self) -> f64 {
        self.0.area()
    }

    #[getter]
    fn perimeter(&self) -> f64 {
        self.0.perimeter()
    }

    #[getter]
    fn incircle(&self) -> PyCircle {
        PyCircle(self.0.incircle())
    }

    /// Packs the triangle. Exactly one of `depth` and `length` (or its
    /// legacy spelling `lenght`) must be given.
    ///
    /// Both bounds emit nine circles per level. The older pure-Python
    /// package emitted three per step under `lenght`, so
    /// `circInTriangle(lenght=0.5)` on the triangle `(2, 1.5), (4.5, 4),
    /// (6, 2)` now returns 19 circles instead of 7.
    #[pyo3(name = "circInTriangle", signature = (depth = None, lenght = None, *, length = None))]
    fn circ_in_triangle(
        &mut self,
        depth: Option<i64>,
        lenght: Option<f64>,
        length: Option<f64>,
    ) -> PyResult<Vec<PyCircle>> {
        let options = PackingOptions {
            depth,
            length,
            lenght,
        };
        let rule = options.resolve().map_err(to_py)?;
        let circles = self.0.pack_circles(&rule).map_err(to_py)?;
        Ok(circles.into_iter().map(PyCircle).collect())
    }
}

/// Circle packing of a polygon.
#[pyclass(name = "CircPacking")]
#[derive(Debug, Clone)]
pub struct PyCircPacking(CircPacking);

#[pymethods]
impl PyCircPacking {
    #[new]
    #[pyo3(signature = (coordinates, depth = None, length = None, lenght = None, max_area = None))]
    fn py_new(
        coordinates: Vec<[f64; 2]>,
        depth: Option<i64>,
        length: Option<f64>,
        lenght: Option<f64>,
        max_area: Option<f64>,
    ) -> PyResult<Self> {
        let polygon = Polygon::from_coords(&coordinates).map_err(to_py)?;
        let options = PackingOptions {
            depth,
            length,
            lenght,
        };
        CircPacking::new(polygon, options, max_area)
            .map(PyCircPacking)
            .map_err(to_py)
    }

    /// Packs every triangle and returns the circles in triangle order.
    fn solve(&mut self) -> PyResult<Vec<PyCircle>> {
        let circles = self.0.solve().map_err(to_py)?;
        Ok(circles.iter().copied().map(PyCircle).collect())
    }

    #[getter]
    fn circles(&self) -> Vec<PyCircle> {
        self.0.circles.iter().copied().map(PyCircle).collect()
    }

    #[getter]
    fn triangles(&self) -> Vec<PyTriangle> {
        self.0.triangles.iter().cloned().map(PyTriangle).collect()
    }

    #[getter]
    fn depth(&self) -> Option<u32> {
        self.0.depth()
    }

    #[getter]
    fn length(&self) -> Option<f64> {
        self.0.length()
    }

    #[getter]
    fn lenght(&self) -> Option<f64> {
        self.0.lenght()
    }

    fn coverage(&self) -> f64 {
        self.0.coverage()
    }

    /// Bin edges and counts of the circle diameters.
    #[pyo3(signature = (bins = 10))]
    fn histogram(&self, bins: usize) -> PyResult<(Vec<f64>, Vec<usize>)> {
        let histogram = self.0.histogram(bins).map_err(to_py)?;
        Ok((histogram.edges, histogram.counts))
    }
}

/// A Python module implemented in Rust.
#[pymodule]
fn _circpack_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCircle>()?;
    m.add_class::<PyTriangle>()?;
    m.add_class::<PyCircPacking>()?;
    Ok(())
}
