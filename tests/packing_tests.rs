use circpack::{
    circle::Circle,
    error::{ErrorKind, PackError},
    packing::CircPacking,
    polygon::{Earcut, Polygon},
    settings,
    slope::AnthropicSlope,
    stopping::{PackingOptions, StopRule},
    triangle::Triangle,
};
use itertools::Itertools;
use nalgebra::Point2;
use rand::{rngs::StdRng, Rng, SeedableRng};

// Tolerance for containment and overlap checks
const TOL: f64 = 1e-9;

fn square() -> Polygon {
    Polygon::from_coords(&[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]]).unwrap()
}

fn hexagon() -> Polygon {
    let coords: Vec<[f64; 2]> = (0..6)
        .map(|i| {
            let angle = std::f64::consts::FRAC_PI_3 * i as f64;
            [2.0 * angle.cos(), 2.0 * angle.sin()]
        })
        .collect();
    Polygon::from_coords(&coords).unwrap()
}

/// Signed distances from a point to the three sides, positive inside.
fn side_distances(vertices: &[Point2<f64>; 3], point: Point2<f64>) -> [f64; 3] {
    let orientation = (vertices[1] - vertices[0])
        .perp(&(vertices[2] - vertices[0]))
        .signum();
    [0, 1, 2].map(|i| {
        let (p, q) = (vertices[i], vertices[(i + 1) % 3]);
        orientation * (q - p).perp(&(point - p)) / (q - p).norm()
    })
}

fn assert_inside(triangle: &Triangle, circles: &[Circle]) {
    for circle in circles {
        for d in side_distances(triangle.vertices(), circle.center()) {
            assert!(
                d >= circle.radius() - TOL,
                "circle {:?} crosses a side of {:?}",
                circle,
                triangle.vertices()
            );
        }
    }
}

fn assert_disjoint(circles: &[Circle]) {
    for (a, b) in circles.iter().tuple_combinations() {
        let distance = nalgebra::distance(&a.center(), &b.center());
        let radii_sum = a.radius() + b.radius();
        assert!(
            distance >= radii_sum * (1.0 - TOL),
            "circles {:?} and {:?} overlap",
            a,
            b
        );
    }
}

#[test]
fn square_at_depth_one() {
    let mut packing = CircPacking::new(square(), PackingOptions::depth(1), None).unwrap();
    assert_eq!(packing.triangles.len(), 2);

    let circles = packing.solve().unwrap();
    assert_eq!(circles.len(), 2 * 28);
    assert_eq!(packing.depth(), Some(1));
    assert_eq!(packing.length(), None);
}

#[test]
fn hexagon_circles_stay_inside_and_apart() {
    let mut packing = CircPacking::new(hexagon(), PackingOptions::depth(2), None).unwrap();
    packing.solve().unwrap();
    assert_eq!(packing.triangles.len(), 4);
    assert_eq!(packing.circles.len(), 4 * 55);

    for triangle in &packing.triangles {
        assert_inside(triangle, triangle.circles().unwrap());
    }
    assert_disjoint(&packing.circles);
}

#[test]
fn circles_are_aggregated_in_triangle_order() {
    let mut packing = CircPacking::new(square(), PackingOptions::depth(2), None).unwrap();
    packing.solve().unwrap();

    let concatenated: Vec<Circle> = packing
        .triangles
        .iter()
        .flat_map(|t| t.circles().unwrap().iter().copied())
        .collect();
    assert_eq!(packing.circles, concatenated);
    for triangle in &packing.triangles {
        assert_eq!(triangle.circles().unwrap()[0], triangle.incircle());
    }
}

#[test]
fn max_area_refines_triangles() {
    let mut packing = CircPacking::new(square(), PackingOptions::depth(1), Some(5.0)).unwrap();
    assert_eq!(packing.triangles.len(), 4);

    let total: f64 = packing.triangles.iter().map(Triangle::area).sum();
    assert!((total - 16.0).abs() < 1e-9);
    assert!(packing.triangles.iter().all(|t| t.area() <= 5.0));

    packing.solve().unwrap();
    assert_eq!(packing.circles.len(), 4 * 28);
}

#[test]
fn legacy_length_spelling_packs_the_same() {
    let options = PackingOptions::length(0.2);
    let legacy = PackingOptions {
        lenght: Some(0.2),
        ..PackingOptions::default()
    };

    let mut modern = CircPacking::new(hexagon(), options, None).unwrap();
    let mut old = CircPacking::new(hexagon(), legacy, None).unwrap();
    modern.solve().unwrap();
    old.solve().unwrap();

    assert_eq!(modern.circles, old.circles);
    assert_eq!(old.lenght(), Some(0.2));
    assert_eq!(old.rule, StopRule::Length(0.2));
}

#[test]
fn finer_length_packs_more_circles() {
    let mut coarse = CircPacking::new(square(), PackingOptions::length(0.5), None).unwrap();
    let mut fine = CircPacking::new(square(), PackingOptions::length(0.1), None).unwrap();
    coarse.solve().unwrap();
    fine.solve().unwrap();

    assert!(fine.circles.len() > coarse.circles.len());
    assert!(fine.coverage() > coarse.coverage());
    assert!(fine.coverage() < 1.0);
}

#[test]
fn conflicting_options_are_rejected() {
    let ambiguous = PackingOptions {
        depth: Some(2),
        length: Some(0.5),
        lenght: None,
    };
    let err = CircPacking::new(square(), ambiguous, None).unwrap_err();
    assert!(matches!(err, PackError::AmbiguousStopRule { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let conflicting = PackingOptions {
        depth: None,
        length: Some(0.5),
        lenght: Some(0.25),
    };
    let err = CircPacking::new(square(), conflicting, None).unwrap_err();
    assert!(matches!(err, PackError::ConflictingLength { .. }));

    let err = CircPacking::new(square(), PackingOptions::default(), None).unwrap_err();
    assert!(matches!(err, PackError::MissingStopRule));

    let err = CircPacking::with_triangulator(
        square(),
        PackingOptions::depth(1),
        None,
        &Earcut::with_max_area(-1.0),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn solving_is_deterministic() {
    let mut first = CircPacking::new(hexagon(), PackingOptions::depth(3), None).unwrap();
    let mut second = CircPacking::new(hexagon(), PackingOptions::depth(3), None).unwrap();
    first.solve().unwrap();
    second.solve().unwrap();
    assert_eq!(first.circles, second.circles);

    let again = first.solve().unwrap().to_vec();
    assert_eq!(again, second.circles);
}

#[test]
fn slope_section_packs() {
    let slope = AnthropicSlope::new(12.0, [1.0, 1.5], 10.0, 10.0, None).unwrap();
    let mut packing = CircPacking::new(slope.polygon().unwrap(), PackingOptions::depth(2), None).unwrap();
    packing.solve().unwrap();

    assert!(!packing.triangles.is_empty());
    assert_eq!(packing.circles.len(), packing.triangles.len() * 55);
    for triangle in &packing.triangles {
        assert_inside(triangle, triangle.circles().unwrap());
    }
    assert!(packing.coverage() > 0.0 && packing.coverage() < 1.0);
}

#[test]
fn summary_describes_the_packing() {
    let mut packing = CircPacking::new(hexagon(), PackingOptions::depth(2), None).unwrap();
    packing.solve().unwrap();
    let summary = packing.summary(8).unwrap();

    assert_eq!(summary.num_circles, packing.circles.len());
    assert_eq!(summary.num_triangles, 4);
    assert_eq!(summary.histogram.counts.len(), 8);
    assert_eq!(summary.histogram.counts.iter().sum::<usize>(), summary.num_circles);
    assert!(summary.min_diameter <= summary.mean_diameter);
    assert!(summary.mean_diameter <= summary.max_diameter);
    assert!((summary.coverage - packing.coverage()).abs() < 1e-12);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["rule"]["depth"], 2);
    assert_eq!(json["num_circles"], 220);
}

#[test]
fn summary_needs_circles() {
    let packing = CircPacking::new(square(), PackingOptions::depth(1), None).unwrap();
    assert!(packing.summary(10).is_err());
}

#[test]
fn random_triangles_stay_packed() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut packed = 0;
    while packed < 20 {
        let coords: Vec<[f64; 2]> = (0..3)
            .map(|_| [rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0)])
            .collect();
        let Ok(mut triangle) = Triangle::from_coords(&coords) else {
            continue;
        };
        if triangle.area() < 1.0 {
            continue;
        }

        let circles = triangle.pack_circles(&StopRule::Depth(2)).unwrap();
        assert_eq!(circles.len(), 55);
        assert_inside(&triangle, &circles);
        assert_disjoint(&circles);
        packed += 1;
    }
}

#[test]
fn default_configuration_packs() {
    let settings = settings::load_default_config().unwrap();
    let polygon = settings.boundary.polygon().unwrap();
    let mut packing = CircPacking::new(polygon, settings.packing.clone(), settings.max_area).unwrap();
    packing.solve().unwrap();
    assert!(packing.summary(settings.bins).is_ok());
}
