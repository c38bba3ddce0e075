use approx::assert_relative_eq;
use bevy_metaballs::{
    MetaballField, ScalarField, SurfaceExtractor,
    mesh::SurfaceMesh,
    types::{Point, Value, Vector},
};

fn extract(balls: &[Point], radius: Value, resolution: usize) -> (MetaballField, SurfaceMesh) {
    let mut field = MetaballField::new(radius);
    field.refresh(balls).unwrap();
    let mut extractor = SurfaceExtractor::new(resolution);
    let mesh = extractor.extract_surface(&field).unwrap().clone();
    (field, mesh)
}

fn point(v: &[f32; 3]) -> Point {
    Point::new(v[0], v[1], v[2])
}

fn nearest_ball(balls: &[Point], p: &Point) -> (usize, Value) {
    balls
        .iter()
        .enumerate()
        .map(|(i, b)| (i, (b - p).norm()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap()
}

#[test]
fn single_ball_approximates_sphere() {
    let (field, mesh) = extract(&[Point::origin()], 1., 30);
    let side = SurfaceExtractor::new(30).cell_side(&field).unwrap();
    let diagonal = side * (3.0 as Value).sqrt();

    assert!(mesh.triangle_count() > 0);
    for v in &mesh.vertices {
        let distance = point(v).coords.norm();
        assert!((distance - 1.).abs() <= diagonal, "vertex {v:?} at distance {distance}");
    }
}

#[test]
fn sphere_normals_point_outward() {
    let (_, mesh) = extract(&[Point::origin()], 1., 30);
    for (v, n) in mesh.vertices.iter().zip(&mesh.normals) {
        let n = Vector::new(n[0], n[1], n[2]);
        assert_relative_eq!(n.norm(), 1., epsilon = 1e-4);
        assert!(n.dot(&point(v).coords.normalize()) > 0.95, "normal {n:?} at {v:?}");
    }
}

#[test]
fn buffers_stay_aligned() {
    let balls = [
        Point::new(-0.7, 0.1, 0.),
        Point::new(0.6, -0.2, 0.3),
        Point::new(0., 0.8, -0.4),
    ];
    let (_, mesh) = extract(&balls, 0.8, 30);

    assert_eq!(mesh.vertices.len(), mesh.normals.len());
    assert_eq!(mesh.vertices.len(), mesh.indices.len());
    assert_eq!(mesh.indices.len() % 3, 0);
    for (i, &index) in mesh.indices.iter().enumerate() {
        assert_eq!(index as usize, i);
        assert!((index as usize) < mesh.vertices.len());
    }
}

#[test]
fn extraction_is_deterministic() {
    let mut field = MetaballField::new(1.);
    field
        .refresh(&[
            Point::new(0.3, 0., 0.),
            Point::new(-0.4, 0.2, 0.),
            Point::new(0., -0.5, 0.6),
        ])
        .unwrap();

    let mut extractor = SurfaceExtractor::new(30);
    let first = extractor.extract_surface(&field).unwrap().clone();
    let second = extractor.extract_surface(&field).unwrap();
    assert_eq!(&first, second);

    let fresh = SurfaceExtractor::new(30).extract_surface(&field).unwrap().clone();
    assert_eq!(first, fresh);
}

#[test]
fn distant_balls_form_separate_blobs() {
    let balls = [
        Point::new(-10., 0., 0.),
        Point::new(10., 0., 0.),
        Point::new(0., 10., 0.),
    ];
    let (field, mesh) = extract(&balls, 1., 30);
    let side = SurfaceExtractor::new(30).cell_side(&field).unwrap();
    let reach = 1. + side * (3.0 as Value).sqrt();

    let mut per_ball = [0usize; 3];
    for v in &mesh.vertices {
        let (nearest, distance) = nearest_ball(&balls, &point(v));
        assert!(distance <= reach, "stray vertex {v:?}");
        per_ball[nearest] += 1;
    }
    assert!(per_ball.iter().all(|&count| count > 0), "{per_ball:?}");
}

#[test]
fn close_balls_merge_into_one_blob() {
    let balls = [
        Point::new(-0.5, 0., 0.),
        Point::new(0.5, 0., 0.),
        Point::new(0., 0.5, 0.),
    ];
    let (field, mesh) = extract(&balls, 1., 30);
    assert!(mesh.triangle_count() > 0);

    // The interior is connected: every segment between two balls stays inside.
    for a in &balls {
        for b in &balls {
            for step in 0..=10 {
                let t = step as Value / 10.;
                assert!(field.evaluate(&(a + (b - a) * t)) > 0.);
            }
        }
    }

    // Every vertex lies in the scanned grid, which starts at the bounding volume's
    // minimum corner and spans its largest dimension along every axis.
    let bounds = field.bounding_volume().unwrap();
    let extent = bounds.largest_dimension();
    for v in &mesh.vertices {
        let offset = point(v) - bounds.min;
        assert!(offset.iter().all(|&d| (-1e-4..=extent + 1e-4).contains(&d)), "vertex {v:?}");
    }
}

#[test]
fn balls_past_the_third_are_enclosed() {
    let balls = [
        Point::new(0., 0., 0.),
        Point::new(0.5, 0., 0.),
        Point::new(0., 0.5, 0.),
        Point::new(8., 0., 0.),
    ];
    let (_, mesh) = extract(&balls, 1., 30);

    let near_fourth = mesh
        .vertices
        .iter()
        .filter(|v| nearest_ball(&balls, &point(v)).0 == 3)
        .count();
    assert!(near_fourth > 0);
}
