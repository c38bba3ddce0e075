use tracing::debug;

use crate::{
    error::{MetaballError, Result},
    field::ScalarField,
    interp::zero_crossing,
    mesh::SurfaceMesh,
    tables::{CORNER_POINT_INDICES, EDGE_TABLE, triangles},
    types::{Point, Value, Vector},
    utils::{estimate_normal, get_corner_positions, get_state},
};

/// Number of voxels along each axis of the scanned grid.
pub const DEFAULT_RESOLUTION: usize = 30;

/// Step used for the central differences behind vertex normals.
pub const DEFAULT_NORMAL_EPSILON: Value = 0.001;

/// Extracts the zero level set of a [`ScalarField`] into a [`SurfaceMesh`].
///
/// The grid is a cube of `resolution³` voxels anchored at the minimum corner of the
/// field's bounding volume. Its edge length is the bounding volume's largest
/// dimension, so the grid may overhang the box along the shorter axes.
///
/// The output buffers are owned by the extractor and rebuilt in place on every
/// call to [`extract_surface`](SurfaceExtractor::extract_surface).
#[derive(Debug, Clone)]
pub struct SurfaceExtractor {
    /// Number of voxels along each axis.
    pub resolution: usize,
    /// Finite-difference step for normal estimation.
    pub normal_epsilon: Value,
    mesh: SurfaceMesh,
}

impl Default for SurfaceExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

impl SurfaceExtractor {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            normal_epsilon: DEFAULT_NORMAL_EPSILON,
            mesh: SurfaceMesh::new_empty(),
        }
    }

    pub fn with_normal_epsilon(mut self, normal_epsilon: Value) -> Self {
        self.normal_epsilon = normal_epsilon;
        self
    }

    /// The buffers produced by the last extraction.
    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    /// Edge length of one voxel for the given field, or `None` if the field has no bounds yet.
    pub fn cell_side<F: ScalarField + ?Sized>(&self, field: &F) -> Option<Value> {
        let bounds = field.bounding_volume()?;
        Some(bounds.largest_dimension() / self.resolution as Value)
    }

    /// Rebuilds the mesh from `field`.
    ///
    /// ```text
    /// side = max(bounds.size) / resolution
    /// for i, j, k in 0..resolution:
    ///     march(bounds.min + (i, j, k) · side)
    /// ```
    ///
    /// The buffers are cleared first, so on error they are left empty.
    pub fn extract_surface<F: ScalarField + ?Sized>(&mut self, field: &F) -> Result<&SurfaceMesh> {
        self.mesh.clear();

        if self.resolution == 0 {
            return Err(MetaballError::ZeroResolution);
        }
        let bounds = *field.bounding_volume().ok_or(MetaballError::NotRefreshed)?;
        let side = bounds.largest_dimension() / self.resolution as Value;

        for i in 0..self.resolution {
            for j in 0..self.resolution {
                for k in 0..self.resolution {
                    let origin = bounds.min + Vector::new(i as Value, j as Value, k as Value) * side;
                    self.march(field, &origin, side);
                }
            }
        }

        debug!(
            "extracted {} triangles at resolution {} (side {side})",
            self.mesh.triangle_count(),
            self.resolution
        );
        Ok(&self.mesh)
    }

    /// Triangulates the voxel at `origin` and appends its triangles to the mesh.
    ///
    /// ```text
    /// Per voxel:
    /// 1. get_corner_positions  →  8 world-space points
    /// 2. field.evaluate (×8)   →  8 scalar values
    /// 3. get_state             →  256-entry case number
    /// 4. EDGE_TABLE[state]     →  skip voxels the surface doesn't cross
    /// 5. triangles(state)      →  edge triples from TRI_TABLE
    /// 6. zero_crossing         →  one fresh vertex per triangle corner
    /// 7. estimate_normal       →  one normal per vertex
    /// ```
    ///
    /// `TRI_TABLE` lists corners clockwise seen from outside; they are emitted in
    /// reverse so front faces are counter-clockwise, as Bevy expects.
    fn march<F: ScalarField + ?Sized>(&mut self, field: &F, origin: &Point, side: Value) {
        let corner_positions = get_corner_positions(origin, side);
        let eval_corners = corner_positions.map(|p| field.evaluate(&p));
        let state = get_state(&eval_corners);
        if EDGE_TABLE[state] == 0 {
            return;
        }

        for tri in triangles(state) {
            for edge in tri.into_iter().rev() {
                let [a, b] = CORNER_POINT_INDICES[edge];
                let vertex = zero_crossing(
                    &corner_positions[a],
                    &corner_positions[b],
                    eval_corners[a],
                    eval_corners[b],
                );
                let normal = estimate_normal(field, &vertex, self.normal_epsilon);
                self.mesh.push_vertex(&vertex, &normal);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bounds::BoundingVolume, field::MetaballField};

    /// Half-space `x < plane` is inside.
    struct Plane {
        plane: Value,
        bounds: BoundingVolume,
    }

    impl ScalarField for Plane {
        fn evaluate(&self, point: &Point) -> Value {
            self.plane - point.x
        }

        fn bounding_volume(&self) -> Option<&BoundingVolume> {
            Some(&self.bounds)
        }
    }

    fn unit_box() -> BoundingVolume {
        let mut bounds = BoundingVolume::empty();
        bounds.encapsulate(Point::new(0., 0., 0.));
        bounds.encapsulate(Point::new(1., 1., 1.));
        bounds
    }

    #[test]
    fn unrefreshed_field_is_rejected() {
        let mut extractor = SurfaceExtractor::default();
        let field = MetaballField::new(1.);
        assert_eq!(extractor.extract_surface(&field).err(), Some(MetaballError::NotRefreshed));
        assert!(extractor.cell_side(&field).is_none());
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let mut extractor = SurfaceExtractor::new(0);
        let plane = Plane { plane: 0.5, bounds: unit_box() };
        assert_eq!(extractor.extract_surface(&plane).err(), Some(MetaballError::ZeroResolution));
        assert!(extractor.mesh().is_empty());
    }

    #[test]
    fn plane_is_extracted_at_crossing() {
        let mut extractor = SurfaceExtractor::new(4);
        let plane = Plane { plane: 0.6, bounds: unit_box() };
        let mesh = extractor.extract_surface(&plane).unwrap();

        // One slab of 4×4 voxels, two triangles each.
        assert_eq!(mesh.triangle_count(), 32);
        for (v, n) in mesh.vertices.iter().zip(&mesh.normals) {
            assert!((v[0] - 0.6).abs() < 1e-5, "vertex {v:?} off the plane");
            assert!((n[0] - 1.).abs() < 1e-3, "normal {n:?} not along +X");
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let mut field = MetaballField::new(1.);
        field.refresh(&[Point::origin()]).unwrap();
        let mut extractor = SurfaceExtractor::new(30);
        let mesh = extractor.extract_surface(&field).unwrap();
        assert!(mesh.triangle_count() > 0);

        for tri in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.tri_coords(tri);
            let face = (b - a).cross(&(c - a));
            if face.norm() < 1e-9 {
                continue;
            }
            let [nx, ny, nz] = mesh.normals[tri * 3];
            assert!(
                face.dot(&Vector::new(nx, ny, nz)) > 0.,
                "triangle {tri} faces inward"
            );
            assert!(face.dot(&a.coords) > 0., "triangle {tri} faces the centre");
        }
    }

    #[test]
    fn plane_faces_point_out_of_the_inside() {
        let mut extractor = SurfaceExtractor::new(4);
        let plane = Plane { plane: 0.6, bounds: unit_box() };
        let mesh = extractor.extract_surface(&plane).unwrap();
        for tri in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.tri_coords(tri);
            assert!((b - a).cross(&(c - a)).x > 0.);
        }
    }

    #[test]
    fn field_without_crossings_gives_empty_mesh() {
        let mut extractor = SurfaceExtractor::new(3);
        let plane = Plane { plane: 5., bounds: unit_box() };
        assert!(extractor.extract_surface(&plane).unwrap().is_empty());
    }

    #[test]
    fn buffers_are_rebuilt_each_call() {
        let mut field = MetaballField::new(1.);
        field.refresh(&[Point::origin()]).unwrap();
        let mut extractor = SurfaceExtractor::new(10);
        let first = extractor.extract_surface(&field).unwrap().clone();

        field.refresh(&[Point::new(100., 100., 100.)]).unwrap();
        let moved = extractor.extract_surface(&field).unwrap();
        assert!(!first.is_empty() && !moved.is_empty());
        assert!(moved.vertices.iter().all(|v| v[0] > 90.));
    }
}
