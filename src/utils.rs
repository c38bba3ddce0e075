use crate::{
    field::ScalarField,
    tables::CORNER_OFFSETS,
    types::{Point, Value, Vector},
};

/// Returns the 8 world-space corner positions of the voxel whose minimum corner is `origin`.
///
/// Corners follow the ordering of [`CORNER_OFFSETS`]:
/// ```text
///     7----6          Y
///    /|   /|          |
///   3----2 |          *-- X
///   | 4--|-5         /
///   |/   |/         Z
///   0----1
/// ```
#[inline]
pub fn get_corner_positions(origin: &Point, side: Value) -> [Point; 8] {
    CORNER_OFFSETS.map(|[x, y, z]| origin + Vector::new(x, y, z) * side)
}

/// Computes the marching cubes case number for a voxel.
///
/// A bit is set when the corner's value is **strictly positive** (i.e. "inside" the surface):
///
/// ```text
/// corner index:  7  6  5  4  3  2  1  0
/// state bits:   [_][_][_][_][_][_][_][_]
///                                      ^-- corner 0 inside?
/// ```
#[inline]
pub fn get_state(eval_corners: &[Value; 8]) -> usize {
    eval_corners
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > 0.)
        .fold(0, |state, (i, _)| state | 1 << i)
}

/// Estimates the outward surface normal at `point` with central differences.
///
/// ```text
/// n = normalize( F(p - εx) - F(p + εx),
///                F(p - εy) - F(p + εy),
///                F(p - εz) - F(p + εz) )
/// ```
///
/// Points down the field gradient, which is away from the balls. Returns the
/// zero vector where the field is flat.
pub fn estimate_normal<F: ScalarField + ?Sized>(field: &F, point: &Point, eps: Value) -> Vector {
    let diff = |axis: Vector| field.evaluate(&(point - axis)) - field.evaluate(&(point + axis));
    let gradient = Vector::new(
        diff(Vector::x() * eps),
        diff(Vector::y() * eps),
        diff(Vector::z() * eps),
    );
    gradient
        .try_normalize(Value::MIN_POSITIVE)
        .unwrap_or_else(Vector::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bounds::BoundingVolume, field::MetaballField};
    use approx::assert_relative_eq;

    struct Flat;

    impl ScalarField for Flat {
        fn evaluate(&self, _point: &Point) -> Value {
            -1.
        }

        fn bounding_volume(&self) -> Option<&BoundingVolume> {
            None
        }
    }

    #[test]
    fn state_sets_bits_for_positive_corners() {
        assert_eq!(get_state(&[-1.; 8]), 0);
        assert_eq!(get_state(&[1.; 8]), 255);
        assert_eq!(get_state(&[1., -1., -1., -1., -1., -1., -1., 2.]), 0b1000_0001);
        // Zero is outside.
        assert_eq!(get_state(&[0., 0., 0., 0., 0., 0., 0., 0.5]), 0b1000_0000);
    }

    #[test]
    fn corner_positions_scale_offsets() {
        let corners = get_corner_positions(&Point::new(1., 2., 3.), 0.5);
        assert_eq!(corners[0], Point::new(1., 2., 3.));
        assert_eq!(corners[2], Point::new(1.5, 2.5, 3.));
        assert_eq!(corners[6], Point::new(1.5, 2.5, 3.5));
        assert_eq!(corners[7], Point::new(1., 2.5, 3.5));
    }

    #[test]
    fn normal_points_away_from_ball() {
        let mut field = MetaballField::new(1.);
        field.refresh(&[Point::origin()]).unwrap();

        let p = Point::new(0., 1., 0.);
        assert_relative_eq!(estimate_normal(&field, &p, 0.001), Vector::y(), epsilon = 1e-3);

        let q = Point::new(-0.6, 0., 0.8);
        let n = estimate_normal(&field, &q, 0.001);
        assert_relative_eq!(n.norm(), 1., epsilon = 1e-5);
        assert!(n.dot(&q.coords.normalize()) > 0.999);
    }

    #[test]
    fn flat_field_gives_zero_normal() {
        assert_eq!(estimate_normal(&Flat, &Point::origin(), 0.001), Vector::zeros());
    }
}
