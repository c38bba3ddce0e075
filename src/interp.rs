use crate::types::{Point, Value};

/// Fraction of the way from `v0` to `v1` at which a linear field reaches zero.
///
/// ```text
/// t = -v0 / (v1 - v0)
/// ```
#[inline]
pub fn zero_fraction(v0: Value, v1: Value) -> Value {
    -v0 / (v1 - v0)
}

/// Point at fraction `t` along `p0 → p1`.
#[inline]
pub fn interpolate_points(p0: &Point, p1: &Point, t: Value) -> Point {
    Point::from(p0.coords.lerp(&p1.coords, t))
}

/// Where the field crosses zero on the segment `p0 → p1`, given the field values at both ends.
///
/// The two values must have opposite signs.
#[inline]
pub fn zero_crossing(p0: &Point, p1: &Point, v0: Value, v1: Value) -> Point {
    interpolate_points(p0, p1, zero_fraction(v0, v1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_fraction_is_proportional_to_values() {
        assert_relative_eq!(zero_fraction(-1., 1.), 0.5);
        assert_relative_eq!(zero_fraction(3., -1.), 0.75);
        assert_relative_eq!(zero_fraction(0.1, -0.3), 0.25);
    }

    #[test]
    fn zero_crossing_is_weighted_by_values() {
        let p0 = Point::new(0., 0., 0.);
        let p1 = Point::new(2., 0., 4.);
        assert_relative_eq!(zero_crossing(&p0, &p1, 0.25, -0.75), Point::new(0.5, 0., 1.));
        assert_relative_eq!(zero_crossing(&p0, &p1, -1., 1.), Point::new(1., 0., 2.));
        assert_relative_eq!(interpolate_points(&p0, &p1, 1.), p1);
    }
}
