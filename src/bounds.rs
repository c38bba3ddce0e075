use crate::types::{Point, Value, Vector};

/// Axis-aligned box that the extractor scans.
///
/// Starts out [empty](BoundingVolume::empty) and grows with
/// [`encapsulate`](BoundingVolume::encapsulate).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    pub min: Point,
    pub max: Point,
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingVolume {
    /// An inverted box that contains nothing. The first encapsulated point
    /// collapses it onto that point.
    pub fn empty() -> Self {
        Self {
            min: Point::new(Value::INFINITY, Value::INFINITY, Value::INFINITY),
            max: Point::new(Value::NEG_INFINITY, Value::NEG_INFINITY, Value::NEG_INFINITY),
        }
    }

    /// Returns `true` until at least one point has been encapsulated.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grows the box so that it contains `point`.
    pub fn encapsulate(&mut self, point: Point) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Grows the box so that it contains the cube of half-extent `reach` around `center`.
    ///
    /// ```text
    ///  encapsulate(center + reach)
    ///  encapsulate(center - reach)
    /// ```
    pub fn encapsulate_around(&mut self, center: Point, reach: Value) {
        let reach = Vector::repeat(reach);
        self.encapsulate(center + reach);
        self.encapsulate(center - reach);
    }

    /// Edge lengths along X, Y and Z. Zero for an empty box.
    pub fn size(&self) -> Vector {
        if self.is_empty() {
            return Vector::zeros();
        }
        self.max - self.min
    }

    /// The longest of the three edge lengths.
    pub fn largest_dimension(&self) -> Value {
        self.size().max()
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &Point) -> bool {
        (0..3).all(|i| self.min[i] <= point[i] && point[i] <= self.max[i])
    }
}
