use tracing::trace;

use crate::{
    bounds::BoundingVolume,
    error::{MetaballError, Result},
    types::{Point, Value},
};

/// Default padding added around every ball's influence region.
pub const DEFAULT_MARGIN: Value = 0.1;

/// A scalar field the [`SurfaceExtractor`](crate::extractor::SurfaceExtractor) can sample.
///
/// Values **strictly above zero** are considered "inside" the surface.
pub trait ScalarField {
    /// Returns the field value at `point`.
    fn evaluate(&self, point: &Point) -> Value;

    /// The box that must be scanned to find the whole surface, or `None`
    /// if the field has not been prepared yet.
    fn bounding_volume(&self) -> Option<&BoundingVolume>;
}

/// Inverse-square potential generated by a set of point sources sharing one radius.
///
/// ```text
/// F(p) = radius² · Σ 1 / |ball_i - p|²  -  1
/// ```
///
/// The zero level set of `F` is the metaball surface. Ball positions are copied
/// in by [`refresh`](MetaballField::refresh) and stay fixed until the next refresh,
/// so a driver that moves the balls never affects an extraction in progress.
#[derive(Debug, Clone)]
pub struct MetaballField {
    /// Radius shared by every ball.
    pub radius: Value,
    /// Extra padding around each ball's `radius` when building the bounding volume.
    pub margin: Value,
    positions: Vec<Point>,
    bounds: Option<BoundingVolume>,
}

impl Default for MetaballField {
    fn default() -> Self {
        Self::new(1.)
    }
}

impl MetaballField {
    pub fn new(radius: Value) -> Self {
        Self {
            radius,
            margin: DEFAULT_MARGIN,
            positions: Vec::new(),
            bounds: None,
        }
    }

    pub fn with_margin(mut self, margin: Value) -> Self {
        self.margin = margin;
        self
    }

    /// Snapshots `sources` and rebuilds the bounding volume around every one of them.
    ///
    /// Each ball contributes the cube `position ± (radius + margin)`. On error the
    /// previous snapshot is discarded, so a stale surface is never extracted.
    pub fn refresh(&mut self, sources: &[Point]) -> Result<()> {
        self.positions.clear();
        self.bounds = None;

        if sources.is_empty() {
            return Err(MetaballError::NoSources);
        }
        self.positions.extend_from_slice(sources);

        let reach = self.radius + self.margin;
        let mut bounds = BoundingVolume::empty();
        for &position in &self.positions {
            bounds.encapsulate_around(position, reach);
        }
        trace!(
            "refreshed {} balls, bounds {:?} .. {:?}",
            self.positions.len(),
            bounds.min,
            bounds.max
        );

        self.bounds = Some(bounds);
        Ok(())
    }

    /// Ball positions captured by the last successful [`refresh`](MetaballField::refresh).
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }
}

impl ScalarField for MetaballField {
    /// Sampling exactly on a ball centre divides by zero and yields `+inf`.
    fn evaluate(&self, point: &Point) -> Value {
        let sum: Value = self
            .positions
            .iter()
            .map(|center| 1. / (center - point).norm_squared())
            .sum();
        sum * self.radius * self.radius - 1.
    }

    fn bounding_volume(&self) -> Option<&BoundingVolume> {
        self.bounds.as_ref()
    }
}
