//! Sample points and the batches returned to callers.

/// Returns true iff `(x, y)` lies inside or on the unit circle.
#[inline]
pub fn is_inside(x: f64, y: f64) -> bool {
    x * x + y * y <= 1.0
}

/// One point drawn from the square `[-1, 1] x [-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    /// Cached result of [`is_inside`] for `(x, y)`.
    pub inside: bool,
}

impl SamplePoint {
    /// Builds a point and classifies it.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            inside: is_inside(x, y),
        }
    }

    /// Converts into the `(x, y, inside)` triple.
    #[inline]
    pub fn into_tuple(self) -> (f64, f64, bool) {
        (self.x, self.y, self.inside)
    }
}

impl From<SamplePoint> for (f64, f64, bool) {
    fn from(point: SamplePoint) -> Self {
        point.into_tuple()
    }
}

/// The points produced by one sampling call, owned by the caller.
///
/// Points are laid out in worker-index order: every point of worker 0
/// precedes every point of worker 1, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBatch {
    points: Vec<SamplePoint>,
}

impl SampleBatch {
    pub(crate) fn from_points(points: Vec<SamplePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points classified inside the circle.
    pub fn inside_count(&self) -> usize {
        self.points.iter().filter(|p| p.inside).count()
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SamplePoint> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<SamplePoint> {
        self.points
    }
}

impl IntoIterator for SampleBatch {
    type Item = SamplePoint;
    type IntoIter = std::vec::IntoIter<SamplePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a SampleBatch {
    type Item = &'a SamplePoint;
    type IntoIter = std::slice::Iter<'a, SamplePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
