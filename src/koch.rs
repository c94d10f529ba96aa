//! Koch curve point generation.
//!
//! Every segment is expanded into the full range `[start, ..., end]`. Callers
//! that chain segments drop the duplicated shared endpoint themselves.

use crate::error::KochError;
use std::{
    fmt,
    ops::{Add, Mul, Sub},
    str::FromStr,
};

/// Side length of the base triangle used by [`generate_snowflake`].
pub const DEFAULT_SIZE: f64 = 0.9;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub const fn point(x: f64, y: f64) -> Point {
    Point { x, y }
}

impl Point {
    /// Rotates the vector counter-clockwise by `angle` radians.
    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        point(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    pub fn to_f32(self) -> [f32; 2] {
        [self.x as f32, self.y as f32]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        point(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        point(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        point(self.x * rhs, self.y * rhs)
    }
}

/// Number of subdivision rounds, bounded by [`Depth::MAX`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "u32"))]
pub struct Depth(u32);

impl Depth {
    pub const ZERO: Depth = Depth(0);
    pub const DEFAULT: Depth = Depth(4);
    /// 3 * 4^8 = 196608 outline vertices.
    pub const MAX: Depth = Depth(8);

    pub fn new(depth: u32) -> Result<Self, KochError> {
        if depth > Self::MAX.0 {
            return Err(KochError::ResourceExhaustion {
                depth: depth.into(),
                max: Self::MAX.0,
            });
        }
        Ok(Self(depth))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Maps the keys `'0'..='5'` to a depth.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '0'..='5' => key.to_digit(10).map(Self),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1).ok()
    }

    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    /// Points produced by [`subdivide_segment`]: `4^d + 1`.
    pub fn segment_point_count(self) -> usize {
        4usize.pow(self.0) + 1
    }

    /// Outline vertices of a snowflake, closing point excluded: `3 * 4^d`.
    pub fn vertex_count(self) -> usize {
        3 * 4usize.pow(self.0)
    }
}

impl TryFrom<u32> for Depth {
    type Error = KochError;

    fn try_from(depth: u32) -> Result<Self, Self::Error> {
        Self::new(depth)
    }
}

impl TryFrom<i64> for Depth {
    type Error = KochError;

    fn try_from(depth: i64) -> Result<Self, Self::Error> {
        if depth < 0 {
            return Err(KochError::InvalidArgument(format!(
                "depth must be non-negative, got {}",
                depth
            )));
        }
        match u32::try_from(depth) {
            Ok(depth) => Self::new(depth),
            Err(_) => Err(KochError::ResourceExhaustion {
                depth,
                max: Self::MAX.0,
            }),
        }
    }
}

impl From<Depth> for u32 {
    fn from(depth: Depth) -> u32 {
        depth.0
    }
}

impl FromStr for Depth {
    type Err = KochError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let depth: i64 = s
            .trim()
            .parse()
            .map_err(|_| KochError::InvalidArgument(format!("depth {:?} is not an integer", s)))?;
        Self::try_from(depth)
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered sequence of points joined by straight edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.0.last().copied()
    }

    /// True when the last point repeats the first one.
    pub fn is_closed(&self) -> bool {
        self.0.len() > 1 && self.first() == self.last()
    }

    /// Shoelace area, negative for clockwise winding. An open polyline is
    /// treated as if its last point connected back to the first.
    pub fn signed_area(&self) -> f64 {
        let n = self.0.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let (a, b) = (self.0[i], self.0[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice / 2.0
    }

    /// Interleaved `[x, y]` pairs for vertex buffers.
    pub fn to_f32(&self) -> Vec<[f32; 2]> {
        self.0.iter().map(|p| p.to_f32()).collect()
    }

    pub fn into_inner(self) -> Vec<Point> {
        self.0
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

/// Expands `start -> end` into a Koch curve of the given depth.
///
/// The result always starts at `start`, ends at `end` and holds `4^d + 1`
/// points. The bump sits on the left of the directed segment.
pub fn subdivide_segment(start: Point, end: Point, depth: Depth) -> Polyline {
    let mut points = Vec::with_capacity(depth.segment_point_count());
    push_segment(&mut points, start, end, depth.get());
    points.push(end);
    Polyline(points)
}

// Pushes every point of the curve except `end`.
fn push_segment(points: &mut Vec<Point>, s: Point, e: Point, depth: u32) {
    if depth == 0 {
        points.push(s);
        return;
    }
    //            m
    //           / \
    //   s------l   r------e
    let l = s.lerp(e, 1.0 / 3.0);
    let r = s.lerp(e, 2.0 / 3.0);
    let m = l + (r - l).rotated(std::f64::consts::FRAC_PI_3);
    push_segment(points, s, l, depth - 1);
    push_segment(points, l, m, depth - 1);
    push_segment(points, m, r, depth - 1);
    push_segment(points, r, e, depth - 1);
}

/// Equilateral triangle of side `size` centered on the origin, wound
/// clockwise so that [`subdivide_segment`] bumps point outward.
pub fn base_triangle(size: f64) -> [Point; 3] {
    let h = 3.0f64.sqrt() / 2.0 * size;
    [
        point(-size / 2.0, -h / 3.0),
        point(0.0, 2.0 * h / 3.0),
        point(size / 2.0, -h / 3.0),
    ]
}

/// Closed snowflake outline at [`DEFAULT_SIZE`].
pub fn generate_snowflake(depth: Depth) -> Polyline {
    snowflake_outline(depth, DEFAULT_SIZE)
}

/// Closed snowflake outline: `3 * 4^d` vertices followed by a copy of the first.
pub fn snowflake_outline(depth: Depth, size: f64) -> Polyline {
    let [a, b, c] = base_triangle(size);
    let mut points = Vec::with_capacity(depth.vertex_count() + 1);
    for (s, e) in [(a, b), (b, c), (c, a)] {
        push_segment(&mut points, s, e, depth.get());
    }
    points.push(a);
    tracing::debug!(depth = depth.get(), len = points.len(), "generated snowflake");
    Polyline(points)
}

/// A generated snowflake held by the host until the next regeneration.
#[derive(Clone, Debug, PartialEq)]
pub struct Snowflake {
    depth: Depth,
    size: f64,
    outline: Polyline,
}

impl Snowflake {
    pub fn new(depth: Depth, size: f64) -> Self {
        Self {
            depth,
            size,
            outline: snowflake_outline(depth, size),
        }
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Closed outline, suitable for a line strip.
    pub fn outline(&self) -> &Polyline {
        &self.outline
    }

    /// Outline without the closing duplicate, suitable for a line loop.
    pub fn vertices(&self) -> &[Point] {
        let points = self.outline.points();
        &points[..points.len() - 1]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    /// `center` followed by the closed outline, for a triangle fan.
    pub fn fan_vertices(&self, center: Point) -> Vec<Point> {
        std::iter::once(center)
            .chain(self.outline.points().iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 1e-9;

    fn depth(d: u32) -> Depth {
        Depth::new(d).unwrap()
    }

    fn assert_points_eq(actual: &[Point], expected: &[Point]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(a.x, e.x, epsilon = EPS);
            assert_abs_diff_eq!(a.y, e.y, epsilon = EPS);
        }
    }

    #[test]
    fn depth_zero_keeps_endpoints() {
        let (s, e) = (point(0.2, -1.0), point(4.0, 3.5));
        assert_eq!(subdivide_segment(s, e, Depth::ZERO).points(), &[s, e]);
    }

    #[test]
    fn depth_one_bump() {
        let h = 3.0f64.sqrt() / 2.0;
        let line = subdivide_segment(point(0.0, 0.0), point(3.0, 0.0), depth(1));
        assert_points_eq(
            line.points(),
            &[
                point(0.0, 0.0),
                point(1.0, 0.0),
                point(1.5, h),
                point(2.0, 0.0),
                point(3.0, 0.0),
            ],
        );
    }

    #[test]
    fn segment_endpoints_and_count() {
        let (s, e) = (point(-1.0, 2.0), point(0.5, -0.25));
        for d in 0..=6 {
            let line = subdivide_segment(s, e, depth(d));
            assert_eq!(line.len(), 4usize.pow(d) + 1);
            assert_eq!(line.len(), depth(d).segment_point_count());
            assert_eq!(line.first(), Some(s));
            assert_eq!(line.last(), Some(e));
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let (s, e) = (point(0.0, 0.0), point(1.0, 1.0));
        assert_eq!(
            subdivide_segment(s, e, depth(4)),
            subdivide_segment(s, e, depth(4))
        );
        assert_eq!(generate_snowflake(depth(3)), generate_snowflake(depth(3)));
    }

    #[test]
    fn snowflake_depth_zero_is_triangle() {
        let outline = generate_snowflake(Depth::ZERO);
        let [a, b, c] = base_triangle(DEFAULT_SIZE);
        assert_eq!(outline.points(), &[a, b, c, a]);
        assert!(outline.is_closed());
    }

    #[test]
    fn snowflake_vertex_count() {
        for d in 0..=6 {
            let snowflake = Snowflake::new(depth(d), DEFAULT_SIZE);
            assert_eq!(snowflake.vertex_count(), 3 * 4usize.pow(d));
            assert_eq!(snowflake.outline().len(), 3 * 4usize.pow(d) + 1);
            assert!(snowflake.outline().is_closed());
        }
    }

    #[test]
    fn base_triangle_is_equilateral_and_centered() {
        let [a, b, c] = base_triangle(2.0);
        let len = |p: Point, q: Point| ((q.x - p.x).powi(2) + (q.y - p.y).powi(2)).sqrt();
        assert_abs_diff_eq!(len(a, b), 2.0, epsilon = EPS);
        assert_abs_diff_eq!(len(b, c), 2.0, epsilon = EPS);
        assert_abs_diff_eq!(len(c, a), 2.0, epsilon = EPS);
        assert_abs_diff_eq!((a.x + b.x + c.x) / 3.0, 0.0, epsilon = EPS);
        assert_abs_diff_eq!((a.y + b.y + c.y) / 3.0, 0.0, epsilon = EPS);
    }

    #[test]
    fn bumps_point_outward() {
        let triangle = generate_snowflake(Depth::ZERO).signed_area();
        let first = generate_snowflake(depth(1)).signed_area();
        assert!(triangle < 0.0, "base triangle should wind clockwise");
        assert_abs_diff_eq!(first, triangle * 4.0 / 3.0, epsilon = EPS);
        for d in 1..=5 {
            let coarse = generate_snowflake(depth(d - 1)).signed_area();
            let fine = generate_snowflake(depth(d)).signed_area();
            assert!(fine.abs() > coarse.abs());
        }
    }

    #[test]
    fn refining_coarse_outline_reproduces_finer() {
        for (d1, d2) in [(0, 2), (1, 3), (2, 4)] {
            let coarse = generate_snowflake(depth(d1));
            let pts = coarse.points();
            let mut refined = Vec::new();
            for pair in pts.windows(2) {
                let part = subdivide_segment(pair[0], pair[1], depth(d2 - d1));
                refined.extend_from_slice(&part.points()[..part.len() - 1]);
            }
            refined.push(pts[0]);
            assert_points_eq(&refined, generate_snowflake(depth(d2)).points());
        }
    }

    #[test]
    fn fan_starts_at_center() {
        let snowflake = Snowflake::new(depth(2), 1.0);
        let fan = snowflake.fan_vertices(Point::default());
        assert_eq!(fan[0], Point::default());
        assert_eq!(&fan[1..], snowflake.outline().points());
    }

    #[test]
    fn depth_validation() {
        assert!(matches!(
            Depth::try_from(-1i64),
            Err(KochError::InvalidArgument(_))
        ));
        assert!(matches!(
            Depth::new(Depth::MAX.get() + 1),
            Err(KochError::ResourceExhaustion { .. })
        ));
        assert!(matches!(
            Depth::try_from(i64::MAX),
            Err(KochError::ResourceExhaustion { .. })
        ));
        assert!(matches!(
            "abc".parse::<Depth>(),
            Err(KochError::InvalidArgument(_))
        ));
        assert_eq!(" 3 ".parse::<Depth>().unwrap(), depth(3));
        assert_eq!(Depth::try_from(5i64).unwrap(), depth(5));
    }

    #[test]
    fn depth_keys_and_steps() {
        assert_eq!(Depth::from_key('0'), Some(Depth::ZERO));
        assert_eq!(Depth::from_key('5'), Some(depth(5)));
        assert_eq!(Depth::from_key('6'), None);
        assert_eq!(Depth::from_key('x'), None);
        assert_eq!(Depth::ZERO.prev(), None);
        assert_eq!(Depth::MAX.next(), None);
        assert_eq!(depth(2).next(), Some(depth(3)));
    }
}
