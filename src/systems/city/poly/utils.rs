// UTILS
// geometry kernel shared by every layout stage

use bevy_math::Vec2;

use crate::config::PARALLEL_EPSILON;
use crate::systems::city::Polygon;

/// Axis-aligned bounds of a polygon or point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl BBox {
    /// Bounds of all points. Returns `None` for an empty slice.
    pub fn from_polygon(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Grows the bounds by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    /// The bounds as a counter-clockwise rectangle.
    pub fn to_polygon(&self) -> Polygon {
        vec![
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

/// Determines whether a point is inside a polygon using the ray-casting algorithm.
/// The polygon wraps from its last vertex back to the first.
/// # Returns `true` if the point is inside the polygon, otherwise `false`.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// find the intersection between two segments, lookup Cramer's rule
/// https://cp-algorithms.com/geometry/lines-intersection.html
/// # Returns `Some(Vec2)` if the segments intersect, `None` if they are parallel or miss each other
pub fn line_segment_intersection(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2> {
    let s1 = p2 - p1; // direction vector of segment 1
    let s2 = p4 - p3; // direction vector of segment 2

    let denom = s1.x * s2.y - s2.x * s1.y;

    // parallel or collinear
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let u = (s1.x * (p1.y - p3.y) - s1.y * (p1.x - p3.x)) / denom;
    let t = (s2.x * (p1.y - p3.y) - s2.y * (p1.x - p3.x)) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(p1 + t * s1)
    } else {
        None
    }
}

/// True if either endpoint is inside the polygon or the segment crosses one of its edges.
pub fn segment_intersects_polygon(p1: Vec2, p2: Vec2, polygon: &[Vec2]) -> bool {
    if point_in_polygon(p1, polygon) || point_in_polygon(p2, polygon) {
        return true;
    }

    let n = polygon.len();
    (0..n).any(|i| line_segment_intersection(p1, p2, polygon[i], polygon[(i + 1) % n]).is_some())
}

/// Projects every vertex onto `axis` and returns the covered interval.
pub fn project_polygon(polygon: &[Vec2], axis: Vec2) -> (f32, f32) {
    polygon
        .iter()
        .map(|p| p.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), d| (min.min(d), max.max(d)))
}

/// Separating axis test over the edge normals of both polygons.
/// Only exact for convex input. Touching polygons count as intersecting.
pub fn polygons_intersect(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }

    for polygon in [a, b] {
        for i in 0..polygon.len() {
            let edge = polygon[(i + 1) % polygon.len()] - polygon[i];
            if edge.length_squared() == 0.0 {
                continue;
            }
            let axis = edge.perp();

            let (min_a, max_a) = project_polygon(a, axis);
            let (min_b, max_b) = project_polygon(b, axis);
            if max_a < min_b || max_b < min_a {
                return false; // found a separating axis
            }
        }
    }

    true
}

/// Overlap test for simple polygons, concave ones included: some edge of `a`
/// touches `b`, or `b` sits entirely inside `a`. Touching counts as overlapping.
pub fn polygons_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }

    let n = a.len();
    (0..n).any(|i| segment_intersects_polygon(a[i], a[(i + 1) % n], b)) || b.iter().any(|&p| point_in_polygon(p, a))
}

/// Corners of a rotated rectangle, counter-clockwise starting at the local (-w/2, -l/2) corner.
/// `rotation` is in degrees.
pub fn building_corners(center: Vec2, width: f32, length: f32, rotation: f32) -> [Vec2; 4] {
    let rot = Vec2::from_angle(rotation.to_radians());
    let (hw, hl) = (width / 2.0, length / 2.0);

    [
        Vec2::new(-hw, -hl),
        Vec2::new(hw, -hl),
        Vec2::new(hw, hl),
        Vec2::new(-hw, hl),
    ]
    .map(|corner| center + rot.rotate(corner))
}

/// Same as [`building_corners`] but as an owned polygon.
pub fn building_rect(center: Vec2, width: f32, length: f32, rotation: f32) -> Polygon {
    building_corners(center, width, length, rotation).to_vec()
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

/// Graham scan. The input is copied, callers keep their point list untouched.
/// # Returns the hull in counter-clockwise order without collinear points.
pub fn convex_hull(points: &[Vec2]) -> Polygon {
    let mut pts = points.to_vec();
    if pts.len() < 3 {
        return pts;
    }

    // lowest, then leftmost point becomes the pivot
    let pivot_idx = pts
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)))
        .map_or(0, |(i, _)| i);
    pts.swap(0, pivot_idx);
    let pivot = pts[0];

    pts[1..].sort_by(|a, b| {
        let angle_a = (a.y - pivot.y).atan2(a.x - pivot.x);
        let angle_b = (b.y - pivot.y).atan2(b.x - pivot.x);
        angle_a
            .total_cmp(&angle_b)
            .then(pivot.distance_squared(*a).total_cmp(&pivot.distance_squared(*b)))
    });

    let mut hull: Polygon = Vec::with_capacity(pts.len());
    for p in pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    hull
}

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a.lerp(b, t)
}

/// Direction from `a` to `b` in degrees.
pub fn angle(a: Vec2, b: Vec2) -> f32 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

/// Shortest distance from `point` to the segment `a`-`b`.
pub fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Computes the signed area of a polygon (positive when counter-clockwise)
/// # Returns 0.0 for polygons with fewer than 3 vertices.
pub fn signed_polygon_area(polygon: &[Vec2]) -> f32 {
    if polygon.len() < 3 {
        return 0.0;
    }

    let n = polygon.len();
    let mut area = 0.0;

    for i in 0..n {
        let j = (i + 1) % n;
        area += polygon[i].x * polygon[j].y - polygon[j].x * polygon[i].y;
    }

    area / 2.0
}

/// Shoelace area, always non-negative.
pub fn polygon_area(polygon: &[Vec2]) -> f32 {
    signed_polygon_area(polygon).abs()
}
