//! Ray segments and contour edge normals

use super::point::Point;

/// Corner normals are blended only when the two adjacent edge normals are
/// closer than this (dot product). Sharper corners keep the per-edge normal.
pub const NORMAL_SMOOTHING_DOT: f32 = 0.7;

/// A finite ray from `start` to `end` with precomputed direction data
#[derive(Debug, Clone, Copy)]
pub struct RaySeg2D {
    pub start: Point,
    pub end: Point,
    pub end_minus_start: Point,
    pub dir: Point,
    pub inv_dir: Point,
    pub length: f32,
}

impl RaySeg2D {
    pub fn new(start: Point, end: Point) -> Self {
        let end_minus_start = end - start;
        let length = end_minus_start.length();
        let dir = end_minus_start.normalize();
        Self {
            start,
            end,
            end_minus_start,
            dir,
            inv_dir: Point::new(1.0 / dir.x, 1.0 / dir.y),
            length,
        }
    }

    /// Point at normalized parameter `t` in [0, 1]
    pub fn at(&self, t: f32) -> Point {
        self.start + self.end_minus_start * t
    }

    /// Intersection with the segment `a`-`b`.
    /// Returns the normalized parameter along `self`.
    pub fn intersect_segment(&self, a: Point, b: Point) -> Option<f32> {
        let other = b - a;
        let denom = self.end_minus_start.cross(other);
        if denom.abs() < 1e-12 {
            return None;
        }
        let diff = a - self.start;
        let t = diff.cross(other) / denom;
        let u = diff.cross(self.end_minus_start) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }

    /// Roots of the ray vs circle quadratic as normalized parameters,
    /// ordered near to far. Roots may lie outside [0, 1].
    pub fn circle_roots(&self, center: Point, radius: f32) -> Option<(f32, f32)> {
        if self.length <= f32::EPSILON {
            return None;
        }
        // Solve in distance units along the normalized direction
        let oc = self.start - center;
        let b = oc.dot(self.dir);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t0 = (-b - sq) / self.length;
        let t1 = (-b + sq) / self.length;
        Some((t0, t1))
    }

    pub fn distance_squared_to_point(&self, p: Point) -> f32 {
        let len2 = self.end_minus_start.length_squared();
        if len2 <= f32::EPSILON {
            return (p - self.start).length_squared();
        }
        let t = ((p - self.start).dot(self.end_minus_start) / len2).clamp(0.0, 1.0);
        (p - self.at(t)).length_squared()
    }
}

/// Outward normal of the edge `a`-`b` for a counter-clockwise contour
pub fn edge_normal(a: Point, b: Point) -> Point {
    let d = (b - a).normalize();
    Point::new(d.y, -d.x)
}

/// Blend two edge normals at a shared corner
pub fn blend_normals(own: Point, neighbour: Point) -> Point {
    if own.dot(neighbour) > NORMAL_SMOOTHING_DOT {
        (own + neighbour).normalize()
    } else {
        own
    }
}

/// One boundary edge of a closed contour with its interpolated normals
#[derive(Debug, Clone, Copy)]
pub struct ContourEdge {
    pub start: Point,
    pub end: Point,
    pub normal: Point,
    pub normal_start: Point,
    pub normal_end: Point,
}

impl ContourEdge {
    /// Normal interpolated along the edge at parameter `u` in [0, 1]
    pub fn normal_at(&self, u: f32) -> Point {
        self.normal_start.lerp(self.normal_end, u).normalize()
    }
}

/// Closed contour to edges with blended corner normals.
/// Zero-length edges are dropped first.
pub fn contour_edges(points: &[Point]) -> Vec<ContourEdge> {
    let mut pts: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if pts.last().map_or(true, |last: &Point| (*last - *p).length_squared() > f32::EPSILON * f32::EPSILON) {
            pts.push(*p);
        }
    }
    while pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).length_squared() <= f32::EPSILON * f32::EPSILON {
        pts.pop();
    }
    let n = pts.len();
    if n < 3 {
        return Vec::new();
    }

    let normals: Vec<Point> = (0..n).map(|i| edge_normal(pts[i], pts[(i + 1) % n])).collect();

    (0..n)
        .map(|i| {
            let prev = normals[(i + n - 1) % n];
            let next = normals[(i + 1) % n];
            ContourEdge {
                start: pts[i],
                end: pts[(i + 1) % n],
                normal: normals[i],
                normal_start: blend_normals(normals[i], prev),
                normal_end: blend_normals(normals[i], next),
            }
        })
        .collect()
}

/// Twice the signed area; positive for counter-clockwise contours
pub fn signed_area2(points: &[Point]) -> f32 {
    let n = points.len();
    (0..n).map(|i| points[i].cross(points[(i + 1) % n])).sum()
}
