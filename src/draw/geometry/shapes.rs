//! 2D shape primitives
//!
//! The closed family of shapes produced by the shape extraction layer and
//! stored in spatial containers. Every shape carries a precomputed bounding
//! box, a centroid (the BVH sort key) and an optional back-reference to the
//! board item it came from. Shapes are immutable once built.
//!
//! All four queries (`intersects`, `intersect`, `is_point_inside`,
//! `is_bbox_inside`) are side-effect free and safe to call concurrently.

use super::bbox::BBox2D;
use super::point::Point;
use super::segment::{edge_normal, signed_area2, ContourEdge, RaySeg2D};
use serde::{Deserialize, Serialize};

/// Non-owning reference to a board item (index into the board's item list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Classification of a box against a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BBoxClass {
    Misses,
    Intersects,
    FullyInside,
}

/// A segment hit: normalized parameter along the segment and the outward
/// surface normal at the hit point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f32,
    pub normal: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ShapeKind {
    FilledCircle,
    Ring,
    Triangle,
    Polygon4Pt,
    RoundSegment,
    Polygon,
    DummyBlock,
}

#[derive(Debug, Clone)]
pub struct FilledCircle {
    pub center: Point,
    pub radius: f32,
    radius_squared: f32,
}

#[derive(Debug, Clone)]
pub struct Ring {
    pub center: Point,
    pub inner_radius: f32,
    pub outer_radius: f32,
    inner_squared: f32,
    outer_squared: f32,
}

#[derive(Debug, Clone)]
pub struct Triangle2D {
    pub vertices: [Point; 3],
    /// +1 for counter-clockwise, -1 for clockwise
    orientation: f32,
}

/// Convex quadrilateral (pad rectangles, segment bodies)
#[derive(Debug, Clone)]
pub struct Polygon4Pt {
    pub vertices: [Point; 4],
    orientation: f32,
}

/// Segment with round end caps
#[derive(Debug, Clone)]
pub struct RoundSegment {
    pub start: Point,
    pub end: Point,
    pub radius: f32,
    radius_squared: f32,
    axis: RaySeg2D,
    /// Unit normal to the left of the axis
    left: Point,
}

/// One polygon outline with its holes
#[derive(Debug, Clone, Default)]
pub struct OutlineWithHoles {
    pub outline: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

/// A general polygon restricted to one grid block: point queries use the
/// clipped contours, segment queries only pay for the boundary edges that
/// actually touch the block.
#[derive(Debug, Clone)]
pub struct PolygonBlock {
    pub contours: Vec<OutlineWithHoles>,
    pub edges: Vec<ContourEdge>,
}

#[derive(Debug, Clone)]
pub enum ShapeGeometry {
    FilledCircle(FilledCircle),
    Ring(Ring),
    Triangle(Triangle2D),
    Polygon4Pt(Polygon4Pt),
    RoundSegment(RoundSegment),
    Polygon(PolygonBlock),
    /// A block entirely inside its polygon
    DummyBlock,
}

#[derive(Debug, Clone)]
pub struct Shape2D {
    bbox: BBox2D,
    centroid: Point,
    source: Option<ItemId>,
    geometry: ShapeGeometry,
}

fn finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl Shape2D {
    fn with_bbox(mut bbox: BBox2D, centroid: Point, source: Option<ItemId>, geometry: ShapeGeometry) -> Self {
        bbox.scale_next_up();
        Self { bbox, centroid, source, geometry }
    }

    /// `None` for a non-positive or non-finite radius
    pub fn filled_circle(center: Point, radius: f32, source: Option<ItemId>) -> Option<Self> {
        if !finite(&[center.x, center.y, radius]) || radius <= 0.0 {
            return None;
        }
        let r = Point::new(radius, radius);
        Some(Self::with_bbox(
            BBox2D::from_corners(center - r, center + r),
            center,
            source,
            ShapeGeometry::FilledCircle(FilledCircle {
                center,
                radius,
                radius_squared: radius * radius,
            }),
        ))
    }

    /// `None` unless `outer > inner > 0`
    pub fn ring(center: Point, inner_radius: f32, outer_radius: f32, source: Option<ItemId>) -> Option<Self> {
        if !finite(&[center.x, center.y, inner_radius, outer_radius])
            || inner_radius <= 0.0
            || outer_radius <= inner_radius
        {
            return None;
        }
        let r = Point::new(outer_radius, outer_radius);
        Some(Self::with_bbox(
            BBox2D::from_corners(center - r, center + r),
            center,
            source,
            ShapeGeometry::Ring(Ring {
                center,
                inner_radius,
                outer_radius,
                inner_squared: inner_radius * inner_radius,
                outer_squared: outer_radius * outer_radius,
            }),
        ))
    }

    /// `None` for a zero-area triangle
    pub fn triangle(a: Point, b: Point, c: Point, source: Option<ItemId>) -> Option<Self> {
        let vertices = [a, b, c];
        if !vertices.iter().all(|p| p.is_finite()) {
            return None;
        }
        let area2 = signed_area2(&vertices);
        if area2.abs() <= f32::MIN_POSITIVE {
            return None;
        }
        Some(Self::with_bbox(
            BBox2D::from_points(&vertices),
            (a + b + c) * (1.0 / 3.0),
            source,
            ShapeGeometry::Triangle(Triangle2D {
                vertices,
                orientation: area2.signum(),
            }),
        ))
    }

    /// Convex quad; `None` for a zero-area quad
    pub fn polygon_4pt(vertices: [Point; 4], source: Option<ItemId>) -> Option<Self> {
        if !vertices.iter().all(|p| p.is_finite()) {
            return None;
        }
        let area2 = signed_area2(&vertices);
        if area2.abs() <= f32::MIN_POSITIVE {
            return None;
        }
        let centroid = (vertices[0] + vertices[1] + vertices[2] + vertices[3]) * 0.25;
        Some(Self::with_bbox(
            BBox2D::from_points(&vertices),
            centroid,
            source,
            ShapeGeometry::Polygon4Pt(Polygon4Pt {
                vertices,
                orientation: area2.signum(),
            }),
        ))
    }

    /// `None` for coincident endpoints or non-positive width; callers
    /// substitute a filled circle for zero-length segments.
    pub fn round_segment(start: Point, end: Point, width: f32, source: Option<ItemId>) -> Option<Self> {
        if !finite(&[start.x, start.y, end.x, end.y, width]) || width <= 0.0 || start == end {
            return None;
        }
        let radius = width * 0.5;
        let axis = RaySeg2D::new(start, end);
        if axis.length <= f32::EPSILON {
            return None;
        }
        let r = Point::new(radius, radius);
        let mut bbox = BBox2D::from_corners(start - r, start + r);
        bbox.union(&BBox2D::from_corners(end - r, end + r));
        Some(Self::with_bbox(
            bbox,
            (start + end) * 0.5,
            source,
            ShapeGeometry::RoundSegment(RoundSegment {
                start,
                end,
                radius,
                radius_squared: radius * radius,
                left: Point::new(-axis.dir.y, axis.dir.x),
                axis,
            }),
        ))
    }

    /// Boundary-aware polygon block covering `cell`
    pub fn polygon_block(cell: BBox2D, contours: Vec<OutlineWithHoles>, edges: Vec<ContourEdge>, source: Option<ItemId>) -> Option<Self> {
        if !cell.is_initialized() || contours.is_empty() {
            return None;
        }
        Some(Self::with_bbox(
            cell,
            cell.center(),
            source,
            ShapeGeometry::Polygon(PolygonBlock { contours, edges }),
        ))
    }

    /// Fully filled block
    pub fn dummy_block(cell: BBox2D, source: Option<ItemId>) -> Option<Self> {
        if !cell.is_initialized() {
            return None;
        }
        Some(Self::with_bbox(cell, cell.center(), source, ShapeGeometry::DummyBlock))
    }

    pub fn kind(&self) -> ShapeKind {
        match &self.geometry {
            ShapeGeometry::FilledCircle(_) => ShapeKind::FilledCircle,
            ShapeGeometry::Ring(_) => ShapeKind::Ring,
            ShapeGeometry::Triangle(_) => ShapeKind::Triangle,
            ShapeGeometry::Polygon4Pt(_) => ShapeKind::Polygon4Pt,
            ShapeGeometry::RoundSegment(_) => ShapeKind::RoundSegment,
            ShapeGeometry::Polygon(_) => ShapeKind::Polygon,
            ShapeGeometry::DummyBlock => ShapeKind::DummyBlock,
        }
    }

    pub fn bbox(&self) -> &BBox2D {
        &self.bbox
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn source(&self) -> Option<ItemId> {
        self.source
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    /// Conservative broad-phase overlap test
    pub fn intersects(&self, bbox: &BBox2D) -> bool {
        if !self.bbox.intersects(bbox) {
            return false;
        }
        match &self.geometry {
            ShapeGeometry::FilledCircle(c) => bbox.intersects_circle(c.center, c.radius_squared),
            ShapeGeometry::Ring(r) => bbox.intersects_circle(r.center, r.outer_squared),
            ShapeGeometry::RoundSegment(s) => s.intersects_bbox(bbox),
            ShapeGeometry::Triangle(_)
            | ShapeGeometry::Polygon4Pt(_)
            | ShapeGeometry::Polygon(_)
            | ShapeGeometry::DummyBlock => true,
        }
    }

    /// Exact segment vs shape boundary intersection
    pub fn intersect(&self, seg: &RaySeg2D) -> Option<Hit> {
        match &self.geometry {
            ShapeGeometry::FilledCircle(c) => c.intersect(seg),
            ShapeGeometry::Ring(r) => r.intersect(seg),
            ShapeGeometry::Triangle(t) => intersect_convex(&t.vertices, t.orientation, seg),
            ShapeGeometry::Polygon4Pt(q) => intersect_convex(&q.vertices, q.orientation, seg),
            ShapeGeometry::RoundSegment(s) => s.intersect(seg),
            ShapeGeometry::Polygon(p) => p.intersect(seg),
            // Blocks sit strictly inside their polygon; the boundary blocks
            // around them report the hits.
            ShapeGeometry::DummyBlock => None,
        }
    }

    pub fn is_point_inside(&self, p: Point) -> bool {
        match &self.geometry {
            ShapeGeometry::FilledCircle(c) => (p - c.center).length_squared() <= c.radius_squared,
            ShapeGeometry::Ring(r) => {
                let d2 = (p - r.center).length_squared();
                d2 >= r.inner_squared && d2 <= r.outer_squared
            }
            ShapeGeometry::Triangle(t) => point_in_convex(&t.vertices, t.orientation, p),
            ShapeGeometry::Polygon4Pt(q) => point_in_convex(&q.vertices, q.orientation, p),
            ShapeGeometry::RoundSegment(s) => s.axis.distance_squared_to_point(p) <= s.radius_squared,
            ShapeGeometry::Polygon(block) => block.is_point_inside(p),
            ShapeGeometry::DummyBlock => self.bbox.inside(p),
        }
    }

    pub fn is_bbox_inside(&self, bbox: &BBox2D) -> BBoxClass {
        if !self.intersects(bbox) {
            return BBoxClass::Misses;
        }
        let corners = bbox_corners(bbox);
        let all_inside = |f: &dyn Fn(Point) -> bool| corners.iter().all(|c| f(*c));
        match &self.geometry {
            ShapeGeometry::FilledCircle(c) => {
                if all_inside(&|p| (p - c.center).length_squared() <= c.radius_squared) {
                    BBoxClass::FullyInside
                } else {
                    BBoxClass::Intersects
                }
            }
            ShapeGeometry::Ring(r) => {
                let in_outer = all_inside(&|p| (p - r.center).length_squared() <= r.outer_squared);
                if in_outer && !bbox.intersects_circle(r.center, r.inner_squared) {
                    BBoxClass::FullyInside
                } else {
                    BBoxClass::Intersects
                }
            }
            ShapeGeometry::Triangle(_) | ShapeGeometry::Polygon4Pt(_) | ShapeGeometry::RoundSegment(_) => {
                // Convex shapes contain the box when they contain its corners
                if all_inside(&|p| self.is_point_inside(p)) {
                    BBoxClass::FullyInside
                } else {
                    BBoxClass::Intersects
                }
            }
            ShapeGeometry::Polygon(_) => BBoxClass::Intersects,
            ShapeGeometry::DummyBlock => {
                if self.bbox.contains(bbox) {
                    BBoxClass::FullyInside
                } else {
                    BBoxClass::Intersects
                }
            }
        }
    }
}

fn bbox_corners(bbox: &BBox2D) -> [Point; 4] {
    let (min, max) = (bbox.min(), bbox.max());
    [min, Point::new(max.x, min.y), max, Point::new(min.x, max.y)]
}

fn point_in_convex(vertices: &[Point], orientation: f32, p: Point) -> bool {
    let n = vertices.len();
    (0..n).all(|i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        (b - a).cross(p - a) * orientation >= 0.0
    })
}

fn intersect_convex(vertices: &[Point], orientation: f32, seg: &RaySeg2D) -> Option<Hit> {
    let n = vertices.len();
    let mut best: Option<Hit> = None;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        if let Some(t) = seg.intersect_segment(a, b) {
            if best.map_or(true, |h| t < h.t) {
                let normal = if orientation > 0.0 { edge_normal(a, b) } else { -edge_normal(a, b) };
                best = Some(Hit { t, normal });
            }
        }
    }
    best
}

impl FilledCircle {
    fn intersect(&self, seg: &RaySeg2D) -> Option<Hit> {
        let (t0, _) = seg.circle_roots(self.center, self.radius)?;
        if t0 > 0.0 && t0 <= 1.0 {
            let normal = (seg.at(t0) - self.center) * (1.0 / self.radius);
            Some(Hit { t: t0, normal })
        } else {
            None
        }
    }
}

impl Ring {
    fn intersect(&self, seg: &RaySeg2D) -> Option<Hit> {
        if let Some((t0, _)) = seg.circle_roots(self.center, self.outer_radius) {
            if t0 > 0.0 && t0 <= 1.0 {
                let normal = (seg.at(t0) - self.center) * (1.0 / self.outer_radius);
                return Some(Hit { t: t0, normal });
            }
        }
        // Leaving the hole: far root of the inner circle, normal facing the hole
        let (_, t1) = seg.circle_roots(self.center, self.inner_radius)?;
        if t1 > 0.0 && t1 <= 1.0 {
            let normal = (self.center - seg.at(t1)) * (1.0 / self.inner_radius);
            Some(Hit { t: t1, normal })
        } else {
            None
        }
    }
}

impl RoundSegment {
    fn intersects_bbox(&self, bbox: &BBox2D) -> bool {
        if bbox.inside(self.start) || bbox.inside(self.end) {
            return true;
        }
        let corners = bbox_corners(bbox);
        if corners.iter().any(|c| self.axis.distance_squared_to_point(*c) <= self.radius_squared) {
            return true;
        }
        // Axis crossing the box, or an edge of the box passing within radius
        if bbox.intersect_segment(&self.axis) {
            return true;
        }
        (0..4).any(|i| {
            let edge = RaySeg2D::new(corners[i], corners[(i + 1) % 4]);
            edge.distance_squared_to_point(self.start) <= self.radius_squared
                || edge.distance_squared_to_point(self.end) <= self.radius_squared
        })
    }

    fn intersect(&self, seg: &RaySeg2D) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        let mut consider = |t: f32, normal: Point| {
            if t > 0.0 && t <= 1.0 && best.map_or(true, |h: Hit| t < h.t) {
                best = Some(Hit { t, normal });
            }
        };

        // Two straight sides
        let offset = self.left * self.radius;
        if let Some(t) = seg.intersect_segment(self.start + offset, self.end + offset) {
            consider(t, self.left);
        }
        if let Some(t) = seg.intersect_segment(self.start - offset, self.end - offset) {
            consider(t, -self.left);
        }

        // End caps: only the half facing away from the body counts
        for (center, outward) in [(self.start, -self.axis.dir), (self.end, self.axis.dir)] {
            if let Some((t0, _)) = seg.circle_roots(center, self.radius) {
                let hit = seg.at(t0);
                if (hit - center).dot(outward) >= 0.0 {
                    consider(t0, (hit - center) * (1.0 / self.radius));
                }
            }
        }
        best
    }
}

/// Even-odd crossing test of a horizontal ray against one closed contour
pub fn point_in_contour(contour: &[Point], p: Point) -> bool {
    let n = contour.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = contour[i];
        let b = contour[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl PolygonBlock {
    fn is_point_inside(&self, p: Point) -> bool {
        if self
            .contours
            .iter()
            .any(|c| c.holes.iter().any(|h| point_in_contour(h, p)))
        {
            return false;
        }
        self.contours.iter().any(|c| point_in_contour(&c.outline, p))
    }

    fn intersect(&self, seg: &RaySeg2D) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        for edge in &self.edges {
            if let Some(t) = seg.intersect_segment(edge.start, edge.end) {
                if best.map_or(true, |h| t < h.t) {
                    let along = edge.end - edge.start;
                    let len2 = along.length_squared();
                    let u = if len2 > 0.0 {
                        ((seg.at(t) - edge.start).dot(along) / len2).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    best = Some(Hit { t, normal: edge.normal_at(u) });
                }
            }
        }
        best
    }
}
