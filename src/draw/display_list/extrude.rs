//! Layer products to triangle streams
//!
//! Caps come from the layer's merged polygon when it has one, otherwise
//! from each primitive in its container. Side walls follow every boundary
//! contour, except edges lying wholly inside a drilled hole; those are left
//! to the hole barrels.

use super::list::{TriangleDisplayList, TriangleList, Vertex};
use super::texture::{disc_uv_radius, CIRCLE_TEXTURE_BORDER, CIRCLE_TEXTURE_SIZE};
use crate::draw::geometry::{
    contour_edges, signed_area2, BBox2D, Container2D, OutlineWithHoles, Point, RaySeg2D, Ring, RoundSegment,
    Shape2D, ShapeGeometry,
};
use crate::draw::layers::LayerGeometry;
use crate::draw::polygon::{circle_segment_count, PolySet, MIN_SEGMENTS_PER_CIRCLE};
use crate::draw::tessellation::{board_to_render, render_contours};
use std::f32::consts::{PI, SQRT_2};

/// Inputs shared by every layer of one board
#[derive(Debug, Clone, Copy)]
pub struct ExtrusionContext<'a> {
    pub biu_to_3d: f64,
    /// Chord error for circle approximation, in board units
    pub max_error: f64,
    pub texture_size: usize,
    /// Wall edges lying inside one of these shapes are not emitted
    pub through_holes: Option<&'a Container2D>,
}

impl<'a> ExtrusionContext<'a> {
    pub fn new(biu_to_3d: f64, max_error: f64) -> Self {
        Self { biu_to_3d, max_error, texture_size: CIRCLE_TEXTURE_SIZE, through_holes: None }
    }

    pub fn with_through_holes(self, through_holes: &'a Container2D) -> Self {
        Self { through_holes: Some(through_holes), ..self }
    }

    /// Segments for a circle of `radius` render units
    pub fn segments_for(&self, radius: f32) -> usize {
        if self.biu_to_3d <= 0.0 || !radius.is_finite() {
            return MIN_SEGMENTS_PER_CIRCLE;
        }
        circle_segment_count(radius as f64 / self.biu_to_3d, self.max_error)
    }

    /// Half-width of a textured cap triangle per unit radius. The
    /// triangle's sides stay outside the disc plus the texture's blur
    /// border.
    pub fn cap_factor(&self) -> f32 {
        SQRT_2 * (1.0 + CIRCLE_TEXTURE_BORDER as f32 / self.texture_size.max(1) as f32)
    }
}

#[inline]
fn at(p: Point, z: f32) -> Vertex {
    [p.x, p.y, z]
}

#[inline]
fn flat_normal(n: Point) -> Vertex {
    [n.x, n.y, 0.0]
}

pub fn extrude_layer(geometry: &LayerGeometry, ctx: &ExtrusionContext) -> TriangleDisplayList {
    let mut list = TriangleDisplayList::new(geometry.z_bottom, geometry.z_top);
    match &geometry.polygon {
        Some(polygon) => add_polygon(&mut list, polygon, ctx),
        None => {
            for shape in geometry.container.shapes() {
                add_shape(&mut list, shape, ctx);
            }
        }
    }
    log::trace!("[DisplayList] {}: {} triangles", geometry.layer.name(), list.triangle_count());
    list
}

/// Caps and walls for a merged polygon set in board units
pub fn add_polygon(list: &mut TriangleDisplayList, polygon: &PolySet, ctx: &ExtrusionContext) {
    let (z_bottom, z_top) = (list.z_bottom, list.z_top);
    for [a, b, c] in polygon.triangulate() {
        let tri = [a, b, c].map(|p| board_to_render(p, ctx.biu_to_3d));
        add_cap_triangle(list, tri);
    }
    if z_top <= z_bottom {
        return;
    }
    for contour in render_contours(polygon, ctx.biu_to_3d) {
        add_contour_walls(&mut list.middle, &contour.outline, z_bottom, z_top, ctx.through_holes);
        for hole in &contour.holes {
            add_contour_walls(&mut list.middle, hole, z_bottom, z_top, ctx.through_holes);
        }
    }
}

/// Vertical quads along a closed contour. Outlines are expected
/// counter-clockwise and holes clockwise so normals face away from the
/// material. Returns the number of walls emitted.
pub fn add_contour_walls(
    middle: &mut TriangleList,
    contour: &[Point],
    z_bottom: f32,
    z_top: f32,
    through_holes: Option<&Container2D>,
) -> usize {
    let mut added = 0;
    for edge in contour_edges(contour) {
        if through_holes.is_some_and(|holes| edge_inside_hole(holes, edge.start, edge.end)) {
            continue;
        }
        let (a, b) = (edge.start, edge.end);
        let (na, nb) = (flat_normal(edge.normal_start), flat_normal(edge.normal_end));
        middle.add_quad_with_normals([at(a, z_bottom), at(b, z_bottom), at(b, z_top), at(a, z_top)], [na, nb, nb, na]);
        added += 1;
    }
    added
}

/// Slack for contour vertices sitting on a hole boundary, render units
pub const HOLE_EDGE_TOLERANCE: f32 = 1.0e-4;

/// True when both ends of `a`-`b` lie in the same hole. Holes are convex,
/// so the whole edge does too.
fn edge_inside_hole(holes: &Container2D, a: Point, b: Point) -> bool {
    if !holes.intersect_any(&RaySeg2D::new(a, b)) {
        return false;
    }
    let mut span = BBox2D::from_corners(a, b);
    span.scale_next_up();
    holes
        .get_intersecting_objects(&span)
        .into_iter()
        .any(|hole| inside_with_slack(hole, a) && inside_with_slack(hole, b))
}

fn inside_with_slack(hole: &Shape2D, p: Point) -> bool {
    let nudged = p + (hole.centroid() - p).normalize() * HOLE_EDGE_TOLERANCE;
    hole.is_point_inside(p) || hole.is_point_inside(nudged)
}

/// One primitive's caps and walls
pub fn add_shape(list: &mut TriangleDisplayList, shape: &Shape2D, ctx: &ExtrusionContext) {
    let walls = list.z_top > list.z_bottom;
    match shape.geometry() {
        ShapeGeometry::FilledCircle(circle) => {
            add_circle_caps(list, circle.center, circle.radius, ctx);
            if walls {
                let contour = circle_points(circle.center, circle.radius, ctx.segments_for(circle.radius));
                add_walls(list, &contour, ctx);
            }
        }
        ShapeGeometry::Ring(ring) => add_ring(list, ring, ctx),
        ShapeGeometry::RoundSegment(segment) => add_round_segment(list, segment, ctx),
        ShapeGeometry::Triangle(triangle) => add_convex(list, &triangle.vertices, walls, ctx),
        ShapeGeometry::Polygon4Pt(quad) => add_convex(list, &quad.vertices, walls, ctx),
        ShapeGeometry::Polygon(block) => {
            for contour in &block.contours {
                add_outline_caps(list, contour);
            }
        }
        ShapeGeometry::DummyBlock => add_convex(list, &bbox_corners(shape.bbox()), false, ctx),
    }
}

fn add_walls(list: &mut TriangleDisplayList, contour: &[Point], ctx: &ExtrusionContext) {
    add_contour_walls(&mut list.middle, contour, list.z_bottom, list.z_top, ctx.through_holes);
}

/// Counter-clockwise triangle on top, mirrored underneath
fn add_cap_triangle(list: &mut TriangleDisplayList, [a, b, c]: [Point; 3]) {
    let (b, c) = if (b - a).cross(c - a) < 0.0 { (c, b) } else { (b, c) };
    list.top.add_triangle(at(a, list.z_top), at(b, list.z_top), at(c, list.z_top));
    list.bottom.add_triangle(at(a, list.z_bottom), at(c, list.z_bottom), at(b, list.z_bottom));
}

fn add_convex(list: &mut TriangleDisplayList, vertices: &[Point], walls: bool, ctx: &ExtrusionContext) {
    let mut contour = vertices.to_vec();
    if signed_area2(&contour) < 0.0 {
        contour.reverse();
    }
    for i in 1..contour.len().saturating_sub(1) {
        add_cap_triangle(list, [contour[0], contour[i], contour[i + 1]]);
    }
    if walls {
        add_walls(list, &contour, ctx);
    }
}

fn bbox_corners(bbox: &BBox2D) -> [Point; 4] {
    let (min, max) = (bbox.min(), bbox.max());
    [min, Point::new(max.x, min.y), max, Point::new(min.x, max.y)]
}

/// Earcut one outline with its holes into caps
fn add_outline_caps(list: &mut TriangleDisplayList, contour: &OutlineWithHoles) {
    let mut points: Vec<Point> = contour.outline.clone();
    let mut hole_indices = Vec::with_capacity(contour.holes.len());
    for hole in &contour.holes {
        hole_indices.push(points.len());
        points.extend_from_slice(hole);
    }
    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x as f64, p.y as f64]).collect();
    let Ok(indices) = earcutr::earcut(&flat, &hole_indices, 2) else {
        log::debug!("[DisplayList] earcut failed on a {} point contour", points.len());
        return;
    };
    for tri in indices.chunks_exact(3) {
        add_cap_triangle(list, [points[tri[0]], points[tri[1]], points[tri[2]]]);
    }
}

/// Counter-clockwise points on a circle, first point at angle zero
pub fn circle_points(center: Point, radius: f32, segments: usize) -> Vec<Point> {
    let n = segments.max(3);
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / n as f32;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Two textured triangles per face, each covering half the disc
fn add_circle_caps(list: &mut TriangleDisplayList, center: Point, radius: f32, ctx: &ExtrusionContext) {
    let f = radius * ctx.cap_factor();
    let left = Point::new(center.x - f, center.y);
    let right = Point::new(center.x + f, center.y);
    let up = Point::new(center.x, center.y + f);
    let down = Point::new(center.x, center.y - f);
    add_textured_cap(list, center, radius, [left, right, up], ctx);
    add_textured_cap(list, center, radius, [right, left, down], ctx);
}

/// `tri` must be counter-clockwise
fn add_textured_cap(list: &mut TriangleDisplayList, center: Point, radius: f32, tri: [Point; 3], ctx: &ExtrusionContext) {
    let k = disc_uv_radius(ctx.texture_size) / radius;
    let uv = |p: Point| [0.5 + (p.x - center.x) * k, 0.5 + (p.y - center.y) * k];
    let [a, b, c] = tri;
    list.top_segment_ends
        .add_textured_triangle([at(a, list.z_top), at(b, list.z_top), at(c, list.z_top)], [uv(a), uv(b), uv(c)]);
    list.bottom_segment_ends.add_textured_triangle(
        [at(a, list.z_bottom), at(c, list.z_bottom), at(b, list.z_bottom)],
        [uv(a), uv(c), uv(b)],
    );
}

fn add_ring(list: &mut TriangleDisplayList, ring: &Ring, ctx: &ExtrusionContext) {
    let n = ctx.segments_for(ring.outer_radius);
    add_annulus(list, ring.center, ring.inner_radius, ring.outer_radius, n, ctx.through_holes);
}

/// Quads between two concentric circles, with walls on both
pub(super) fn add_annulus(
    list: &mut TriangleDisplayList,
    center: Point,
    inner_radius: f32,
    outer_radius: f32,
    segments: usize,
    through_holes: Option<&Container2D>,
) {
    let outer = circle_points(center, outer_radius, segments);
    let inner = circle_points(center, inner_radius, segments);
    let n = outer.len();
    let (z_bottom, z_top) = (list.z_bottom, list.z_top);
    for i in 0..n {
        let j = (i + 1) % n;
        list.top.add_quad(at(inner[i], z_top), at(outer[i], z_top), at(outer[j], z_top), at(inner[j], z_top));
        list.bottom
            .add_quad(at(inner[i], z_bottom), at(inner[j], z_bottom), at(outer[j], z_bottom), at(outer[i], z_bottom));
    }
    if z_top > z_bottom {
        add_contour_walls(&mut list.middle, &outer, z_bottom, z_top, through_holes);
        let hole: Vec<Point> = inner.into_iter().rev().collect();
        add_contour_walls(&mut list.middle, &hole, z_bottom, z_top, through_holes);
    }
}

fn add_round_segment(list: &mut TriangleDisplayList, segment: &RoundSegment, ctx: &ExtrusionContext) {
    let r = segment.radius;
    let d = segment.end - segment.start;
    let length = d.length();
    if length <= f32::EPSILON {
        add_circle_caps(list, segment.start, r, ctx);
        if list.z_top > list.z_bottom {
            let contour = circle_points(segment.start, r, ctx.segments_for(r));
            add_walls(list, &contour, ctx);
        }
        return;
    }
    let dir = d * (1.0 / length);
    let perp = Point::new(-dir.y, dir.x);

    let body = [
        segment.start - perp * r,
        segment.end - perp * r,
        segment.end + perp * r,
        segment.start + perp * r,
    ];
    add_cap_triangle(list, [body[0], body[1], body[2]]);
    add_cap_triangle(list, [body[0], body[2], body[3]]);

    let f = r * ctx.cap_factor();
    let (start, end) = (segment.start, segment.end);
    add_textured_cap(list, end, r, [end - perp * f, end + dir * f, end + perp * f], ctx);
    add_textured_cap(list, start, r, [start + perp * f, start - dir * f, start - perp * f], ctx);

    if list.z_top > list.z_bottom {
        let contour = capsule_points(start, end, r, ctx.segments_for(r));
        add_walls(list, &contour, ctx);
    }
}

/// Counter-clockwise outline of a round-ended segment
pub fn capsule_points(start: Point, end: Point, radius: f32, segments: usize) -> Vec<Point> {
    let d = end - start;
    let length = d.length();
    if length <= f32::EPSILON {
        return circle_points(start, radius, segments);
    }
    let dir = d * (1.0 / length);
    let perp = Point::new(-dir.y, dir.x);
    let half = (segments / 2).max(2);

    let mut points = Vec::with_capacity(2 * (half + 1));
    for (center, offset) in [(end, -PI / 2.0), (start, PI / 2.0)] {
        for i in 0..=half {
            let angle = offset + PI * i as f32 / half as f32;
            points.push(center + (dir * angle.cos() + perp * angle.sin()) * radius);
        }
    }
    points
}
