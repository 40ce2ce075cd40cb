//! Polygon-with-holes sets in board units
//!
//! A thin layer over `geo` polygons. Outlines are appended without merging;
//! `simplify` merges overlaps and drops degenerate contours, the boolean
//! operations return merged results.

use super::circle::{contour_to_polygon, segment_polygon};
use geo::{Area, BooleanOps, BoundingRect, Contains, Coord, LineString, MapCoords, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// Point in board internal units (nanometres)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardPoint {
    pub x: f64,
    pub y: f64,
}

impl BoardPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: BoardPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Rotate about `center` by `angle_deg` (counter-clockwise in board axes)
    pub fn rotated_about(self, center: BoardPoint, angle_deg: f64) -> BoardPoint {
        if angle_deg == 0.0 {
            return self;
        }
        let (s, c) = angle_deg.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        BoardPoint::new(center.x + dx * c - dy * s, center.y + dx * s + dy * c)
    }
}

impl From<Coord<f64>> for BoardPoint {
    fn from(c: Coord<f64>) -> Self {
        BoardPoint::new(c.x, c.y)
    }
}

/// Contours with less area than this (square board units) are dropped
const DEGENERATE_AREA: f64 = 1.0;

#[derive(Debug, Clone, Default)]
pub struct PolySet {
    polygons: Vec<Polygon<f64>>,
}

impl PolySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_polygons(polygons: Vec<Polygon<f64>>) -> Self {
        Self { polygons }
    }

    pub fn from_multi(multi: MultiPolygon<f64>) -> Self {
        Self { polygons: multi.0 }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn outline_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    pub fn to_multi(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(self.polygons.clone())
    }

    /// Append a new outline (no holes); returns its index
    pub fn add_outline(&mut self, points: &[BoardPoint]) -> usize {
        self.polygons.push(contour_to_polygon(points));
        self.polygons.len() - 1
    }

    /// Append a hole to outline `outline`
    pub fn add_hole(&mut self, outline: usize, points: &[BoardPoint]) {
        if let Some(poly) = self.polygons.get_mut(outline) {
            let hole = LineString::from(points.iter().map(|p| Coord { x: p.x, y: p.y }).collect::<Vec<_>>());
            poly.interiors_push(hole);
        }
    }

    pub fn add_polygon(&mut self, polygon: Polygon<f64>) {
        self.polygons.push(polygon);
    }

    /// Append without merging
    pub fn append(&mut self, other: &PolySet) {
        self.polygons.extend(other.polygons.iter().cloned());
    }

    pub fn boolean_add(&mut self, other: &PolySet) {
        if other.is_empty() {
            return;
        }
        let mut all = std::mem::take(&mut self.polygons);
        all.extend(other.polygons.iter().cloned());
        self.polygons = union_all(all).0;
    }

    pub fn boolean_subtract(&mut self, other: &PolySet) {
        if self.is_empty() || other.is_empty() {
            return;
        }
        let cutter = union_all(other.polygons.clone());
        let subject = union_all(std::mem::take(&mut self.polygons));
        self.polygons = subject.difference(&cutter).0;
        self.drop_degenerate();
    }

    pub fn boolean_intersect(&mut self, other: &PolySet) {
        if self.is_empty() {
            return;
        }
        if other.is_empty() {
            self.polygons.clear();
            return;
        }
        let clip = union_all(other.polygons.clone());
        let subject = union_all(std::mem::take(&mut self.polygons));
        self.polygons = subject.intersection(&clip).0;
        self.drop_degenerate();
    }

    /// Merge overlapping outlines and drop degenerate contours
    pub fn simplify(&mut self) {
        let polygons = std::mem::take(&mut self.polygons);
        self.polygons = union_all(polygons).0;
        self.drop_degenerate();
    }

    fn drop_degenerate(&mut self) {
        let keep = |ring: &LineString<f64>| {
            ring.0.len() >= 4 && Polygon::new(ring.clone(), vec![]).unsigned_area() > DEGENERATE_AREA
        };
        self.polygons = std::mem::take(&mut self.polygons)
            .into_iter()
            .filter(|p| keep(p.exterior()))
            .map(|p| {
                let (exterior, interiors) = p.into_inner();
                Polygon::new(exterior, interiors.into_iter().filter(|h| keep(h)).collect())
            })
            .collect();
    }

    /// Grow (positive) or shrink (negative) every outline by `amount`, with
    /// round corners approximated within `max_error`
    pub fn inflate(&mut self, amount: f64, max_error: f64) {
        if amount == 0.0 || self.is_empty() {
            return;
        }
        let radius = amount.abs();

        let mut stadiums = Vec::new();
        for poly in &self.polygons {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors().iter()) {
                for line in ring.lines() {
                    stadiums.push(segment_polygon(line.start.into(), line.end.into(), radius, max_error));
                }
            }
        }
        let band = union_all(stadiums);
        let base = union_all(std::mem::take(&mut self.polygons));
        self.polygons = if amount > 0.0 {
            base.union(&band).0
        } else {
            base.difference(&band).0
        };
        self.drop_degenerate();
    }

    /// Copy with `f` applied to every vertex
    pub fn map_points<F: Fn(BoardPoint) -> BoardPoint>(&self, f: F) -> PolySet {
        let polygons = self
            .polygons
            .iter()
            .map(|poly| {
                poly.map_coords(|c| {
                    let p = f(c.into());
                    Coord { x: p.x, y: p.y }
                })
            })
            .collect();
        PolySet { polygons }
    }

    pub fn area(&self) -> f64 {
        self.polygons.iter().map(|p| p.unsigned_area()).sum()
    }

    /// `(min, max)` of all outlines
    pub fn bounds(&self) -> Option<(BoardPoint, BoardPoint)> {
        let rect = MultiPolygon::new(self.polygons.clone()).bounding_rect()?;
        Some((rect.min().into(), rect.max().into()))
    }

    pub fn contains_point(&self, p: BoardPoint) -> bool {
        let pt = geo::Point::new(p.x, p.y);
        self.polygons.iter().any(|poly| poly.contains(&pt))
    }

    /// Triangulate every outline with its holes (earcut); triangles in board units
    pub fn triangulate(&self) -> Vec<[BoardPoint; 3]> {
        let mut triangles = Vec::new();
        for poly in &self.polygons {
            triangulate_polygon(poly, &mut triangles);
        }
        triangles
    }
}

/// Earcut over one outline plus holes, closing points dropped
fn triangulate_polygon(poly: &Polygon<f64>, out: &mut Vec<[BoardPoint; 3]>) {
    let mut flat_coords: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();

    push_ring(poly.exterior(), &mut flat_coords);
    if flat_coords.len() < 6 {
        return;
    }
    for hole in poly.interiors() {
        let start = flat_coords.len() / 2;
        let before = flat_coords.len();
        push_ring(hole, &mut flat_coords);
        if flat_coords.len() - before < 6 {
            flat_coords.truncate(before);
            continue;
        }
        hole_indices.push(start);
    }

    let indices = match earcutr::earcut(&flat_coords, &hole_indices, 2) {
        Ok(indices) => indices,
        Err(e) => {
            log::warn!("earcut failed on a {}-vertex polygon: {:?}", flat_coords.len() / 2, e);
            return;
        }
    };
    let vertex = |i: usize| BoardPoint::new(flat_coords[i * 2], flat_coords[i * 2 + 1]);
    for tri in indices.chunks_exact(3) {
        out.push([vertex(tri[0]), vertex(tri[1]), vertex(tri[2])]);
    }
}

fn push_ring(ring: &LineString<f64>, flat: &mut Vec<f64>) {
    let pts = &ring.0;
    let n = if pts.len() > 1 && pts[0] == pts[pts.len() - 1] { pts.len() - 1 } else { pts.len() };
    for c in &pts[..n] {
        flat.push(c.x);
        flat.push(c.y);
    }
}

/// Balanced pairwise union of possibly overlapping polygons
pub fn union_all(polygons: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut parts: Vec<MultiPolygon<f64>> = polygons
        .into_iter()
        .filter(|p| p.exterior().0.len() >= 4)
        .map(|p| MultiPolygon::new(vec![p]))
        .collect();
    if parts.is_empty() {
        return MultiPolygon::new(vec![]);
    }
    while parts.len() > 1 {
        let mut next = Vec::with_capacity(parts.len() / 2 + 1);
        let mut iter = parts.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        parts = next;
    }
    // A single input is normalized by unioning with nothing
    let single = parts.pop().unwrap_or_else(|| MultiPolygon::new(vec![]));
    single.union(&MultiPolygon::new(vec![]))
}
