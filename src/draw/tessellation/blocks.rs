//! Polygon sets to grid blocks
//!
//! Large filled regions are cut into a regular grid. Cells no boundary edge
//! reaches become `DummyBlock`s (point test is a bbox test, no segment hits),
//! cells on the boundary carry the polygon clipped to the cell plus only the
//! edges that reach it.

use super::convert::render_contours;
use crate::draw::geometry::{
    contour_edges, point_in_contour, signed_area2, BBox2D, Container2D, ContourEdge, ItemId,
    OutlineWithHoles, Point, Shape2D,
};
use crate::draw::polygon::PolySet;
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon, Rect};
use rstar::{RTree, RTreeObject, AABB};

/// Upper bound on grid divisions per axis
pub const MAX_BLOCK_DIVISIONS: usize = 96;

/// Boundary edge wrapper for the R-tree
struct IndexedEdge {
    edge: ContourEdge,
    bounds: AABB<[f32; 2]>,
}

impl IndexedEdge {
    fn new(edge: ContourEdge) -> Self {
        let min = edge.start.min(edge.end);
        let max = edge.start.max(edge.end);
        Self { edge, bounds: AABB::from_corners([min.x, min.y], [max.x, max.y]) }
    }
}

impl RTreeObject for IndexedEdge {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

/// Grid divisions along x and y for a region of `extent` whose boundary
/// segments have median length `median`
pub fn grid_divisions(extent: Point, median: f32, div_factor: Option<f32>) -> (usize, usize) {
    let factor = match div_factor {
        Some(f) if f > 0.0 && f.is_finite() => f,
        _ => return (1, 1),
    };
    if median <= 0.0 || !median.is_finite() {
        return (1, 1);
    }
    let cell = median * factor;
    let divs = |e: f32| ((e / cell).ceil() as usize).clamp(1, MAX_BLOCK_DIVISIONS);
    (divs(extent.x), divs(extent.y))
}

fn median_length(edges: &[ContourEdge]) -> f32 {
    let mut lengths: Vec<f32> = edges.iter().map(|e| e.start.distance(e.end)).collect();
    if lengths.is_empty() {
        return 0.0;
    }
    lengths.sort_by(|a, b| a.total_cmp(b));
    lengths[lengths.len() / 2]
}

fn to_geo(contour: &OutlineWithHoles) -> Polygon<f64> {
    let ring = |pts: &[Point]| {
        LineString::from(pts.iter().map(|p| Coord { x: p.x as f64, y: p.y as f64 }).collect::<Vec<_>>())
    };
    Polygon::new(ring(&contour.outline), contour.holes.iter().map(|h| ring(h)).collect())
}

fn from_geo(poly: &Polygon<f64>) -> Option<OutlineWithHoles> {
    let ring = |ls: &LineString<f64>| -> Vec<Point> {
        let coords = &ls.0;
        let n = if coords.len() > 1 && coords[0] == coords[coords.len() - 1] { coords.len() - 1 } else { coords.len() };
        coords[..n].iter().map(|c| Point::new(c.x as f32, c.y as f32)).collect()
    };
    let mut outline = ring(poly.exterior());
    if outline.len() < 3 {
        return None;
    }
    if signed_area2(&outline) < 0.0 {
        outline.reverse();
    }
    let holes = poly
        .interiors()
        .iter()
        .map(|h| {
            let mut hole = ring(h);
            if signed_area2(&hole) > 0.0 {
                hole.reverse();
            }
            hole
        })
        .filter(|h| h.len() >= 3)
        .collect();
    Some(OutlineWithHoles { outline, holes })
}

fn inside_contours(contours: &[OutlineWithHoles], p: Point) -> bool {
    contours
        .iter()
        .any(|c| point_in_contour(&c.outline, p) && !c.holes.iter().any(|h| point_in_contour(h, p)))
}

/// Grid-subdivide `polys` and add the resulting blocks to `container`.
/// `div_factor` scales the cell size relative to the median boundary
/// segment length; `None` keeps the whole region as a single cell.
/// Returns the number of shapes added.
pub fn convert_polygon_to_blocks(
    polys: &PolySet,
    container: &mut Container2D,
    biu_to_3d: f64,
    div_factor: Option<f32>,
    source: Option<ItemId>,
) -> usize {
    let contours = render_contours(polys, biu_to_3d);
    if contours.is_empty() {
        return 0;
    }

    let mut edges: Vec<ContourEdge> = Vec::new();
    let mut region = BBox2D::new();
    for contour in &contours {
        edges.extend(contour_edges(&contour.outline));
        for hole in &contour.holes {
            edges.extend(contour_edges(hole));
        }
        for p in &contour.outline {
            region.union_point(*p);
        }
    }
    if edges.is_empty() || !region.is_initialized() {
        return 0;
    }

    let (div_x, div_y) = grid_divisions(region.extent(), median_length(&edges), div_factor);
    log::trace!("polygon blocks: {} edges, {}x{} grid", edges.len(), div_x, div_y);

    let geo_polys = MultiPolygon::new(contours.iter().map(to_geo).collect());
    let tree = RTree::bulk_load(edges.into_iter().map(IndexedEdge::new).collect());

    let min = region.min();
    let step = Point::new(region.extent().x / div_x as f32, region.extent().y / div_y as f32);
    let mut added = 0;

    for iy in 0..div_y {
        for ix in 0..div_x {
            let lo = Point::new(min.x + step.x * ix as f32, min.y + step.y * iy as f32);
            // Last row/column ends exactly on the region edge
            let hi = Point::new(
                if ix + 1 == div_x { region.max().x } else { min.x + step.x * (ix + 1) as f32 },
                if iy + 1 == div_y { region.max().y } else { min.y + step.y * (iy + 1) as f32 },
            );
            let cell = BBox2D::from_corners(lo, hi);

            let envelope = AABB::from_corners([lo.x, lo.y], [hi.x, hi.y]);
            let touching: Vec<ContourEdge> = tree
                .locate_in_envelope_intersecting(&envelope)
                .map(|indexed| indexed.edge)
                .collect();

            if touching.is_empty() {
                if inside_contours(&contours, cell.center()) && container.add_opt(Shape2D::dummy_block(cell, source)) {
                    added += 1;
                }
                continue;
            }

            let cell_rect = Rect::new(
                Coord { x: lo.x as f64, y: lo.y as f64 },
                Coord { x: hi.x as f64, y: hi.y as f64 },
            )
            .to_polygon();
            let clipped = geo_polys.intersection(&MultiPolygon::new(vec![cell_rect]));
            if clipped.0.is_empty() {
                continue;
            }
            let pieces: Vec<OutlineWithHoles> = clipped.0.iter().filter_map(from_geo).collect();
            if container.add_opt(Shape2D::polygon_block(cell, pieces, touching, source)) {
                added += 1;
            }
        }
    }
    added
}
