//! Graphic shapes, text, text boxes, dimensions, tables and barcodes

use super::context::ShapeContext;
use super::primitives::{shapes_to_polyset, BoardShape};
use crate::draw::board::{Barcode, Dimension, GlyphSink, GraphicKind, GraphicShape, Table, Text, TextBox};
use crate::draw::polygon::{arc_points, circle_contour, BoardPoint, PolySet};
use crate::draw::tessellation::{stroke_polyline, LineStyle};

/// Upper bound on chords for one bezier curve
const MAX_BEZIER_SEGMENTS: usize = 64;

/// Round segments along a (possibly dashed) polyline
fn stroke(points: &[BoardPoint], closed: bool, style: LineStyle, width: f64, out: &mut Vec<BoardShape>) {
    if width <= 0.0 {
        return;
    }
    stroke_polyline(points, closed, style, width, |a, b| out.push(BoardShape::segment(a, b, width)));
}

fn rect_points(start: BoardPoint, end: BoardPoint) -> [BoardPoint; 4] {
    [start, BoardPoint::new(end.x, start.y), end, BoardPoint::new(start.x, end.y)]
}

/// Filled polygon grown by `grow` (half the outline width plus margin)
fn filled(mut polys: PolySet, grow: f64, max_error: f64) -> Option<BoardShape> {
    polys.simplify();
    if grow != 0.0 {
        polys.inflate(grow, max_error);
    }
    (!polys.is_empty()).then_some(BoardShape::Polygon(polys))
}

/// Flattened cubic bezier, endpoints included
pub fn bezier_points(p: &[BoardPoint; 4], max_error: f64) -> Vec<BoardPoint> {
    let hull: f64 = p.windows(2).map(|w| w[0].distance(w[1])).sum();
    let n = ((hull / max_error.max(1.0)).sqrt().ceil() as usize).clamp(2, MAX_BEZIER_SEGMENTS);
    (0..=n)
        .map(|i| {
            let t = i as f64 / n as f64;
            let u = 1.0 - t;
            let (b0, b1, b2, b3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
            BoardPoint::new(
                b0 * p[0].x + b1 * p[1].x + b2 * p[2].x + b3 * p[3].x,
                b0 * p[0].y + b1 * p[1].y + b2 * p[2].y + b3 * p[3].y,
            )
        })
        .collect()
}

/// Shapes of a graphic item, widened by `margin` on every side
pub fn graphic_shapes(g: &GraphicShape, margin: f64, max_error: f64) -> Vec<BoardShape> {
    let width = if g.width > 0.0 { g.width + 2.0 * margin } else { 0.0 };
    let mut out = Vec::new();
    match &g.kind {
        GraphicKind::Segment { start, end } => {
            stroke(&[*start, *end], false, g.line_style, width, &mut out);
        }
        GraphicKind::Rect { start, end } => {
            let corners = rect_points(*start, *end);
            if g.filled {
                let mut polys = PolySet::new();
                polys.add_outline(&corners);
                out.extend(filled(polys, g.width.max(0.0) / 2.0 + margin, max_error));
            } else {
                stroke(&corners, true, g.line_style, width, &mut out);
            }
        }
        GraphicKind::Circle { center, radius } => {
            let half = width / 2.0;
            if g.filled {
                let r = radius + g.width.max(0.0) / 2.0 + margin;
                if r > 0.0 {
                    out.push(BoardShape::Circle { center: *center, radius: r });
                }
            } else if g.line_style.is_solid() {
                if half > 0.0 {
                    out.push(BoardShape::ring(*center, radius - half, radius + half));
                }
            } else {
                stroke(&circle_contour(*center, *radius, max_error), true, g.line_style, width, &mut out);
            }
        }
        GraphicKind::Arc { center, start, angle_deg } => {
            stroke(&arc_points(*center, *start, *angle_deg, max_error), false, g.line_style, width, &mut out);
        }
        GraphicKind::Polygon(polys) => {
            if g.filled {
                out.extend(filled(polys.clone(), g.width.max(0.0) / 2.0 + margin, max_error));
            } else {
                for poly in polys.polygons() {
                    let rings = std::iter::once(poly.exterior()).chain(poly.interiors().iter());
                    for ring in rings {
                        let pts: Vec<BoardPoint> = ring.0.iter().map(|c| (*c).into()).collect();
                        stroke(&pts, false, g.line_style, width, &mut out);
                    }
                }
            }
        }
        GraphicKind::Bezier { points } => {
            stroke(&bezier_points(points, max_error), false, g.line_style, width, &mut out);
        }
    }
    out
}

/// Collects glyph callbacks as shapes
struct ShapeSink<'a> {
    pen_width: f64,
    out: &'a mut Vec<BoardShape>,
}

impl GlyphSink for ShapeSink<'_> {
    fn stroke(&mut self, a: BoardPoint, b: BoardPoint) {
        if self.pen_width > 0.0 {
            self.out.push(BoardShape::segment(a, b, self.pen_width));
        }
    }

    fn triangle(&mut self, a: BoardPoint, b: BoardPoint, c: BoardPoint) {
        self.out.push(BoardShape::Triangle([a, b, c]));
    }
}

/// Glyph shapes, or the knockout box with the glyphs cut out
pub fn text_shapes(text: &Text, ctx: &ShapeContext) -> Vec<BoardShape> {
    if !text.visible {
        return Vec::new();
    }
    let mut glyphs = Vec::new();
    ctx.font.draw_text(text, &mut ShapeSink { pen_width: text.pen_width, out: &mut glyphs });
    if !text.knockout {
        return glyphs;
    }

    let outline = shapes_to_polyset(&glyphs, ctx.max_error);
    knockout(&outline, text.knockout_margin).into_iter().collect()
}

/// Margin-grown bounding box minus `outline`
fn knockout(outline: &PolySet, margin: f64) -> Option<BoardShape> {
    let (min, max) = outline.bounds()?;
    let mut body = PolySet::new();
    body.add_outline(&rect_points(
        BoardPoint::new(min.x - margin, min.y - margin),
        BoardPoint::new(max.x + margin, max.y + margin),
    ));
    body.boolean_subtract(outline);
    (!body.is_empty()).then_some(BoardShape::Polygon(body))
}

pub fn textbox_shapes(tb: &TextBox, ctx: &ShapeContext) -> Vec<BoardShape> {
    let mut out = Vec::new();
    if tb.filled {
        out.push(BoardShape::Quad(tb.corners));
    }
    if tb.border {
        stroke(&tb.corners, true, tb.border_style, tb.border_width, &mut out);
    }
    out.extend(text_shapes(&tb.text, ctx));
    out
}

pub fn dimension_shapes(dim: &Dimension, ctx: &ShapeContext) -> Vec<BoardShape> {
    let mut out = Vec::new();
    for (a, b) in &dim.lines {
        stroke(&[*a, *b], false, LineStyle::Solid, dim.line_width, &mut out);
    }
    let half = dim.line_width / 2.0;
    for (center, radius) in &dim.circles {
        if half > 0.0 {
            out.push(BoardShape::ring(*center, radius - half, radius + half));
        }
    }
    out.extend(text_shapes(&dim.text, ctx));
    out
}

pub fn table_shapes(table: &Table, ctx: &ShapeContext) -> Vec<BoardShape> {
    let mut out = Vec::new();
    for (a, b) in &table.grid_lines {
        stroke(&[*a, *b], false, table.border_style, table.border_width, &mut out);
    }
    for cell in &table.cells {
        out.extend(textbox_shapes(cell, ctx));
    }
    out
}

pub fn barcode_shapes(barcode: &Barcode) -> Vec<BoardShape> {
    if barcode.modules.is_empty() {
        return Vec::new();
    }
    if barcode.knockout {
        let mut modules = barcode.modules.clone();
        modules.simplify();
        return knockout(&modules, barcode.margin).into_iter().collect();
    }
    vec![BoardShape::Polygon(barcode.modules.clone())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::board::{LaidOutText, PcbLayer};

    fn graphic(kind: GraphicKind, filled: bool, style: LineStyle) -> GraphicShape {
        GraphicShape { kind, layer: PcbLayer::FSilkS, width: 100_000.0, filled, line_style: style, solder_mask_margin: 0.0 }
    }

    fn text(knockout: bool) -> Text {
        Text {
            layer: PcbLayer::FSilkS,
            strokes: vec![vec![BoardPoint::new(0.0, 0.0), BoardPoint::new(1.0e6, 0.0)]],
            fills: Vec::new(),
            pen_width: 100_000.0,
            knockout,
            knockout_margin: 200_000.0,
            visible: true,
        }
    }

    #[test]
    fn test_circle_modes() {
        let center = BoardPoint::new(0.0, 0.0);
        let kind = GraphicKind::Circle { center, radius: 1.0e6 };
        let ring = graphic_shapes(&graphic(kind.clone(), false, LineStyle::Solid), 0.0, 5_000.0);
        assert!(matches!(ring[0], BoardShape::Ring { inner, outer, .. } if inner == 0.95e6 && outer == 1.05e6));
        let disc = graphic_shapes(&graphic(kind.clone(), true, LineStyle::Solid), 0.0, 5_000.0);
        assert!(matches!(disc[0], BoardShape::Circle { radius, .. } if radius == 1.05e6));
        let dashed = graphic_shapes(&graphic(kind, false, LineStyle::Dash), 0.0, 5_000.0);
        assert!(dashed.len() > 2);
        assert!(dashed.iter().all(|s| matches!(s, BoardShape::Segment { .. } | BoardShape::Circle { .. })));
    }

    #[test]
    fn test_rect_outline_is_four_segments() {
        let kind = GraphicKind::Rect { start: BoardPoint::new(0.0, 0.0), end: BoardPoint::new(2.0e6, 1.0e6) };
        let shapes = graphic_shapes(&graphic(kind.clone(), false, LineStyle::Solid), 0.0, 5_000.0);
        assert_eq!(shapes.len(), 4);
        let filled_rect = graphic_shapes(&graphic(kind, true, LineStyle::Solid), 0.0, 5_000.0);
        assert!(matches!(filled_rect[0], BoardShape::Polygon(_)));
    }

    #[test]
    fn test_mask_margin_widens_strokes() {
        let kind = GraphicKind::Segment { start: BoardPoint::new(0.0, 0.0), end: BoardPoint::new(1.0e6, 0.0) };
        let shapes = graphic_shapes(&graphic(kind, false, LineStyle::Solid), 25_000.0, 5_000.0);
        assert!(matches!(shapes[0], BoardShape::Segment { width, .. } if width == 150_000.0));
    }

    #[test]
    fn test_bezier_endpoints() {
        let p = [
            BoardPoint::new(0.0, 0.0),
            BoardPoint::new(1.0e6, 1.0e6),
            BoardPoint::new(2.0e6, 1.0e6),
            BoardPoint::new(3.0e6, 0.0),
        ];
        let pts = bezier_points(&p, 5_000.0);
        assert_eq!(pts[0], p[0]);
        assert!(pts[pts.len() - 1].distance(p[3]) < 1e-6);
        assert!(pts.len() <= MAX_BEZIER_SEGMENTS + 1);
    }

    #[test]
    fn test_text_and_knockout() {
        let ctx = ShapeContext { max_error: 5_000.0, copper_count: 2, font: &LaidOutText };
        let plain = text_shapes(&text(false), &ctx);
        assert_eq!(plain.len(), 1);

        let knocked = text_shapes(&text(true), &ctx);
        assert_eq!(knocked.len(), 1);
        let BoardShape::Polygon(polys) = &knocked[0] else { panic!("expected polygon") };
        // Stroke is cut out of the box
        assert!(!polys.contains_point(BoardPoint::new(0.5e6, 0.0)));
        assert!(polys.contains_point(BoardPoint::new(0.5e6, 200_000.0)));
    }

    #[test]
    fn test_hidden_text() {
        let ctx = ShapeContext { max_error: 5_000.0, copper_count: 2, font: &LaidOutText };
        let hidden = Text { visible: false, ..text(false) };
        assert!(text_shapes(&hidden, &ctx).is_empty());
    }
}
