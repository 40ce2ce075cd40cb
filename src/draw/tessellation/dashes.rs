//! Dashed and dotted line styles
//!
//! Strokes are cut into "on" runs that the caller renders as round
//! segments. Dots are runs a fifth of the line width long, so their round
//! caps make them look like dots.

use crate::draw::polygon::BoardPoint;
use serde::{Deserialize, Serialize};

/// Dash length in line widths, before round-cap correction
pub const DASH_LENGTH_RATIO: f64 = 12.0;
/// Gap length in line widths, before round-cap correction
pub const GAP_LENGTH_RATIO: f64 = 3.0;
/// Dot length in line widths
pub const DOT_LENGTH_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
}

impl LineStyle {
    pub fn is_solid(self) -> bool {
        self == LineStyle::Solid
    }
}

/// Alternating on/off lengths for `style`; empty for solid lines.
/// Round caps add half a width at each end of every "on" run, so dashes are
/// shortened and gaps lengthened by one width.
pub fn dash_pattern(style: LineStyle, width: f64) -> Vec<f64> {
    let width = width.max(1.0);
    let dash = (DASH_LENGTH_RATIO - 1.0).max(1.0) * width;
    let gap = (GAP_LENGTH_RATIO + 1.0).max(1.0) * width;
    let dot = DOT_LENGTH_RATIO * width;
    match style {
        LineStyle::Solid => Vec::new(),
        LineStyle::Dash => vec![dash, gap],
        LineStyle::Dot => vec![dot, gap],
        LineStyle::DashDot => vec![dash, gap, dot, gap],
        LineStyle::DashDotDot => vec![dash, gap, dot, gap, dot, gap],
    }
}

/// Pattern cursor carried across consecutive segments of one stroke
struct DashCursor<'a> {
    pattern: &'a [f64],
    index: usize,
    remaining: f64,
}

impl<'a> DashCursor<'a> {
    fn new(pattern: &'a [f64]) -> Self {
        Self { pattern, index: 0, remaining: pattern.first().copied().unwrap_or(0.0) }
    }

    fn is_on(&self) -> bool {
        self.index % 2 == 0
    }

    fn advance(&mut self) {
        self.index = (self.index + 1) % self.pattern.len();
        self.remaining = self.pattern[self.index];
    }
}

fn lerp(a: BoardPoint, b: BoardPoint, t: f64) -> BoardPoint {
    BoardPoint::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Cut the polyline `points` into "on" runs of `style`, calling `emit` with
/// the start and end of each straight run. Solid strokes emit every
/// segment unchanged. Runs that cross a vertex are split at the vertex.
pub fn stroke_polyline<F>(points: &[BoardPoint], closed: bool, style: LineStyle, width: f64, mut emit: F)
where
    F: FnMut(BoardPoint, BoardPoint),
{
    let n = points.len();
    if n < 2 {
        return;
    }
    let segment_count = if closed { n } else { n - 1 };
    let pattern = dash_pattern(style, width);
    if pattern.is_empty() {
        for i in 0..segment_count {
            emit(points[i], points[(i + 1) % n]);
        }
        return;
    }

    let mut cursor = DashCursor::new(&pattern);
    for i in 0..segment_count {
        let a = points[i];
        let b = points[(i + 1) % n];
        let length = a.distance(b);
        if length <= 0.0 {
            continue;
        }
        let mut pos = 0.0;
        while pos < length {
            let step = cursor.remaining.min(length - pos);
            if cursor.is_on() {
                emit(lerp(a, b, pos / length), lerp(a, b, (pos + step) / length));
            }
            pos += step;
            cursor.remaining -= step;
            if cursor.remaining <= f64::EPSILON * length {
                cursor.advance();
            }
        }
    }
}

/// Dashed single segment
pub fn stroke_segment<F>(a: BoardPoint, b: BoardPoint, style: LineStyle, width: f64, emit: F)
where
    F: FnMut(BoardPoint, BoardPoint),
{
    stroke_polyline(&[a, b], false, style, width, emit);
}
