//! Board items consumed by the shape extraction layer
//!
//! All lengths are board internal units (nanometres), angles in degrees.

use super::layers::{PcbLayer, Side};
use crate::draw::polygon::{BoardPoint, PolySet};
use crate::draw::tessellation::LineStyle;

#[derive(Debug, Clone)]
pub struct Track {
    pub start: BoardPoint,
    pub end: BoardPoint,
    pub width: f64,
    pub layer: PcbLayer,
}

/// Arc track through three points
#[derive(Debug, Clone)]
pub struct ArcTrack {
    pub start: BoardPoint,
    pub mid: BoardPoint,
    pub end: BoardPoint,
    pub width: f64,
    pub layer: PcbLayer,
}

impl ArcTrack {
    /// Circumcenter of start/mid/end; `None` when the points are collinear
    pub fn center(&self) -> Option<BoardPoint> {
        let (a, b, c) = (self.start, self.mid, self.end);
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < f64::EPSILON {
            return None;
        }
        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;
        Some(BoardPoint::new(
            (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        ))
    }

    /// Signed sweep from start to end passing through mid
    pub fn angle_deg(&self) -> Option<f64> {
        let center = self.center()?;
        let angle_of = |p: BoardPoint| (p.y - center.y).atan2(p.x - center.x);
        let start = angle_of(self.start);
        let norm = |a: f64| a.rem_euclid(std::f64::consts::TAU);
        let to_mid = norm(angle_of(self.mid) - start);
        let to_end = norm(angle_of(self.end) - start);
        let sweep = if to_mid <= to_end { to_end } else { to_end - std::f64::consts::TAU };
        Some(sweep.to_degrees())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViaKind {
    Through,
    BlindBuried,
    Micro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PostMachiningKind {
    Counterbore,
    Countersink,
}

/// Counterbore or countersink from one face
#[derive(Debug, Clone)]
pub struct PostMachining {
    pub kind: PostMachiningKind,
    pub diameter: f64,
    pub depth: f64,
    /// Countersink included angle
    pub angle_deg: f64,
}

/// A secondary drill from `start` face through `end_layer` inclusive
#[derive(Debug, Clone)]
pub struct Backdrill {
    pub diameter: f64,
    pub start: Side,
    pub end_layer: PcbLayer,
}

/// Drill features shared by vias and pads
#[derive(Debug, Clone, Default)]
pub struct DrillMachining {
    pub front: Option<PostMachining>,
    pub back: Option<PostMachining>,
    pub backdrill: Option<Backdrill>,
    pub tertiary: Option<Backdrill>,
}

impl DrillMachining {
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none() && self.backdrill.is_none() && self.tertiary.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Via {
    pub position: BoardPoint,
    /// Annular pad diameter
    pub width: f64,
    pub drill: f64,
    pub kind: ViaKind,
    pub top: PcbLayer,
    pub bottom: PcbLayer,
    pub tented_front: bool,
    pub tented_back: bool,
    pub machining: DrillMachining,
}

impl Via {
    /// Copper layers the via spans, front to back
    pub fn span(&self, copper_count: usize) -> Vec<PcbLayer> {
        match self.kind {
            ViaKind::Through => PcbLayer::copper_layers(copper_count),
            _ => {
                let (a, b) = match (self.top.copper_index(copper_count), self.bottom.copper_index(copper_count)) {
                    (Some(a), Some(b)) => (a.min(b), a.max(b)),
                    _ => return Vec::new(),
                };
                (a..=b).map(|i| PcbLayer::copper_at(i, copper_count)).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadAnchor {
    Circle,
    Rect,
}

#[derive(Debug, Clone)]
pub enum PadShape {
    Circle,
    Rect,
    Oval,
    /// `delta` narrows one pair of opposite sides
    Trapezoid { delta: (f64, f64) },
    RoundRect { radius_ratio: f64 },
    ChamferedRect { chamfer_ratio: f64 },
    /// Primitives relative to the pad position, before rotation
    Custom { anchor: PadAnchor, primitives: PolySet },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillShape {
    Circle,
    Oblong,
}

#[derive(Debug, Clone)]
pub struct PadDrill {
    pub size: (f64, f64),
    pub shape: DrillShape,
    pub plated: bool,
}

#[derive(Debug, Clone)]
pub struct Pad {
    pub position: BoardPoint,
    pub size: (f64, f64),
    pub shape: PadShape,
    pub orientation_deg: f64,
    pub layers: Vec<PcbLayer>,
    pub drill: Option<PadDrill>,
    pub solder_mask_margin: f64,
    pub paste_margin: f64,
    /// Fraction of the pad size added to the paste margin per axis
    pub paste_margin_ratio: f64,
    pub machining: DrillMachining,
}

impl Pad {
    /// Mask expansion, isotropic
    pub fn mask_clearance(&self) -> (f64, f64) {
        (self.solder_mask_margin, self.solder_mask_margin)
    }

    /// Paste clearance per axis; negative shrinks the paste
    pub fn paste_clearance(&self) -> (f64, f64) {
        (
            self.paste_margin + self.paste_margin_ratio * self.size.0,
            self.paste_margin + self.paste_margin_ratio * self.size.1,
        )
    }

    pub fn is_plated_through(&self) -> bool {
        self.drill.as_ref().map_or(false, |d| d.plated)
    }
}

/// Zone with its precomputed fill per layer
#[derive(Debug, Clone, Default)]
pub struct Zone {
    pub fills: Vec<(PcbLayer, PolySet)>,
}

#[derive(Debug, Clone)]
pub enum GraphicKind {
    Segment { start: BoardPoint, end: BoardPoint },
    Rect { start: BoardPoint, end: BoardPoint },
    Circle { center: BoardPoint, radius: f64 },
    Arc { center: BoardPoint, start: BoardPoint, angle_deg: f64 },
    Polygon(PolySet),
    Bezier { points: [BoardPoint; 4] },
}

#[derive(Debug, Clone)]
pub struct GraphicShape {
    pub kind: GraphicKind,
    pub layer: PcbLayer,
    pub width: f64,
    pub filled: bool,
    pub line_style: LineStyle,
    pub solder_mask_margin: f64,
}

/// Text already laid out by the font engine: stroke polylines for stroke
/// fonts, triangles for outline fonts
#[derive(Debug, Clone)]
pub struct Text {
    pub layer: PcbLayer,
    pub strokes: Vec<Vec<BoardPoint>>,
    pub fills: Vec<[BoardPoint; 3]>,
    pub pen_width: f64,
    pub knockout: bool,
    pub knockout_margin: f64,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct TextBox {
    pub text: Text,
    pub corners: [BoardPoint; 4],
    pub border_width: f64,
    pub border_style: LineStyle,
    pub border: bool,
    pub filled: bool,
}

#[derive(Debug, Clone)]
pub struct Dimension {
    pub layer: PcbLayer,
    pub text: Text,
    pub lines: Vec<(BoardPoint, BoardPoint)>,
    pub circles: Vec<(BoardPoint, f64)>,
    pub line_width: f64,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub layer: PcbLayer,
    pub cells: Vec<TextBox>,
    pub grid_lines: Vec<(BoardPoint, BoardPoint)>,
    pub border_width: f64,
    pub border_style: LineStyle,
}

/// 1D/2D barcode already expanded into module polygons
#[derive(Debug, Clone)]
pub struct Barcode {
    pub layer: PcbLayer,
    pub modules: PolySet,
    pub knockout: bool,
    pub margin: f64,
}

#[derive(Debug, Clone)]
pub enum BoardItem {
    Track(Track),
    ArcTrack(ArcTrack),
    Via(Via),
    Pad(Pad),
    Zone(Zone),
    Graphic(GraphicShape),
    Text(Text),
    TextBox(TextBox),
    Dimension(Dimension),
    Table(Table),
    Barcode(Barcode),
}

impl BoardItem {
    pub fn kind_name(&self) -> &'static str {
        match self {
            BoardItem::Track(_) => "track",
            BoardItem::ArcTrack(_) => "arc",
            BoardItem::Via(_) => "via",
            BoardItem::Pad(_) => "pad",
            BoardItem::Zone(_) => "zone",
            BoardItem::Graphic(_) => "graphic",
            BoardItem::Text(_) => "text",
            BoardItem::TextBox(_) => "textbox",
            BoardItem::Dimension(_) => "dimension",
            BoardItem::Table(_) => "table",
            BoardItem::Barcode(_) => "barcode",
        }
    }

    /// Layers the item draws on. Vias report their copper span.
    pub fn layers(&self, copper_count: usize) -> Vec<PcbLayer> {
        match self {
            BoardItem::Track(t) => vec![t.layer],
            BoardItem::ArcTrack(a) => vec![a.layer],
            BoardItem::Via(v) => v.span(copper_count),
            BoardItem::Pad(p) => p.layers.clone(),
            BoardItem::Zone(z) => z.fills.iter().map(|(layer, _)| *layer).collect(),
            BoardItem::Graphic(g) => vec![g.layer],
            BoardItem::Text(t) => vec![t.layer],
            BoardItem::TextBox(t) => vec![t.text.layer],
            BoardItem::Dimension(d) => vec![d.layer],
            BoardItem::Table(t) => vec![t.layer],
            BoardItem::Barcode(b) => vec![b.layer],
        }
    }

    pub fn is_on_layer(&self, layer: PcbLayer, copper_count: usize) -> bool {
        self.layers(copper_count).contains(&layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_center_and_sweep() {
        let arc = ArcTrack {
            start: BoardPoint::new(10.0, 0.0),
            mid: BoardPoint::new(0.0, 10.0),
            end: BoardPoint::new(-10.0, 0.0),
            width: 1.0,
            layer: PcbLayer::FCu,
        };
        let c = arc.center().unwrap();
        assert!(c.x.abs() < 1e-9 && c.y.abs() < 1e-9);
        assert!((arc.angle_deg().unwrap() - 180.0).abs() < 1e-9);

        let reversed = ArcTrack { start: arc.end, end: arc.start, ..arc.clone() };
        assert!((reversed.angle_deg().unwrap() + 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_arc_has_no_center() {
        let arc = ArcTrack {
            start: BoardPoint::new(0.0, 0.0),
            mid: BoardPoint::new(5.0, 0.0),
            end: BoardPoint::new(10.0, 0.0),
            width: 1.0,
            layer: PcbLayer::FCu,
        };
        assert!(arc.center().is_none());
    }

    #[test]
    fn test_blind_via_span() {
        let via = Via {
            position: BoardPoint::default(),
            width: 600_000.0,
            drill: 300_000.0,
            kind: ViaKind::BlindBuried,
            top: PcbLayer::FCu,
            bottom: PcbLayer::InCu(2),
            tented_front: false,
            tented_back: false,
            machining: DrillMachining::default(),
        };
        assert_eq!(via.span(6), vec![PcbLayer::FCu, PcbLayer::InCu(1), PcbLayer::InCu(2)]);
        let through = Via { kind: ViaKind::Through, ..via };
        assert_eq!(through.span(4).len(), 4);
    }

    #[test]
    fn test_paste_clearance_anisotropic() {
        let pad = Pad {
            position: BoardPoint::default(),
            size: (1000.0, 500.0),
            shape: PadShape::Rect,
            orientation_deg: 0.0,
            layers: vec![PcbLayer::FCu, PcbLayer::FPaste],
            drill: None,
            solder_mask_margin: 50.0,
            paste_margin: -10.0,
            paste_margin_ratio: -0.1,
            machining: DrillMachining::default(),
        };
        let (cx, cy) = pad.paste_clearance();
        assert!((cx + 110.0).abs() < 1e-9);
        assert!((cy + 60.0).abs() < 1e-9);
        assert_eq!(pad.mask_clearance(), (50.0, 50.0));
    }
}
