//! Layer Z placement
//!
//! The board body is centred on Z = 0. Copper layers are spread evenly
//! from the front face to the back face; the front face layers sit on top of
//! F.Cu in the order mask, silkscreen, then everything else, mirrored on the
//! back.

use crate::draw::board::{Board, PcbLayer, Side, MAX_INNER_LAYERS};

/// Thickness given to silkscreen, paste and other technical layers (nm)
pub const TECH_LAYER_THICKNESS: f64 = 10_000.0;

#[derive(Debug, Clone)]
pub struct Stackup {
    biu_to_3d: f64,
    copper_count: usize,
    board_thickness: f64,
    copper_thickness: f64,
    mask_thickness: f64,
}

impl Stackup {
    pub fn new(board: &Board, biu_to_3d: f64) -> Self {
        Self {
            biu_to_3d,
            copper_count: board.copper_layer_count.clamp(2, MAX_INNER_LAYERS as usize + 2),
            board_thickness: board.board_thickness.max(0.0),
            copper_thickness: board.copper_thickness.max(0.0),
            mask_thickness: board.mask_thickness.max(0.0),
        }
    }

    fn to_3d(&self, v: f64) -> f32 {
        (v * self.biu_to_3d) as f32
    }

    /// Distance of a copper layer's centre plane from `side`, board units
    pub fn copper_depth(&self, layer: PcbLayer, side: Side) -> Option<f64> {
        let index = layer.copper_index(self.copper_count)?;
        let pitch = self.board_thickness / (self.copper_count - 1) as f64;
        let from_front = index as f64 * pitch;
        Some(match side {
            Side::Front => from_front,
            Side::Back => self.board_thickness - from_front,
        })
    }

    /// Board body between the outer copper faces
    pub fn body_z_range(&self) -> (f32, f32) {
        let half = self.board_thickness / 2.0;
        (self.to_3d(-half), self.to_3d(half))
    }

    /// `(z_bottom, z_top)` of `layer` in 3D units
    pub fn layer_z_range(&self, layer: PcbLayer) -> (f32, f32) {
        let half = self.board_thickness / 2.0;
        let cu = self.copper_thickness;
        let (bottom, top) = if layer.is_copper() {
            match layer {
                PcbLayer::FCu => (half, half + cu),
                PcbLayer::BCu => (-half - cu, -half),
                _ => {
                    let depth = self.copper_depth(layer, Side::Front).unwrap_or(half);
                    let z = half - depth;
                    (z - cu / 2.0, z + cu / 2.0)
                }
            }
        } else {
            let face = half + cu;
            let (start, thickness) = if layer.is_mask() {
                (face, self.mask_thickness)
            } else if layer.is_silk() {
                (face + self.mask_thickness, TECH_LAYER_THICKNESS)
            } else if layer.is_paste() {
                (face, TECH_LAYER_THICKNESS)
            } else {
                (face + self.mask_thickness + TECH_LAYER_THICKNESS, TECH_LAYER_THICKNESS)
            };
            match layer.side() {
                Some(Side::Back) => (-start - thickness, -start),
                _ => (start, start + thickness),
            }
        };
        (self.to_3d(bottom), self.to_3d(top))
    }
}
