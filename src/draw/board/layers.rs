//! Board layer identifiers

use serde::{Deserialize, Serialize};

/// Maximum number of inner copper layers
pub const MAX_INNER_LAYERS: u8 = 30;

/// Board face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PcbLayer {
    FCu,
    /// Inner copper, 1-based
    InCu(u8),
    BCu,
    FAdhes,
    BAdhes,
    FPaste,
    BPaste,
    FSilkS,
    BSilkS,
    FMask,
    BMask,
    DwgsUser,
    CmtsUser,
    Eco1User,
    Eco2User,
    EdgeCuts,
    Margin,
    FCrtYd,
    BCrtYd,
    FFab,
    BFab,
}

/// Non-copper layers that get their own geometry product
pub const TECHNICAL_LAYERS: &[PcbLayer] = &[
    PcbLayer::FAdhes,
    PcbLayer::BAdhes,
    PcbLayer::FPaste,
    PcbLayer::BPaste,
    PcbLayer::FSilkS,
    PcbLayer::BSilkS,
    PcbLayer::FMask,
    PcbLayer::BMask,
    PcbLayer::DwgsUser,
    PcbLayer::CmtsUser,
    PcbLayer::Eco1User,
    PcbLayer::Eco2User,
    PcbLayer::FCrtYd,
    PcbLayer::BCrtYd,
    PcbLayer::FFab,
    PcbLayer::BFab,
];

impl PcbLayer {
    pub fn is_copper(self) -> bool {
        matches!(self, PcbLayer::FCu | PcbLayer::InCu(_) | PcbLayer::BCu)
    }

    pub fn is_mask(self) -> bool {
        matches!(self, PcbLayer::FMask | PcbLayer::BMask)
    }

    pub fn is_paste(self) -> bool {
        matches!(self, PcbLayer::FPaste | PcbLayer::BPaste)
    }

    pub fn is_silk(self) -> bool {
        matches!(self, PcbLayer::FSilkS | PcbLayer::BSilkS)
    }

    /// Face a layer belongs to; `None` for inner and user layers
    pub fn side(self) -> Option<Side> {
        match self {
            PcbLayer::FCu
            | PcbLayer::FAdhes
            | PcbLayer::FPaste
            | PcbLayer::FSilkS
            | PcbLayer::FMask
            | PcbLayer::FCrtYd
            | PcbLayer::FFab => Some(Side::Front),
            PcbLayer::BCu
            | PcbLayer::BAdhes
            | PcbLayer::BPaste
            | PcbLayer::BSilkS
            | PcbLayer::BMask
            | PcbLayer::BCrtYd
            | PcbLayer::BFab => Some(Side::Back),
            _ => None,
        }
    }

    /// Position in the copper stack, 0 = front, `copper_count - 1` = back
    pub fn copper_index(self, copper_count: usize) -> Option<usize> {
        match self {
            PcbLayer::FCu => Some(0),
            PcbLayer::BCu => Some(copper_count.saturating_sub(1)),
            PcbLayer::InCu(n) if (n as usize) < copper_count.saturating_sub(1) => Some(n as usize),
            _ => None,
        }
    }

    /// Copper layer at stack position `index`
    pub fn copper_at(index: usize, copper_count: usize) -> PcbLayer {
        if index == 0 {
            PcbLayer::FCu
        } else if index + 1 >= copper_count {
            PcbLayer::BCu
        } else {
            PcbLayer::InCu(index as u8)
        }
    }

    /// All copper layers front to back
    pub fn copper_layers(copper_count: usize) -> Vec<PcbLayer> {
        let count = copper_count.clamp(2, MAX_INNER_LAYERS as usize + 2);
        (0..count).map(|i| PcbLayer::copper_at(i, count)).collect()
    }

    pub fn copper_of(side: Side) -> PcbLayer {
        match side {
            Side::Front => PcbLayer::FCu,
            Side::Back => PcbLayer::BCu,
        }
    }

    pub fn mask_of(side: Side) -> PcbLayer {
        match side {
            Side::Front => PcbLayer::FMask,
            Side::Back => PcbLayer::BMask,
        }
    }

    pub fn paste_of(side: Side) -> PcbLayer {
        match side {
            Side::Front => PcbLayer::FPaste,
            Side::Back => PcbLayer::BPaste,
        }
    }

    pub fn silk_of(side: Side) -> PcbLayer {
        match side {
            Side::Front => PcbLayer::FSilkS,
            Side::Back => PcbLayer::BSilkS,
        }
    }

    pub fn name(self) -> String {
        match self {
            PcbLayer::FCu => "F.Cu".to_string(),
            PcbLayer::InCu(n) => format!("In{}.Cu", n),
            PcbLayer::BCu => "B.Cu".to_string(),
            PcbLayer::FAdhes => "F.Adhes".to_string(),
            PcbLayer::BAdhes => "B.Adhes".to_string(),
            PcbLayer::FPaste => "F.Paste".to_string(),
            PcbLayer::BPaste => "B.Paste".to_string(),
            PcbLayer::FSilkS => "F.SilkS".to_string(),
            PcbLayer::BSilkS => "B.SilkS".to_string(),
            PcbLayer::FMask => "F.Mask".to_string(),
            PcbLayer::BMask => "B.Mask".to_string(),
            PcbLayer::DwgsUser => "Dwgs.User".to_string(),
            PcbLayer::CmtsUser => "Cmts.User".to_string(),
            PcbLayer::Eco1User => "Eco1.User".to_string(),
            PcbLayer::Eco2User => "Eco2.User".to_string(),
            PcbLayer::EdgeCuts => "Edge.Cuts".to_string(),
            PcbLayer::Margin => "Margin".to_string(),
            PcbLayer::FCrtYd => "F.CrtYd".to_string(),
            PcbLayer::BCrtYd => "B.CrtYd".to_string(),
            PcbLayer::FFab => "F.Fab".to_string(),
            PcbLayer::BFab => "B.Fab".to_string(),
        }
    }
}

impl Side {
    pub fn flipped(self) -> Side {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copper_stack() {
        let layers = PcbLayer::copper_layers(4);
        assert_eq!(layers, vec![PcbLayer::FCu, PcbLayer::InCu(1), PcbLayer::InCu(2), PcbLayer::BCu]);
        assert_eq!(PcbLayer::BCu.copper_index(4), Some(3));
        assert_eq!(PcbLayer::InCu(3).copper_index(4), None);
        assert_eq!(PcbLayer::copper_layers(2), vec![PcbLayer::FCu, PcbLayer::BCu]);
    }

    #[test]
    fn test_sides() {
        assert_eq!(PcbLayer::FMask.side(), Some(Side::Front));
        assert_eq!(PcbLayer::InCu(1).side(), None);
        assert!(PcbLayer::BPaste.is_paste());
        assert_eq!(PcbLayer::FCu.name(), "F.Cu");
    }
}
