//! Render settings

use crate::draw::board::PcbLayer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Board units to 3D units (nm to mm by default)
    pub biu_to_3d_units: f64,
    /// Build per-layer polygon sets for side walls
    pub show_copper_thickness: bool,
    pub subtract_mask_from_silk: bool,
    /// Clip silkscreen on the via pads instead of the via holes
    pub clip_silk_on_via_annulus: bool,
    pub clip_silk_on_board_outline: bool,
    /// Split copper exposed by the solder mask into its own product
    pub differentiate_plated_copper: bool,
    pub show_zones: bool,
    /// Explicit layer list; `None` builds every layer the board has
    pub enabled_layers: Option<Vec<PcbLayer>>,
    /// Grid block factor for zone query containers; `None` skips them
    pub zone_block_div_factor: Option<f32>,
    /// Override for the worker pool size
    pub worker_threads: Option<usize>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            biu_to_3d_units: 1.0e-6,
            show_copper_thickness: true,
            subtract_mask_from_silk: true,
            clip_silk_on_via_annulus: false,
            clip_silk_on_board_outline: true,
            differentiate_plated_copper: false,
            show_zones: true,
            enabled_layers: None,
            zone_block_div_factor: None,
            worker_threads: None,
        }
    }
}

impl RenderSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse render settings")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read render settings from {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("In {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize render settings")
    }

    pub fn is_layer_enabled(&self, layer: PcbLayer) -> bool {
        self.enabled_layers.as_ref().map_or(true, |layers| layers.contains(&layer))
    }

    /// Pool size for `work_items` items: available parallelism (at least two),
    /// capped at the number of items
    pub fn worker_count(&self, work_items: usize) -> usize {
        let pool = self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).max(2)
        });
        pool.max(1).min(work_items.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = RenderSettings::from_json_str(r#"{ "show_copper_thickness": false, "worker_threads": 3 }"#).unwrap();
        assert!(!s.show_copper_thickness);
        assert_eq!(s.worker_threads, Some(3));
        assert_eq!(s.biu_to_3d_units, 1.0e-6);
        assert!(s.show_zones);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = RenderSettings::from_json_str("{ not json").unwrap_err();
        assert!(err.to_string().contains("render settings"));
        assert!(RenderSettings::from_json_file("/nonexistent/settings.json").is_err());
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut s = RenderSettings::default();
        s.enabled_layers = Some(vec![PcbLayer::FCu, PcbLayer::InCu(2)]);
        let back = RenderSettings::from_json_str(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
        assert!(back.is_layer_enabled(PcbLayer::InCu(2)));
        assert!(!back.is_layer_enabled(PcbLayer::BCu));
    }

    #[test]
    fn test_worker_count() {
        let s = RenderSettings { worker_threads: Some(8), ..Default::default() };
        assert_eq!(s.worker_count(3), 3);
        assert_eq!(s.worker_count(100), 8);
        assert_eq!(s.worker_count(0), 1);
        assert!(RenderSettings::default().worker_count(100) >= 2);
    }
}
