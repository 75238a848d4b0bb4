// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::BinarizationMethod;

/// Tuning knobs for the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How the enhanced scan is turned into a binary ridge mask.
    pub binarization: BinarizationMethod,
    /// Apply histogram equalization before binarization.
    pub equalize: bool,
    /// Minutiae closer than this to the image edge are discarded (pixels).
    pub border_margin: u32,
    /// Minimum spacing between two reported minutiae (pixels).
    pub min_minutia_distance: u32,
    /// Cells per side of the square template bit grid.
    pub template_grid: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binarization: BinarizationMethod::default(),
            equalize: true,
            border_margin: 8,
            min_minutia_distance: 6,
            template_grid: 32,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Persist the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_historical_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(
            cfg.binarization,
            BinarizationMethod::Global { threshold: 128 }
        );
        assert!(cfg.equalize);
        assert_eq!(cfg.template_grid, 32);
    }

    #[test]
    fn json_round_trip() {
        let cfg = EngineConfig {
            binarization: BinarizationMethod::Adaptive {
                block_radius: 15,
                c: 10,
            },
            equalize: false,
            border_margin: 12,
            min_minutia_distance: 4,
            template_grid: 16,
        };
        let text = serde_json::to_string(&cfg).expect("serialize");
        let back: EngineConfig = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, cfg);
    }

    #[test]
    fn load_save_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("engine.json");

        let cfg = EngineConfig::default();
        cfg.save(&path).expect("save");
        let back = EngineConfig::load(&path).expect("load");
        assert_eq!(back, cfg);
    }
}
