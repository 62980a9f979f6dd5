//! Filter and mesh configuration value structs
//!
//! Plain serde-derived structs with documented ranges. Out-of-range values
//! are clamped where they are consumed, never rejected.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Hard cap on mesh grid segments per axis
pub const MAX_RESOLUTION: u32 = 1024;
/// Lower bound on the requested grid resolution
pub const MIN_RESOLUTION: u32 = 10;

/// Settings for the image filter pipeline. Immutable per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Invert brightness after grayscale conversion
    pub invert: bool,
    /// Gaussian blur radius in pixels, 0 disables
    pub gaussian_blur_radius: f32,
    /// Disc-masked box blur radius in pixels, 0 disables
    pub uniform_blur_radius: f32,
    /// Cubic Bézier tone curve control points (x1, y1, x2, y2);
    /// endpoints are fixed at (0,0) and (1,1)
    pub tone_curve: [f32; 4],
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            invert: false,
            gaussian_blur_radius: 0.0,
            uniform_blur_radius: 0.0,
            tone_curve: [0.0, 0.0, 1.0, 1.0],
        }
    }
}

/// Settings for both mesh generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    /// Requested grid resolution along the image's shorter side, 10-1024
    pub resolution: u32,
    /// Relief height above the base, output units
    pub extrusion_height: f32,
    /// Flat pedestal height under the relief, output units
    pub base_height: f32,
    /// Physical width of the stamp, output units
    pub width: f32,
    /// Physical height of the stamp, usually `width / aspect_ratio`
    pub height: f32,
    /// Silhouette threshold for the contour generator, 0-255
    pub outline_threshold: u8,
    /// Silhouette margin as a percentage of the image's longer side, 0-100
    pub outline_offset_percent: f32,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            resolution: 100,
            extrusion_height: 10.0,
            base_height: 2.0,
            width: 100.0,
            height: 100.0,
            outline_threshold: 127,
            outline_offset_percent: 0.0,
        }
    }
}

impl MeshSettings {
    /// Resolution clamped into its documented range
    #[inline]
    pub fn clamped_resolution(&self) -> u32 {
        self.resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION)
    }

    /// Offset percentage clamped into [0, 100]
    #[inline]
    pub fn clamped_offset_percent(&self) -> f32 {
        self.outline_offset_percent.clamp(0.0, 100.0)
    }
}

/// One persisted settings document: everything the pipeline consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub mesh: MeshSettings,
}

impl Settings {
    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Settings(e.to_string()))?;
        fs::write(path, json).map_err(|e| Error::Settings(e.to_string()))
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| Error::Settings(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| Error::Settings(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_identity_pipeline() {
        let f = FilterSettings::default();
        assert!(!f.invert);
        assert_eq!(f.gaussian_blur_radius, 0.0);
        assert_eq!(f.uniform_blur_radius, 0.0);
        assert_eq!(f.tone_curve, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_resolution_clamped_to_range() {
        let mut m = MeshSettings::default();
        m.resolution = 2;
        assert_eq!(m.clamped_resolution(), MIN_RESOLUTION);
        m.resolution = 5000;
        assert_eq!(m.clamped_resolution(), MAX_RESOLUTION);
        m.resolution = 256;
        assert_eq!(m.clamped_resolution(), 256);
    }

    #[test]
    fn test_offset_percent_clamped() {
        let mut m = MeshSettings::default();
        m.outline_offset_percent = -3.0;
        assert_eq!(m.clamped_offset_percent(), 0.0);
        m.outline_offset_percent = 150.0;
        assert_eq!(m.clamped_offset_percent(), 100.0);
    }

    #[test]
    fn test_settings_json_round_trip() {
        let mut settings = Settings::default();
        settings.filter.invert = true;
        settings.filter.gaussian_blur_radius = 2.5;
        settings.mesh.outline_threshold = 200;

        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let back: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(back, Settings::default());
    }
}
