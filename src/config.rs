//! Tunable constants for the feed effects, overridable from `localStorage`.

use serde::{Deserialize, Serialize};

use crate::util::{cwarn, storage_get};

pub const CONFIG_STORAGE_KEY: &str = "cm_effects_config";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Target frame rate of the lost-signal static.
    pub fps: f64,
    /// Working buffer size relative to the drawing surface.
    pub buffer_scale: f64,
    /// Smallest working buffer edge, in pixels.
    pub min_buffer: u32,
    pub base_gray: f64,
    pub gray_span: f64,
    pub band_height: u32,
    /// Rows per second the luminance band drifts.
    pub band_speed: f64,
    pub band_boost: u8,
    /// Fraction of buffer pixels turned into white speckles each frame.
    pub speckle_density: f64,
    /// Weight of the previous frame when blending.
    pub persistence: f64,
    pub default_pan_seconds: f64,
    pub default_glitch_min_ms: f64,
    pub default_glitch_max_ms: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            fps: 24.0,
            buffer_scale: 0.28,
            min_buffer: 64,
            base_gray: 100.0,
            gray_span: 70.0,
            band_height: 6,
            band_speed: 20.0,
            band_boost: 10,
            speckle_density: 0.002,
            persistence: 0.85,
            default_pan_seconds: 7.0,
            default_glitch_min_ms: 400.0,
            default_glitch_max_ms: 1200.0,
        }
    }
}

impl EffectsConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Minimum spacing between rendered noise frames.
    pub fn frame_interval_ms(&self) -> f64 {
        if self.fps > 0.0 { 1000.0 / self.fps } else { 1000.0 / 24.0 }
    }

    /// Stored override if present and parsable, defaults otherwise.
    pub fn load() -> Self {
        match storage_get(CONFIG_STORAGE_KEY) {
            Some(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                cwarn(&format!("ignoring stored effects config: {}", e));
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let cfg = EffectsConfig::from_json(r#"{"fps": 12, "band_height": 3}"#).unwrap();
        assert_eq!(cfg.fps, 12.0);
        assert_eq!(cfg.band_height, 3);
        assert_eq!(cfg.persistence, 0.85);
        assert_eq!(cfg.min_buffer, 64);
    }

    #[test]
    fn frame_interval_at_default_rate() {
        let cfg = EffectsConfig::default();
        assert!((cfg.frame_interval_ms() - 41.666).abs() < 0.01);
    }

    #[test]
    fn load_without_storage_is_default() {
        assert_eq!(EffectsConfig::load(), EffectsConfig::default());
    }
}
