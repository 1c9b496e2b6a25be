// Horizontal sweep over the active feed; the display layer animates it with CSS.
use crate::model::{PAUSE_PAN_LABEL, RESUME_PAN_LABEL};

pub const DEFAULT_PAN_SECONDS: f64 = 7.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanAnimation {
    pub duration_s: f64,
    pub paused: bool,
}

impl PanAnimation {
    /// Value for the media element's `animation` property. One iteration of
    /// `cam-pan` sweeps out and back, so the period is `duration_s`.
    pub fn css_animation(&self) -> String {
        format!("cam-pan {}s ease-in-out infinite", self.duration_s)
    }

    pub fn play_state(&self) -> &'static str {
        if self.paused { "paused" } else { "running" }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanController {
    duration_s: Option<f64>,
    paused: bool,
}

impl PanController {
    pub fn enable(&mut self, duration_s: f64) {
        let d = if duration_s.is_finite() && duration_s > 0.0 { duration_s } else { DEFAULT_PAN_SECONDS };
        self.duration_s = Some(d);
    }

    pub fn disable(&mut self) {
        self.duration_s = None;
        self.paused = false;
    }

    pub fn reset(&mut self) {
        self.paused = false;
    }

    /// Returns the new paused state, `None` when no sweep is attached.
    pub fn toggle(&mut self) -> Option<bool> {
        self.duration_s?;
        self.paused = !self.paused;
        Some(self.paused)
    }

    pub fn is_enabled(&self) -> bool {
        self.duration_s.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn label(&self) -> &'static str {
        if self.paused { RESUME_PAN_LABEL } else { PAUSE_PAN_LABEL }
    }

    pub fn animation(&self) -> Option<PanAnimation> {
        self.duration_s.map(|duration_s| PanAnimation { duration_s, paused: self.paused })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_play_state() {
        let mut pan = PanController::default();
        pan.enable(7.0);
        assert_eq!(pan.label(), "PAUSE PAN");
        assert_eq!(pan.toggle(), Some(true));
        assert_eq!(pan.label(), "RESUME PAN");
        assert_eq!(pan.animation().map(|a| a.play_state()), Some("paused"));
        assert_eq!(pan.toggle(), Some(false));
        assert_eq!(pan.animation().map(|a| a.play_state()), Some("running"));
    }

    #[test]
    fn disabled_pan_ignores_toggle() {
        let mut pan = PanController::default();
        assert_eq!(pan.toggle(), None);
        assert!(pan.animation().is_none());
        pan.enable(5.0);
        pan.toggle();
        pan.disable();
        assert!(!pan.is_paused());
        assert!(pan.animation().is_none());
    }

    #[test]
    fn bad_duration_falls_back() {
        let mut pan = PanController::default();
        pan.enable(0.0);
        assert_eq!(pan.animation().map(|a| a.duration_s), Some(DEFAULT_PAN_SECONDS));
        pan.enable(12.5);
        assert_eq!(
            pan.animation().map(|a| a.css_animation()),
            Some("cam-pan 12.5s ease-in-out infinite".to_string())
        );
    }

    #[test]
    fn one_iteration_is_a_full_round_trip() {
        let mut pan = PanController::default();
        pan.enable(7.0);
        let css = pan.animation().map(|a| a.css_animation()).unwrap_or_default();
        assert!(css.starts_with("cam-pan 7s "));
        assert!(css.ends_with(" infinite"));
        assert!(!css.contains("alternate"));
    }
}
