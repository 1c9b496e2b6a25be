//! Core data models for the camera matrix.
//! Camera records are immutable once loaded; the registry groups them into sections.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use yew::Reducible;

use crate::util::cwarn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraStatus {
    Online,
    Flicker,
    Interference,
    LostSignal,
    Offline,
}

impl CameraStatus {
    /// Case-insensitive; spaces and dashes count as underscores. Anything unknown is offline.
    pub fn parse(raw: &str) -> Self {
        let norm: String = raw
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_uppercase() })
            .collect();
        match norm.as_str() {
            "ONLINE" => Self::Online,
            "FLICKER" => Self::Flicker,
            "INTERFERENCE" => Self::Interference,
            "LOST_SIGNAL" => Self::LostSignal,
            _ => Self::Offline,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Flicker => "FLICKER",
            Self::Interference => "INTERFERENCE",
            Self::LostSignal => "LOST SIGNAL",
            Self::Offline => "OFFLINE",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Online => "status-online",
            Self::Flicker => "status-flicker",
            Self::Interference => "status-interference",
            Self::LostSignal => "status-lost",
            Self::Offline => "status-offline",
        }
    }

    pub fn schedules_glitches(self) -> bool {
        matches!(self, Self::Flicker | Self::Interference | Self::LostSignal)
    }

    pub fn presents_noise(self) -> bool {
        matches!(self, Self::LostSignal)
    }
}

/// Randomized glitch delay range in milliseconds, always `0 <= min_ms <= max_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlitchBounds {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl GlitchBounds {
    pub fn new(min_ms: f64, max_ms: f64) -> Self {
        let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let (a, b) = (clean(min_ms), clean(max_ms));
        if a <= b {
            Self { min_ms: a, max_ms: b }
        } else {
            Self { min_ms: b, max_ms: a }
        }
    }
}

impl Default for GlitchBounds {
    fn default() -> Self {
        Self::new(400.0, 1200.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub section: String,
    pub location: String,
    pub status: CameraStatus,
    pub distance: String,
    pub hud_text: String,
    /// Empty when the camera has no media.
    pub media_url: String,
    pub pan_enabled: bool,
    /// Full sweep period in seconds; positive.
    pub pan_duration: f64,
    pub glitch: GlitchBounds,
}

impl Camera {
    /// Overlay text: configured HUD text followed by the uppercased id.
    pub fn hud_line(&self) -> String {
        let id = self.id.to_uppercase();
        let hud = self.hud_text.trim();
        if hud.is_empty() { id } else { format!("{} // {}", hud, id) }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section<'a> {
    pub label: &'a str,
    pub cameras: Vec<&'a Camera>,
}

/// Cameras in load order with lookup by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraRegistry {
    cameras: Vec<Camera>,
    index: HashMap<String, usize>,
}

impl CameraRegistry {
    /// Later records reusing an id are dropped.
    pub fn new(cameras: impl IntoIterator<Item = Camera>) -> Self {
        let mut reg = Self::default();
        for cam in cameras {
            if reg.index.contains_key(&cam.id) {
                cwarn(&format!("duplicate camera id '{}' ignored", cam.id));
                continue;
            }
            reg.index.insert(cam.id.clone(), reg.cameras.len());
            reg.cameras.push(cam);
        }
        reg
    }

    pub fn get(&self, id: &str) -> Option<&Camera> {
        self.index.get(id).map(|&i| &self.cameras[i])
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Groups ordered by label; cameras keep load order inside a group.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let mut out: Vec<Section<'_>> = Vec::new();
        for cam in &self.cameras {
            match out.iter_mut().find(|s| s.label == cam.section) {
                Some(s) => s.cameras.push(cam),
                None => out.push(Section {
                    label: &cam.section,
                    cameras: vec![cam],
                }),
            }
        }
        out.sort_by(|a, b| a.label.cmp(b.label));
        out
    }

    /// Camera `step` places away from `from` in list display order, wrapping.
    /// With no current camera, steps from just before the first entry.
    pub fn neighbor(&self, from: Option<&str>, step: i32) -> Option<&Camera> {
        let order: Vec<&Camera> = self.sections().into_iter().flat_map(|s| s.cameras).collect();
        if order.is_empty() {
            return None;
        }
        let n = order.len() as i64;
        let pos = from
            .and_then(|id| order.iter().position(|c| c.id == id))
            .map(|p| p as i64)
            .unwrap_or(-1);
        let next = (pos + step as i64).rem_euclid(n) as usize;
        Some(order[next])
    }
}

pub const PAUSE_PAN_LABEL: &str = "PAUSE PAN";
pub const RESUME_PAN_LABEL: &str = "RESUME PAN";

/// What the matrix view renders; mirrors the session for Yew.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewerState {
    pub highlighted: Option<String>,
    pub hud: String,
    pub pan_available: bool,
    pub pan_paused: bool,
    /// Bumped on every glitch pulse.
    pub glitch_pulses: u64,
    pub error: Option<String>,
}

impl ViewerState {
    pub fn pan_label(&self) -> &'static str {
        if self.pan_paused { RESUME_PAN_LABEL } else { PAUSE_PAN_LABEL }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewerAction {
    Highlight(String),
    SetHud(String),
    SetPan { available: bool, paused: bool },
    GlitchPulse,
    ReportError(String),
    ClearError,
}

impl Reducible for ViewerState {
    type Action = ViewerAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use ViewerAction::*;
        let mut new = (*self).clone();
        match action {
            Highlight(id) => {
                new.highlighted = Some(id);
                new.error = None;
            }
            SetHud(text) => { new.hud = text; }
            SetPan { available, paused } => {
                new.pan_available = available;
                new.pan_paused = paused;
            }
            GlitchPulse => { new.glitch_pulses = new.glitch_pulses.wrapping_add(1); }
            ReportError(msg) => { new.error = Some(msg); }
            ClearError => { new.error = None; }
        }
        Rc::new(new)
    }
}

#[cfg(test)]
pub(crate) fn test_camera(id: &str, section: &str, status: CameraStatus) -> Camera {
    Camera {
        id: id.to_string(),
        section: section.to_string(),
        location: format!("{} location", id),
        status,
        distance: "12m".to_string(),
        hud_text: "REC".to_string(),
        media_url: format!("https://example.invalid/{}.jpg", id),
        pan_enabled: false,
        pan_duration: 7.0,
        glitch: GlitchBounds::default(),
    }
}
