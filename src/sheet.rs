//! Maps spreadsheet value rows (header row first) onto camera records.

use serde::Deserialize;
use serde_json::Value;

use crate::config::EffectsConfig;
use crate::error::SheetError;
use crate::model::{Camera, CameraRegistry, CameraStatus, GlitchBounds};
use crate::util::{clog, storage_get};

/// Stored sheet payload that replaces the bundled demo rows.
pub const ROWS_STORAGE_KEY: &str = "cm_sheet_rows";

const DEMO_SHEET: &str = include_str!("../assets/cameras.json");

/// Shape of a sheet values payload: `{"values": [[header...], [row...]]}`.
#[derive(Debug, Default, Deserialize)]
pub struct SheetValues {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl SheetValues {
    pub fn from_json(raw: &str) -> Result<Self, SheetError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Id,
    Section,
    Location,
    Status,
    Distance,
    Hud,
    Media,
    Pan,
    PanDuration,
    GlitchMin,
    GlitchMax,
}

const FIELD_COUNT: usize = 11;

impl Field {
    fn from_header(raw: &str) -> Option<Self> {
        let h = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Some(match h.as_str() {
            "id" | "camera" | "camera_id" => Self::Id,
            "section" | "group" => Self::Section,
            "location" => Self::Location,
            "status" => Self::Status,
            "distance" => Self::Distance,
            "hud" | "hud_text" | "hudtext" => Self::Hud,
            "media" | "media_url" | "mediaurl" | "url" | "image" => Self::Media,
            "pan" | "pan_enabled" | "panenabled" => Self::Pan,
            "pan_duration" | "panduration" => Self::PanDuration,
            "glitch_min" | "glitchmin" | "glitch_min_ms" => Self::GlitchMin,
            "glitch_max" | "glitchmax" | "glitch_max_ms" => Self::GlitchMax,
            _ => return None,
        })
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Only a literal `true` (any case) counts.
pub fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_pan_duration(raw: &str, fallback: f64) -> f64 {
    parse_number(raw).filter(|v| *v > 0.0).unwrap_or(fallback)
}

/// Builds cameras from `values`; rows without an id are skipped.
pub fn cameras_from_rows(sheet: &SheetValues, cfg: &EffectsConfig) -> Result<Vec<Camera>, SheetError> {
    let (header, rows) = sheet.values.split_first().ok_or(SheetError::Empty)?;
    let mut columns: [Option<usize>; FIELD_COUNT] = [None; FIELD_COUNT];
    for (i, h) in header.iter().enumerate() {
        if let Some(f) = Field::from_header(&cell_text(h)) {
            let slot = &mut columns[f as usize];
            if slot.is_none() {
                *slot = Some(i);
            }
        }
    }
    if columns[Field::Id as usize].is_none() {
        return Err(SheetError::MissingColumn("id"));
    }

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let get = |f: Field| -> String {
            columns[f as usize]
                .and_then(|i| row.get(i))
                .map(cell_text)
                .unwrap_or_default()
        };
        let id = get(Field::Id);
        if id.is_empty() {
            continue;
        }
        let glitch_min = parse_number(&get(Field::GlitchMin)).unwrap_or(cfg.default_glitch_min_ms);
        let glitch_max = parse_number(&get(Field::GlitchMax)).unwrap_or(cfg.default_glitch_max_ms);
        out.push(Camera {
            id,
            section: get(Field::Section),
            location: get(Field::Location),
            status: CameraStatus::parse(&get(Field::Status)),
            distance: get(Field::Distance),
            hud_text: get(Field::Hud),
            media_url: get(Field::Media),
            pan_enabled: parse_flag(&get(Field::Pan)),
            pan_duration: parse_pan_duration(&get(Field::PanDuration), cfg.default_pan_seconds),
            glitch: GlitchBounds::new(glitch_min, glitch_max),
        });
    }
    Ok(out)
}

/// Registry from the stored sheet when present, the bundled demo sheet otherwise.
pub fn load_registry(cfg: &EffectsConfig) -> Result<CameraRegistry, SheetError> {
    let (source, raw) = match storage_get(ROWS_STORAGE_KEY) {
        Some(raw) => ("local storage", raw),
        None => ("bundled demo", DEMO_SHEET.to_string()),
    };
    let cameras = cameras_from_rows(&SheetValues::from_json(&raw)?, cfg)?;
    clog(&format!("sheet: {} cameras from {}", cameras.len(), source));
    Ok(CameraRegistry::new(cameras))
}
