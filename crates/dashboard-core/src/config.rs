//! Dashboard configuration
//!
//! Every field has a default matching the Milan demo, so an empty JSON object
//! (or no file at all) yields a working dashboard.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use claims_core::ClaimScatter;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::history::HistorySection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub scatter: ClaimScatter,
    pub map: MapConfig,
    pub presentation: PresentationConfig,
    pub metrics: MetricsConfig,
    /// Directory holding `{property}_before.png` / `{property}_after.png`
    pub image_dir: PathBuf,
    pub history: Vec<HistorySection>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            scatter: ClaimScatter::default(),
            map: MapConfig::default(),
            presentation: PresentationConfig::default(),
            metrics: MetricsConfig::default(),
            image_dir: PathBuf::from("."),
            history: default_history(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, DashboardError> {
        serde_json::from_str(json).map_err(|e| DashboardError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, DashboardError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,
    /// Tile URL template with `{z}`, `{x}`, `{y}` placeholders
    pub tile_url: String,
    pub attribution: String,
    pub width: u32,
    pub height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: 13,
            tile_url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".to_string(),
            attribution: "Esri".to_string(),
            width: 1300,
            height: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub char_delay_ms: u64,
    pub line_delay_ms: u64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            char_delay_ms: 20,
            line_delay_ms: 500,
        }
    }
}

impl PresentationConfig {
    pub fn char_delay(&self) -> Duration {
        Duration::from_millis(self.char_delay_ms)
    }

    pub fn line_delay(&self) -> Duration {
        Duration::from_millis(self.line_delay_ms)
    }
}

/// A dated weather event shown on the metrics panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEvent {
    pub kind: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub insured_properties: u64,
    pub last_event: Option<WeatherEvent>,
    pub upcoming_event: Option<WeatherEvent>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            insured_properties: 775,
            last_event: NaiveDate::from_ymd_opt(2024, 10, 8).map(|date| WeatherEvent {
                kind: "Rainfall".to_string(),
                date,
            }),
            upcoming_event: NaiveDate::from_ymd_opt(2024, 10, 18).map(|date| WeatherEvent {
                kind: "Hail".to_string(),
                date,
            }),
        }
    }
}

fn default_history() -> Vec<HistorySection> {
    let last_week = [
        "Via Roma 45",
        "Via Garibaldi 12",
        "Via Dante Alighieri 89",
        "Via Mazzini 33",
        "Via Verdi 76",
        "Via San Marco 50",
        "Via Manzoni 18",
        "Via Vittorio Emanuele II 22",
        "Via del Corso 29",
    ];
    vec![
        HistorySection::new(
            "Yesterday",
            &[
                "Via Lagrange, 3",
                "Via Roma, 56",
                "via luigi, 174",
                "corso unione sovietica, 473",
            ],
        ),
        HistorySection::new("Last 7 days", &last_week),
        HistorySection::new("Last month", &last_week[..6]),
    ]
}
