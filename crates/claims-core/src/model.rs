//! Core data model shared by the dashboard and the exporter

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A WGS84 point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
}

/// A pending insurance claim pinned on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: u32,
    pub location: Coordinate,
    pub status: ClaimStatus,
}

impl Claim {
    /// Anchor linking the marker popup to the report section
    pub fn anchor(&self) -> String {
        claim_anchor(self.id)
    }
}

pub fn claim_anchor(id: u32) -> String {
    format!("claim-{}", id)
}

/// Before/after image locations for one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePaths {
    pub before: PathBuf,
    pub after: PathBuf,
}

impl ImagePaths {
    /// `{dir}/{key}_before.png` and `{dir}/{key}_after.png`
    pub fn for_property(dir: &Path, key: &str) -> Self {
        Self {
            before: dir.join(format!("{}_before.png", key)),
            after: dir.join(format!("{}_after.png", key)),
        }
    }
}

/// The resolved content of a damage report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// The query exactly as the user typed it
    pub query: String,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<ImagePaths>,
}

impl ReportRecord {
    pub fn title(&self) -> String {
        format!("Report for: {}", self.query)
    }

    /// Suggested download name for the exported PDF
    pub fn export_filename(&self) -> String {
        format!("insurance_report_{}.pdf", self.query)
    }
}

/// Normalize a free-text address into a filesystem-friendly key.
///
/// Lowercases, collapses runs of non-alphanumerics into `_` and trims
/// leading/trailing separators: "Via Garibaldi 12" -> "via_garibaldi_12".
pub fn property_key(query: &str) -> String {
    let mut key = String::with_capacity(query.len());
    let mut pending_sep = false;

    for c in query.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }

    key
}
