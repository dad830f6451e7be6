//! Search query to report resolution

use std::path::PathBuf;

use crate::error::ClaimsError;
use crate::model::{ImagePaths, ReportRecord};

/// Resolves a free-text search into a report.
///
/// This is the seam for a real claims backend; presentation and export only
/// ever see the returned `ReportRecord`.
pub trait ReportResolver: Send + Sync {
    fn resolve(&self, query: &str) -> Result<ReportRecord, ClaimsError>;
}

/// Property key used for imagery while every query maps to the demo record
pub const DEMO_PROPERTY_KEY: &str = "via_garibaldi_12";

const DEMO_LINES: [&str; 4] = [
    "• Mid-level damage: between €2500 to €3000.",
    "• High-level damage: between €12000 to €14000.",
    "Property has been insured on 10/8/2018 until €50000 disasters.",
    "The system automatically scheduled for 18/10/2024 for in-person scheduling and notification with reports has been sent to the inspector.",
];

/// Returns the same demo assessment for every non-empty query
#[derive(Debug, Clone)]
pub struct StaticReportResolver {
    image_dir: PathBuf,
}

impl StaticReportResolver {
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
        }
    }
}

impl Default for StaticReportResolver {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ReportResolver for StaticReportResolver {
    fn resolve(&self, query: &str) -> Result<ReportRecord, ClaimsError> {
        if query.trim().is_empty() {
            return Err(ClaimsError::EmptyQuery);
        }

        tracing::debug!(query, "Resolving report from static demo record");

        Ok(ReportRecord {
            query: query.to_string(),
            lines: DEMO_LINES.iter().map(|l| l.to_string()).collect(),
            images: Some(ImagePaths::for_property(&self.image_dir, DEMO_PROPERTY_KEY)),
        })
    }
}
