//! The render surface seam
//!
//! The controller never produces markup pages itself; it describes what to
//! show as `SurfaceWrite`s. Hosts implement `RenderSurface` to turn those into
//! HTML, SSE events, or whatever their UI needs. Text reaching a surface is
//! already HTML-escaped where noted.

use claims_core::{ImageAsset, ImagePair};
use report_pdf::ExportedDocument;
use serde::Serialize;

use crate::controller::QueryTicket;
use crate::history::HistorySection;
use crate::views::{MapView, MetricCard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub caption: &'static str,
}

impl ImageInfo {
    pub fn describe(asset: &ImageAsset, caption: &'static str) -> Self {
        Self {
            name: asset.name.clone(),
            width: asset.width,
            height: asset.height,
            caption,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceWrite {
    Sidebar {
        title: String,
        sections: Vec<HistorySection>,
    },
    Map(MapView),
    Metrics {
        cards: Vec<MetricCard>,
    },
    SearchBox {
        label: String,
        value: String,
    },
    /// Replaces any previous report on the surface
    ReportStarted {
        ticket: QueryTicket,
        /// Escaped
        title: String,
        anchor: String,
        line_count: usize,
    },
    /// Replaces the prior partial text of `line`
    ReportLine {
        ticket: QueryTicket,
        line: usize,
        /// Escaped
        html: String,
        complete: bool,
    },
    ReportComplete {
        ticket: QueryTicket,
    },
    Images {
        ticket: QueryTicket,
        before: ImageInfo,
        after: ImageInfo,
    },
    Notice {
        level: NoticeLevel,
        message: String,
    },
    Download {
        filename: String,
        mime_type: String,
        size: usize,
    },
}

pub trait RenderSurface {
    fn write(&mut self, write: SurfaceWrite);

    /// Hosts that can display pixels override this to use the image data
    fn show_images(&mut self, ticket: QueryTicket, images: &ImagePair) {
        self.write(SurfaceWrite::Images {
            ticket,
            before: ImageInfo::describe(&images.before, report_pdf::layout::BEFORE_CAPTION),
            after: ImageInfo::describe(&images.after, report_pdf::layout::AFTER_CAPTION),
        });
    }

    fn offer_download(&mut self, document: &ExportedDocument) {
        self.write(SurfaceWrite::Download {
            filename: document.filename.clone(),
            mime_type: document.mime_type.to_string(),
            size: document.bytes.len(),
        });
    }

    fn notice(&mut self, level: NoticeLevel, message: String) {
        self.write(SurfaceWrite::Notice { level, message });
    }
}

/// Keeps every write in order; used by tests and by hosts that forward writes
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub writes: Vec<SurfaceWrite>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<SurfaceWrite> {
        std::mem::take(&mut self.writes)
    }

    /// Latest text of each report line written for `ticket`
    pub fn report_lines(&self, ticket: QueryTicket) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        for write in &self.writes {
            if let SurfaceWrite::ReportLine {
                ticket: t,
                line,
                html,
                ..
            } = write
            {
                if *t != ticket {
                    continue;
                }
                if lines.len() <= *line {
                    lines.resize(*line + 1, String::new());
                }
                lines[*line] = html.clone();
            }
        }
        lines
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, &str)> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                SurfaceWrite::Notice { level, message } => Some((*level, message.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn write(&mut self, write: SurfaceWrite) {
        self.writes.push(write);
    }
}
