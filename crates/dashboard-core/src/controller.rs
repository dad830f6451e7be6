//! Dashboard orchestration
//!
//! ```text
//! Idle -> MapRendered -> MetricsRendered -> AwaitingQuery
//!      -> Resolving -> Presenting -> ReportReady <-> Exporting
//! ```
//!
//! A new query may be submitted from any state after `AwaitingQuery`; it
//! cancels the running presentation and restarts from `Resolving`. Each
//! submission gets a `QueryTicket`, and only the newest ticket may advance.

use std::sync::Arc;
use std::time::Duration;

use claims_core::{
    claim_anchor, escape_html, load_pair, property_key, CancelToken, ClaimRegistry, ClaimsError,
    ImageLoadError, ImagePair, Presentation, ReportRecord, ReportResolver,
};
use report_pdf::ExportedDocument;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::history::{SearchHistory, SIDEBAR_TITLE};
use crate::surface::{NoticeLevel, RenderSurface, SurfaceWrite};
use crate::views::{metric_cards, MapView, SEARCH_LABEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardState {
    Idle,
    MapRendered,
    MetricsRendered,
    AwaitingQuery,
    Resolving,
    Presenting,
    ReportReady,
    Exporting,
}

impl DashboardState {
    fn accepts_queries(self) -> bool {
        !matches!(
            self,
            DashboardState::Idle | DashboardState::MapRendered | DashboardState::MetricsRendered
        )
    }
}

/// Identifies one query submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QueryTicket(pub u64);

/// Outcome of one `advance` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A character was revealed; wait `pause` before advancing again
    Revealed { pause: Duration },
    /// The report is fully presented
    Finished,
}

struct ActiveReport {
    ticket: QueryTicket,
    record: ReportRecord,
    presentation: Presentation,
    /// Latest partial text per line, as revealed so far
    revealed: Vec<String>,
    /// Set when the presentation finishes, until the imagery is handed out
    images_pending: bool,
}

/// Imagery of a finished report, to be loaded away from the controller
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub ticket: QueryTicket,
    pub record: ReportRecord,
}

impl ImageRequest {
    /// Load the pair and show it, or write the matching error notice
    pub fn load(&self, surface: &mut dyn RenderSurface) {
        if let Some(pair) = load_report_images(&self.record, surface) {
            surface.show_images(self.ticket, &pair);
        }
    }
}

/// Per-session state; the claim registry may be shared between sessions
pub struct DashboardController<R: ReportResolver> {
    config: DashboardConfig,
    resolver: R,
    registry: Arc<ClaimRegistry>,
    history: SearchHistory,
    state: DashboardState,
    next_ticket: u64,
    active: Option<ActiveReport>,
    document: Option<ExportedDocument>,
}

impl<R: ReportResolver> DashboardController<R> {
    /// Generate the claim batch. Invalid scatter parameters abort startup.
    pub fn new(config: DashboardConfig, resolver: R) -> Result<Self, DashboardError> {
        let coords = config.scatter.generate()?;
        let registry = Arc::new(ClaimRegistry::build(&coords));
        Ok(Self::with_registry(config, resolver, registry))
    }

    pub fn with_registry(
        config: DashboardConfig,
        resolver: R,
        registry: Arc<ClaimRegistry>,
    ) -> Self {
        let history = SearchHistory::new(config.history.clone());
        Self {
            config,
            resolver,
            registry,
            history,
            state: DashboardState::Idle,
            next_ticket: 1,
            active: None,
            document: None,
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ClaimRegistry> {
        &self.registry
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn current_query(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.record.query.as_str())
    }

    pub fn current_ticket(&self) -> Option<QueryTicket> {
        self.active.as_ref().map(|a| a.ticket)
    }

    /// The report, once it has been fully presented
    pub fn report(&self) -> Option<&ReportRecord> {
        match self.state {
            DashboardState::ReportReady | DashboardState::Exporting => {
                self.active.as_ref().map(|a| &a.record)
            }
            _ => None,
        }
    }

    /// Lines as delivered by the presentation stream so far
    pub fn revealed_lines(&self) -> &[String] {
        self.active.as_ref().map_or(&[], |a| a.revealed.as_slice())
    }

    pub fn document(&self) -> Option<&ExportedDocument> {
        self.document.as_ref()
    }

    /// Sidebar, map, metrics and search box. Advances the startup states the
    /// first time; later calls only redraw.
    pub fn start(&mut self, surface: &mut dyn RenderSurface) -> Result<(), DashboardError> {
        self.render_sidebar(surface);
        self.render_map(surface)?;
        self.render_metrics(surface)
    }

    pub fn render_sidebar(&self, surface: &mut dyn RenderSurface) {
        surface.write(SurfaceWrite::Sidebar {
            title: SIDEBAR_TITLE.to_string(),
            sections: self.history.sections().to_vec(),
        });
    }

    pub fn render_map(&mut self, surface: &mut dyn RenderSurface) -> Result<(), DashboardError> {
        if self.state == DashboardState::Idle {
            self.state = DashboardState::MapRendered;
        }

        let view = MapView::build(self.config.scatter.center, &self.config.map, &self.registry);
        tracing::debug!("Rendering map with {} markers", view.markers.len());
        surface.write(SurfaceWrite::Map(view));
        Ok(())
    }

    pub fn render_metrics(&mut self, surface: &mut dyn RenderSurface) -> Result<(), DashboardError> {
        if self.state == DashboardState::Idle {
            return Err(self.invalid("render metrics"));
        }

        surface.write(SurfaceWrite::Metrics {
            cards: metric_cards(&self.config.metrics, &self.registry),
        });
        if self.state == DashboardState::MapRendered {
            self.state = DashboardState::MetricsRendered;
        }

        surface.write(SurfaceWrite::SearchBox {
            label: SEARCH_LABEL.to_string(),
            value: self.current_query().unwrap_or_default().to_string(),
        });
        if self.state == DashboardState::MetricsRendered {
            self.state = DashboardState::AwaitingQuery;
            tracing::info!("Dashboard ready with {} claims", self.registry.len());
        }
        Ok(())
    }

    /// Resolve `query` and begin presenting it, superseding any previous query
    pub fn submit_query(
        &mut self,
        query: &str,
        surface: &mut dyn RenderSurface,
    ) -> Result<QueryTicket, DashboardError> {
        if !self.state.accepts_queries() {
            return Err(self.invalid("submit a query"));
        }

        let previous_state = self.state;
        self.state = DashboardState::Resolving;
        let record = match self.resolver.resolve(query) {
            Ok(record) => record,
            Err(e) => {
                // The report on screen stays valid until a query resolves
                self.state = previous_state;
                if e == ClaimsError::EmptyQuery {
                    surface.notice(
                        NoticeLevel::Warning,
                        "Please enter a property address, postal code or claim code.".to_string(),
                    );
                }
                return Err(e.into());
            }
        };

        if let Some(previous) = self.active.take() {
            previous.presentation.token().cancel();
            tracing::debug!("Query {:?} superseded", previous.ticket);
        }
        self.document = None;

        let ticket = QueryTicket(self.next_ticket);
        self.next_ticket += 1;

        let presentation = Presentation::new(
            &record.lines,
            self.config.presentation.char_delay(),
            self.config.presentation.line_delay(),
            CancelToken::new(),
        );

        tracing::info!("Presenting report for '{}' ({:?})", record.query, ticket);
        surface.write(SurfaceWrite::ReportStarted {
            ticket,
            title: escape_html(&record.title()),
            anchor: self.report_anchor(&record.query),
            line_count: record.lines.len(),
        });

        self.history.record(&record.query);
        self.active = Some(ActiveReport {
            ticket,
            revealed: vec![String::new(); record.lines.len()],
            record,
            presentation,
            images_pending: false,
        });
        self.state = DashboardState::Presenting;
        Ok(ticket)
    }

    /// Reveal the next character of the report for `ticket`
    pub fn advance(
        &mut self,
        ticket: QueryTicket,
        surface: &mut dyn RenderSurface,
    ) -> Result<Step, DashboardError> {
        let active = match self.active.as_mut() {
            Some(active) if active.ticket == ticket => active,
            _ => return Err(DashboardError::Superseded),
        };

        if self.state != DashboardState::Presenting {
            return Ok(Step::Finished);
        }

        if let Some(event) = active.presentation.next() {
            surface.write(SurfaceWrite::ReportLine {
                ticket,
                line: event.line,
                html: event.escaped(),
                complete: event.line_complete,
            });
            let pause = event.pause;
            active.revealed[event.line] = event.text;
            return Ok(Step::Revealed { pause });
        }

        surface.write(SurfaceWrite::ReportComplete { ticket });
        active.images_pending = true;
        self.state = DashboardState::ReportReady;
        Ok(Step::Finished)
    }

    /// Drive the presentation to the end, calling `wait` with each pause,
    /// then show the report's imagery
    pub fn present_to_end(
        &mut self,
        ticket: QueryTicket,
        surface: &mut dyn RenderSurface,
        mut wait: impl FnMut(Duration),
    ) -> Result<(), DashboardError> {
        loop {
            match self.advance(ticket, surface)? {
                Step::Revealed { pause } => wait(pause),
                Step::Finished => break,
            }
        }
        if let Some(request) = self.take_image_request() {
            request.load(surface);
        }
        Ok(())
    }

    /// Imagery of the report that just finished presenting. Returned once
    /// per report; `advance` never touches the disk itself.
    pub fn take_image_request(&mut self) -> Option<ImageRequest> {
        let active = self.active.as_mut()?;
        if !std::mem::take(&mut active.images_pending) {
            return None;
        }
        Some(ImageRequest {
            ticket: active.ticket,
            record: active.record.clone(),
        })
    }

    /// Export the ready report to PDF and offer it on the surface
    pub fn export(
        &mut self,
        surface: &mut dyn RenderSurface,
    ) -> Result<&ExportedDocument, DashboardError> {
        if self.state != DashboardState::ReportReady {
            return Err(DashboardError::NotReady);
        }
        let Some(active) = self.active.as_ref() else {
            return Err(DashboardError::NotReady);
        };

        self.state = DashboardState::Exporting;
        let images = load_report_images(&active.record, surface);
        let result = report_pdf::export_report(&active.record, images.as_ref());
        self.state = DashboardState::ReportReady;

        match result {
            Ok(document) => {
                surface.offer_download(&document);
                Ok(self.document.insert(document))
            }
            Err(e) => {
                tracing::warn!("Export failed: {}", e);
                surface.notice(NoticeLevel::Error, format!("Could not generate the PDF: {}", e));
                Err(e.into())
            }
        }
    }

    /// `claim-<id>` when the query names a known claim, otherwise derived from the address
    fn report_anchor(&self, query: &str) -> String {
        let trimmed = query.trim();
        let id = trimmed
            .strip_prefix("claim-")
            .or_else(|| trimmed.strip_prefix('#'))
            .unwrap_or(trimmed);
        match id.parse::<u32>() {
            Ok(id) if self.registry.lookup(id).is_ok() => claim_anchor(id),
            _ => format!("claim-{}", property_key(query)),
        }
    }

    fn invalid(&self, action: &'static str) -> DashboardError {
        DashboardError::InvalidTransition {
            state: self.state,
            action,
        }
    }
}

/// Load the report's imagery, turning failures into user-facing notices
fn load_report_images(record: &ReportRecord, surface: &mut dyn RenderSurface) -> Option<ImagePair> {
    let paths = record.images.as_ref()?;
    match load_pair(&paths.before, &paths.after) {
        Ok(pair) => Some(pair),
        Err(ImageLoadError::Missing(path)) => {
            tracing::warn!("Image missing for '{}': {}", record.query, path);
            surface.notice(
                NoticeLevel::Error,
                format!(
                    "No images found for {}. Please ensure the images are available in the correct directory.",
                    record.query
                ),
            );
            None
        }
        Err(e @ ImageLoadError::LoadFailed { .. }) => {
            tracing::warn!("Image load failed for '{}': {}", record.query, e);
            surface.notice(
                NoticeLevel::Error,
                format!("Images for {} could not be loaded: {}", record.query, e),
            );
            None
        }
    }
}
