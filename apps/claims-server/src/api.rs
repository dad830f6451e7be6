//! API handlers for the claims server

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{sse::KeepAlive, IntoResponse, Sse},
    Json,
};
use claims_core::{Claim, ClaimsError};
use dashboard_core::{DashboardError, DashboardState, HistorySection, RecordingSurface};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::stream::{report_events, SseSurface};
use crate::{AppState, Dashboard};

/// Bring a fresh session through its startup states so it accepts queries
pub fn ensure_started(dashboard: &mut Dashboard) -> Result<(), DashboardError> {
    if dashboard.state() == DashboardState::Idle {
        dashboard.start(&mut RecordingSurface::new())?;
    }
    Ok(())
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "claims-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ClaimListResponse {
    pub success: bool,
    pub claims: Vec<Claim>,
    pub count: usize,
}

/// Handler: GET /api/claims
pub async fn handle_list_claims(State(state): State<AppState>) -> Json<ClaimListResponse> {
    let dashboard = state.dashboard.lock().await;
    let claims = dashboard.registry().claims().to_vec();
    let count = claims.len();

    Json(ClaimListResponse {
        success: true,
        claims,
        count,
    })
}

#[derive(Serialize)]
pub struct ClaimResponse {
    pub success: bool,
    pub claim: Claim,
}

/// Handler: GET /api/claims/:id
pub async fn handle_claim(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<ClaimResponse>, ServerError> {
    let dashboard = state.dashboard.lock().await;
    let claim = dashboard
        .registry()
        .lookup(id)
        .map_err(|e| match e {
            ClaimsError::NotFound(id) => ServerError::ClaimNotFound(id),
            other => ServerError::Internal(other.to_string()),
        })?
        .clone();

    Ok(Json(ClaimResponse {
        success: true,
        claim,
    }))
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub sections: Vec<HistorySection>,
}

/// Handler: GET /api/history?q=
pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<HistoryResponse> {
    let dashboard = state.dashboard.lock().await;
    Json(HistoryResponse {
        success: true,
        sections: dashboard.history().filter(&params.q),
    })
}

/// Handler: GET /api/report/stream?q=
///
/// An empty query still opens the stream; it carries the warning notice and
/// then ends.
pub async fn handle_report_stream(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ServerError> {
    let mut surface = SseSurface::new();

    let ticket = {
        let mut dashboard = state.dashboard.lock().await;
        ensure_started(&mut dashboard)?;
        match dashboard.submit_query(&params.q, &mut surface) {
            Ok(ticket) => Some(ticket),
            Err(DashboardError::Claims(ClaimsError::EmptyQuery)) => None,
            Err(e) => return Err(e.into()),
        }
    };
    debug!("Streaming report for '{}' as {:?}", params.q, ticket);

    let events = report_events(state.dashboard.clone(), surface, ticket);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Handler: POST /api/report/export
///
/// Image decoding and PDF encoding run on the blocking pool.
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, ServerError> {
    let (document, surface) = tokio::task::spawn_blocking(move || {
        let mut dashboard = state.dashboard.blocking_lock();
        let mut surface = RecordingSurface::new();
        let document = dashboard.export(&mut surface)?.clone();
        Ok::<_, DashboardError>((document, surface))
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;

    for (level, message) in surface.notices() {
        debug!("Export notice ({:?}): {}", level, message);
    }
    info!(
        "Exported {} ({} bytes)",
        document.filename,
        document.bytes.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, document.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&document.filename),
            ),
        ],
        document.bytes,
    ))
}

/// `attachment` header value; characters a header cannot carry become `_`
pub fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}
