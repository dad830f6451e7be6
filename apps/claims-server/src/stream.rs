//! Server-Sent Events surface for the typewriter report
//!
//! Each surface write becomes one SSE event named after its `type`, with the
//! write as JSON data. The stream pulls one step at a time from the dashboard
//! and sleeps the returned pause on the runtime, so a dropped connection
//! simply stops pulling.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::Event;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use claims_core::{ImageAsset, ImagePair};
use dashboard_core::{
    DashboardError, ImageRequest, QueryTicket, RenderSurface, Step, SurfaceWrite,
};
use futures::stream::{self, Stream};
use report_pdf::layout::{AFTER_CAPTION, BEFORE_CAPTION};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::Dashboard;

/// Name of the final event; clients close the connection when they see it
pub const END_EVENT: &str = "end";

#[derive(Debug, Default)]
pub struct SseSurface {
    events: VecDeque<Event>,
}

impl SseSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn push<T: Serialize>(&mut self, name: &str, data: &T) {
        match Event::default().event(name).json_data(data) {
            Ok(event) => self.events.push_back(event),
            Err(e) => warn!("Dropping '{}' event: {}", name, e),
        }
    }

    fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }
}

#[derive(Serialize)]
struct ImageView {
    name: String,
    caption: &'static str,
    width: u32,
    height: u32,
    src: String,
}

impl ImageView {
    fn new(asset: &ImageAsset, caption: &'static str) -> Self {
        Self {
            name: asset.name.clone(),
            caption,
            width: asset.width,
            height: asset.height,
            src: format!("data:image/png;base64,{}", STANDARD.encode(&asset.encoded)),
        }
    }
}

#[derive(Serialize)]
struct ImagesEvent {
    ticket: QueryTicket,
    before: ImageView,
    after: ImageView,
}

impl RenderSurface for SseSurface {
    fn write(&mut self, write: SurfaceWrite) {
        let name = match serde_json::to_value(&write) {
            Ok(value) => value
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or("message")
                .to_string(),
            Err(e) => {
                warn!("Could not serialize surface write: {}", e);
                return;
            }
        };
        self.push(&name, &write);
    }

    fn show_images(&mut self, ticket: QueryTicket, images: &ImagePair) {
        self.push(
            "images",
            &ImagesEvent {
                ticket,
                before: ImageView::new(&images.before, BEFORE_CAPTION),
                after: ImageView::new(&images.after, AFTER_CAPTION),
            },
        );
    }
}

/// Read and decode the report's imagery on the blocking pool, outside the
/// dashboard lock
async fn load_images(request: ImageRequest, mut surface: SseSurface) -> SseSurface {
    let ticket = request.ticket;
    match tokio::task::spawn_blocking(move || {
        request.load(&mut surface);
        surface
    })
    .await
    {
        Ok(surface) => surface,
        Err(e) => {
            warn!("Image loading for {:?} did not complete: {}", ticket, e);
            SseSurface::new()
        }
    }
}

struct ReportStream {
    dashboard: Arc<Mutex<Dashboard>>,
    surface: SseSurface,
    ticket: Option<QueryTicket>,
    pause: Duration,
    ended: bool,
}

/// Stream the presentation of `ticket`, starting with whatever `surface`
/// already holds. With no ticket only the buffered events are sent.
pub fn report_events(
    dashboard: Arc<Mutex<Dashboard>>,
    surface: SseSurface,
    ticket: Option<QueryTicket>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let state = ReportStream {
        dashboard,
        surface,
        ticket,
        pause: Duration::ZERO,
        ended: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.surface.pop() {
                return Some((Ok(event), st));
            }
            if st.ended {
                return None;
            }

            let Some(ticket) = st.ticket else {
                st.ended = true;
                st.surface.push(END_EVENT, &serde_json::Value::Null);
                continue;
            };

            if !st.pause.is_zero() {
                tokio::time::sleep(st.pause).await;
                st.pause = Duration::ZERO;
            }

            let step = {
                let mut dashboard = st.dashboard.lock().await;
                dashboard.advance(ticket, &mut st.surface)
            };
            match step {
                Ok(Step::Revealed { pause }) => st.pause = pause,
                Ok(Step::Finished) => {
                    st.ticket = None;
                    let request = {
                        let mut dashboard = st.dashboard.lock().await;
                        match dashboard.current_ticket() {
                            Some(current) if current == ticket => dashboard.take_image_request(),
                            _ => None,
                        }
                    };
                    if let Some(request) = request {
                        st.surface = load_images(request, std::mem::take(&mut st.surface)).await;
                    }
                }
                Err(DashboardError::Superseded) => {
                    debug!("Stream for {:?} superseded", ticket);
                    st.ticket = None;
                }
                Err(e) => {
                    warn!("Presentation stopped: {}", e);
                    st.ticket = None;
                }
            }
        }
    })
}
