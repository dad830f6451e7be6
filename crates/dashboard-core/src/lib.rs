//! Claims dashboard session logic
//!
//! `DashboardController` owns one session: it renders the map, metrics and
//! sidebar, resolves searches into reports, streams the typewriter
//! presentation and exports the finished report. Output goes through the
//! `RenderSurface` trait so the same flow drives a web page, an SSE stream or
//! a test recorder.

pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod surface;
pub mod views;

pub use config::{DashboardConfig, MapConfig, MetricsConfig, PresentationConfig, WeatherEvent};
pub use controller::{DashboardController, DashboardState, ImageRequest, QueryTicket, Step};
pub use error::DashboardError;
pub use history::{HistorySection, SearchHistory, SIDEBAR_TITLE, TODAY_LIMIT};
pub use surface::{ImageInfo, NoticeLevel, RecordingSurface, RenderSurface, SurfaceWrite};
pub use views::{metric_cards, MapView, Marker, MetricCard, SEARCH_LABEL};
