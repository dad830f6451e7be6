//! Claims data model and report pipeline building blocks
//!
//! - `geo` / `registry`: deterministic claim locations and the claim table
//! - `resolver`: search query to report record
//! - `presentation`: cancellable typewriter reveal of report lines
//! - `images`: before/after imagery with explicit `Missing`/`LoadFailed` outcomes

pub mod error;
pub mod geo;
pub mod images;
pub mod model;
pub mod presentation;
pub mod registry;
pub mod resolver;

pub use error::{ClaimsError, ImageLoadError};
pub use geo::ClaimScatter;
pub use images::{load_image, load_pair, ImageAsset, ImagePair, PixelFormat};
pub use model::{
    claim_anchor, property_key, Claim, ClaimStatus, Coordinate, ImagePaths, ReportRecord,
};
pub use presentation::{escape_html, present, CancelToken, Presentation, RevealEvent};
pub use registry::ClaimRegistry;
pub use resolver::{ReportResolver, StaticReportResolver, DEMO_PROPERTY_KEY};
