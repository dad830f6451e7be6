//! Damage report export to PDF
//!
//! Builds a US-Letter document with lopdf: a bold title, the report lines,
//! and the before/after images side by side (or a notice when imagery is not
//! available). Nothing is written to disk; the caller owns the bytes.

pub mod error;
pub mod export;
pub mod layout;
pub mod text;

pub use error::ExportError;
pub use export::{export, export_report, ExportedDocument, PDF_MIME_TYPE};
pub use layout::{plan, DrawOp, FontFace, ImageSlot, PagePlan};
