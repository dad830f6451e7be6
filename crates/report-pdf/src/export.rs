//! Render a laid-out report into PDF bytes

use std::io::Write;

use claims_core::{ImageAsset, ImagePair, PixelFormat, ReportRecord};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::ExportError;
use crate::layout::{self, DrawOp, FontFace, ImageSlot, PagePlan, PAGE_HEIGHT, PAGE_WIDTH};
use crate::text::encode_winansi;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A finished export, ready to be offered as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Export a resolved report with its (optional) imagery
pub fn export_report(
    record: &ReportRecord,
    images: Option<&ImagePair>,
) -> Result<ExportedDocument, ExportError> {
    let bytes = export(&record.query, &record.lines, images)?;
    Ok(ExportedDocument {
        filename: record.export_filename(),
        mime_type: PDF_MIME_TYPE,
        bytes,
    })
}

/// Produce a complete PDF for `query` and `lines`.
///
/// Images that cannot be embedded are replaced by the "Images not available"
/// line; only a failure to serialize the document itself is returned.
pub fn export(
    query: &str,
    lines: &[String],
    images: Option<&ImagePair>,
) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");

    let embedded = match images {
        Some(pair) => match embed_pair(&mut doc, pair) {
            Ok(ids) => Some(ids),
            Err(e) => {
                tracing::warn!("Falling back to text-only report for '{}': {}", query, e);
                None
            }
        },
        None => None,
    };

    let pages = layout::plan(query, lines, embedded.is_some());
    build_document(&mut doc, query, &pages, embedded)?;

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| ExportError::Encoding(e.to_string()))?;

    tracing::info!(
        "Exported report for '{}': {} page(s), {} bytes",
        query,
        pages.len(),
        output.len()
    );
    Ok(output)
}

/// Object ids of the embedded before/after image XObjects
#[derive(Debug, Clone, Copy)]
struct EmbeddedImages {
    before: ObjectId,
    after: ObjectId,
}

impl EmbeddedImages {
    fn id(&self, slot: ImageSlot) -> ObjectId {
        match slot {
            ImageSlot::Before => self.before,
            ImageSlot::After => self.after,
        }
    }
}

fn embed_pair(doc: &mut Document, pair: &ImagePair) -> Result<EmbeddedImages, ExportError> {
    // Encode both before touching the document so a failure leaves no orphans
    let before = image_streams(&pair.before)?;
    let after = image_streams(&pair.after)?;

    Ok(EmbeddedImages {
        before: add_image(doc, before),
        after: add_image(doc, after),
    })
}

fn add_image(doc: &mut Document, (mut image, mask): (Stream, Option<Stream>)) -> ObjectId {
    if let Some(mask) = mask {
        let mask_id = doc.add_object(mask);
        image.dict.set("SMask", Object::Reference(mask_id));
    }
    doc.add_object(image)
}

/// Build the image XObject and, for images with alpha, its soft mask
fn image_streams(asset: &ImageAsset) -> Result<(Stream, Option<Stream>), ExportError> {
    if !asset.is_consistent() {
        return Err(ExportError::ExportFailed(format!(
            "{}: pixel data does not match {}x{} {:?}",
            asset.name, asset.width, asset.height, asset.format
        )));
    }

    let (color, alpha, color_space) = split_channels(asset);

    let image = flate_image_stream(asset.width, asset.height, color_space, &color)?;
    let mask = alpha
        .map(|alpha| flate_image_stream(asset.width, asset.height, "DeviceGray", &alpha))
        .transpose()?;

    Ok((image, mask))
}

fn split_channels(asset: &ImageAsset) -> (Vec<u8>, Option<Vec<u8>>, &'static str) {
    let pixels = &asset.pixels;
    match asset.format {
        PixelFormat::Gray => (pixels.clone(), None, "DeviceGray"),
        PixelFormat::Rgb => (pixels.clone(), None, "DeviceRGB"),
        PixelFormat::GrayAlpha => {
            let color = pixels.chunks_exact(2).map(|p| p[0]).collect();
            let alpha = pixels.chunks_exact(2).map(|p| p[1]).collect();
            (color, Some(alpha), "DeviceGray")
        }
        PixelFormat::Rgba => {
            let color = pixels
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[2]])
                .collect();
            let alpha = pixels.chunks_exact(4).map(|p| p[3]).collect();
            (color, Some(alpha), "DeviceRGB")
        }
    }
}

fn flate_image_stream(
    width: u32,
    height: u32,
    color_space: &str,
    data: &[u8],
) -> Result<Stream, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ExportError::ExportFailed(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| ExportError::ExportFailed(e.to_string()))?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    // Already compressed; keep lopdf from touching it
    Ok(Stream::new(dict, compressed).with_compression(false))
}

fn build_document(
    doc: &mut Document,
    query: &str,
    pages: &[PagePlan],
    images: Option<EmbeddedImages>,
) -> Result<(), ExportError> {
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in [FontFace::Regular, FontFace::Bold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), Object::Reference(font_id));
    }

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page),
        };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Encoding(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts.clone()));

        if let Some(embedded) = images {
            let mut xobjects = Dictionary::new();
            for slot in page.images() {
                xobjects.set(slot.resource_name(), Object::Reference(embedded.id(slot)));
            }
            if !xobjects.is_empty() {
                resources.set("XObject", Object::Dictionary(xobjects));
            }
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(PAGE_WIDTH), Object::Real(PAGE_HEIGHT)],
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_winansi(&format!("Report for: {}", query))),
        "Producer" => Object::string_literal("claims-dashboard report-pdf"),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.trailer.set("Info", Object::Reference(info_id));

    Ok(())
}

fn page_operations(page: &PagePlan) -> Vec<Operation> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                face,
                size,
                x,
                y,
                text,
            } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(face.resource_name().as_bytes().to_vec()),
                        Object::Real(*size),
                    ],
                ));
                ops.push(Operation::new("Td", vec![Object::Real(*x), Object::Real(*y)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(encode_winansi(text))],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawOp::Image {
                slot,
                x,
                y,
                width,
                height,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        Object::Real(*width),
                        0.into(),
                        0.into(),
                        Object::Real(*height),
                        Object::Real(*x),
                        Object::Real(*y),
                    ],
                ));
                ops.push(Operation::new(
                    "Do",
                    vec![Object::Name(slot.resource_name().as_bytes().to_vec())],
                ));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    ops
}
