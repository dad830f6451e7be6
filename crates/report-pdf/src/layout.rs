//! Page layout for exported reports
//!
//! Coordinates are PDF user space (origin bottom-left, points). The plan is
//! computed before any PDF objects exist so it can be inspected in tests.

use crate::text::wrap;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

pub const MARGIN_X: f32 = 30.0;
pub const BOTTOM_MARGIN: f32 = 40.0;

pub const TITLE_Y: f32 = 750.0;
pub const TITLE_SIZE: f32 = 16.0;
/// Baseline step between wrapped title lines
pub const TITLE_LINE_HEIGHT: f32 = 20.0;
/// Helvetica-Bold runs about a tenth wider than the regular metrics
const BOLD_WIDTH_FACTOR: f32 = 1.1;

pub const BODY_TOP: f32 = 720.0;
pub const BODY_SIZE: f32 = 12.0;
pub const LINE_HEIGHT: f32 = 20.0;

pub const IMAGE_WIDTH: f32 = 250.0;
pub const IMAGE_HEIGHT: f32 = 180.0;
pub const RIGHT_COLUMN_X: f32 = 300.0;
/// Distance from the text cursor down to the bottom edge of the image boxes
pub const IMAGE_DROP: f32 = 200.0;
/// Distance from the text cursor down to the caption baseline
pub const CAPTION_DROP: f32 = 220.0;

pub const BEFORE_CAPTION: &str = "Before Event";
pub const AFTER_CAPTION: &str = "After Event";
pub const NO_IMAGES_TEXT: &str = "Images not available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    /// Resource name used in page content streams
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Before,
    After,
}

impl ImageSlot {
    pub fn resource_name(self) -> &'static str {
        match self {
            ImageSlot::Before => "Im1",
            ImageSlot::After => "Im2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        face: FontFace,
        size: f32,
        x: f32,
        y: f32,
        text: String,
    },
    Image {
        slot: ImageSlot,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePlan {
    pub ops: Vec<DrawOp>,
}

impl PagePlan {
    pub fn images(&self) -> impl Iterator<Item = ImageSlot> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { slot, .. } => Some(*slot),
            _ => None,
        })
    }
}

struct Cursor {
    pages: Vec<PagePlan>,
    y: f32,
}

impl Cursor {
    fn page(&mut self) -> &mut PagePlan {
        // Always at least one page
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(PagePlan::default());
        self.y = TITLE_Y;
    }

    /// Start a new page unless `needed` points fit above the bottom margin
    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed < BOTTOM_MARGIN {
            self.new_page();
        }
    }

    fn text(&mut self, face: FontFace, size: f32, x: f32, y: f32, text: &str) {
        self.page().ops.push(DrawOp::Text {
            face,
            size,
            x,
            y,
            text: text.to_string(),
        });
    }
}

/// Lay out a report: title, wrapped body lines, then images or a notice
pub fn plan(query: &str, lines: &[String], with_images: bool) -> Vec<PagePlan> {
    let max_width = PAGE_WIDTH - 2.0 * MARGIN_X;
    let title = wrap(
        &format!("Report for: {}", query),
        TITLE_SIZE * BOLD_WIDTH_FACTOR,
        max_width,
    );
    // Every extra title line pushes the body down by the same step
    let extra = title.len().saturating_sub(1) as f32 * TITLE_LINE_HEIGHT;

    let mut cursor = Cursor {
        pages: vec![PagePlan::default()],
        y: BODY_TOP - extra,
    };
    for (i, piece) in title.iter().enumerate() {
        let y = TITLE_Y - i as f32 * TITLE_LINE_HEIGHT;
        cursor.text(FontFace::Bold, TITLE_SIZE, MARGIN_X, y, piece);
    }

    for line in lines {
        for piece in wrap(line, BODY_SIZE, max_width) {
            cursor.ensure_room(0.0);
            let y = cursor.y;
            cursor.text(FontFace::Regular, BODY_SIZE, MARGIN_X, y, &piece);
            cursor.y -= LINE_HEIGHT;
        }
    }

    if with_images {
        cursor.ensure_room(CAPTION_DROP);
        let y = cursor.y;
        for (slot, x, caption) in [
            (ImageSlot::Before, MARGIN_X, BEFORE_CAPTION),
            (ImageSlot::After, RIGHT_COLUMN_X, AFTER_CAPTION),
        ] {
            cursor.page().ops.push(DrawOp::Image {
                slot,
                x,
                y: y - IMAGE_DROP,
                width: IMAGE_WIDTH,
                height: IMAGE_HEIGHT,
            });
            cursor.text(FontFace::Regular, BODY_SIZE, x, y - CAPTION_DROP, caption);
        }
    } else {
        cursor.ensure_room(LINE_HEIGHT);
        let y = cursor.y;
        cursor.text(FontFace::Regular, BODY_SIZE, MARGIN_X, y - LINE_HEIGHT, NO_IMAGES_TEXT);
    }

    cursor.pages
}
