//! Page geometry, the per-render cursor, and the laid-out document it produces.
//!
//! All positions are millimetres from the top-left corner of the page; `y` is
//! the text baseline. Conversion to PDF user space happens in `render::pdf`.

use tracing::debug;

use crate::layout::font_metrics::{get_metrics, FontFace};

/// Physical page and margins, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_top_mm: f32,
    pub margin_bottom_mm: f32,
    pub margin_left_mm: f32,
    pub margin_right_mm: f32,
}

impl PageGeometry {
    /// A4 portrait with 20mm margins on every side.
    pub fn a4() -> Self {
        PageGeometry {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_top_mm: 20.0,
            margin_bottom_mm: 20.0,
            margin_left_mm: 20.0,
            margin_right_mm: 20.0,
        }
    }

    /// Lowest baseline any text may sit on.
    pub fn bottom_limit_mm(&self) -> f32 {
        self.height_mm - self.margin_bottom_mm
    }

    /// Vertical space available between the margins of a fresh page.
    pub fn content_height_mm(&self) -> f32 {
        self.bottom_limit_mm() - self.margin_top_mm
    }

    /// Column width for text starting at `x_mm` and ending at the right margin.
    pub fn column_width_from(&self, x_mm: f32) -> f32 {
        (self.width_mm - self.margin_right_mm - x_mm).max(0.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Font face and size for a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
}

impl TextStyle {
    pub const fn regular(size_pt: f32) -> Self {
        TextStyle {
            face: FontFace::Regular,
            size_pt,
        }
    }

    pub const fn bold(size_pt: f32) -> Self {
        TextStyle {
            face: FontFace::Bold,
            size_pt,
        }
    }
}

/// A single positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub runs: Vec<TextRun>,
}

/// Output of a layout pass, ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<LaidOutPage>,
}

impl LaidOutDocument {
    /// Every run in page order.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.pages.iter().flat_map(|p| p.runs.iter())
    }

    /// Text of every run in page order.
    pub fn lines(&self) -> Vec<&str> {
        self.runs().map(|r| r.text.as_str()).collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

/// Vertical offset and page index of one render call.
///
/// Invariant: `y_mm <= geometry.bottom_limit_mm()` at all times.
#[derive(Debug, Clone)]
pub struct RenderCursor {
    geometry: PageGeometry,
    y_mm: f32,
    page_index: usize,
}

impl RenderCursor {
    pub fn new(geometry: PageGeometry) -> Self {
        RenderCursor {
            geometry,
            y_mm: geometry.margin_top_mm,
            page_index: 0,
        }
    }

    pub fn y_mm(&self) -> f32 {
        self.y_mm
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Whether a block of `height_mm` fits below the cursor on this page.
    pub fn fits(&self, height_mm: f32) -> bool {
        self.y_mm + height_mm <= self.geometry.bottom_limit_mm()
    }

    pub fn at_page_top(&self) -> bool {
        self.y_mm <= self.geometry.margin_top_mm
    }

    fn next_page(&mut self) {
        self.page_index += 1;
        self.y_mm = self.geometry.margin_top_mm;
    }

    /// Moves down by `height_mm`, stopping at the bottom limit.
    fn advance(&mut self, height_mm: f32) {
        self.y_mm = (self.y_mm + height_mm).min(self.geometry.bottom_limit_mm());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Accumulates positioned text while driving a [`RenderCursor`].
///
/// Writers either call [`ensure_space`](Self::ensure_space) with a measured
/// block height before placing its lines, or use the `write_*` helpers that
/// measure for them.
pub struct DocumentBuilder {
    cursor: RenderCursor,
    pages: Vec<LaidOutPage>,
}

impl DocumentBuilder {
    pub fn new(geometry: PageGeometry) -> Self {
        DocumentBuilder {
            cursor: RenderCursor::new(geometry),
            pages: vec![LaidOutPage::default()],
        }
    }

    pub fn cursor(&self) -> &RenderCursor {
        &self.cursor
    }

    pub fn geometry(&self) -> &PageGeometry {
        self.cursor.geometry()
    }

    /// Starts a new page if a block of `height_mm` would cross the bottom
    /// margin. Returns true when a page break happened.
    ///
    /// A block taller than a whole page cannot be helped by breaking, so no
    /// break is taken when the cursor already sits at the top of a page.
    pub fn ensure_space(&mut self, height_mm: f32) -> bool {
        if self.cursor.fits(height_mm) || self.cursor.at_page_top() {
            return false;
        }
        self.cursor.next_page();
        self.pages.push(LaidOutPage::default());
        debug!(
            "Page break before {:.1}mm block, now on page {}",
            height_mm,
            self.cursor.page_index() + 1
        );
        true
    }

    /// Places `text` at the cursor's baseline without moving it.
    pub fn place(&mut self, text: impl Into<String>, x_mm: f32, style: TextStyle) {
        let run = TextRun {
            text: text.into(),
            x_mm,
            y_mm: self.cursor.y_mm(),
            style,
        };
        if let Some(page) = self.pages.last_mut() {
            page.runs.push(run);
        }
    }

    /// Places `text` horizontally centred on the page.
    pub fn place_centered(&mut self, text: impl Into<String>, style: TextStyle) {
        let text = text.into();
        let width = get_metrics(style.face).width_mm(&text, style.size_pt);
        let x_mm = ((self.geometry().width_mm - width) / 2.0).max(0.0);
        self.place(text, x_mm, style);
    }

    pub fn advance(&mut self, height_mm: f32) {
        self.cursor.advance(height_mm);
    }

    /// Checks, places, and advances a single line.
    pub fn write_line(&mut self, text: impl Into<String>, x_mm: f32, style: TextStyle, line_height_mm: f32) {
        self.ensure_space(line_height_mm);
        self.place(text, x_mm, style);
        self.advance(line_height_mm);
    }

    /// Writes lines one at a time, checking for overflow before each.
    pub fn write_lines(&mut self, lines: &[String], x_mm: f32, style: TextStyle, line_height_mm: f32) {
        for line in lines {
            self.write_line(line.as_str(), x_mm, style, line_height_mm);
        }
    }

    /// Writes lines as one block: a single overflow check for the whole
    /// paragraph, so it is never split across pages. Paragraphs taller than a
    /// page fall back to per-line checks.
    pub fn write_paragraph(&mut self, lines: &[String], x_mm: f32, style: TextStyle, line_height_mm: f32) {
        let height = lines.len() as f32 * line_height_mm;
        if height > self.geometry().content_height_mm() {
            self.write_lines(lines, x_mm, style, line_height_mm);
            return;
        }
        self.ensure_space(height);
        for line in lines {
            self.place(line.as_str(), x_mm, style);
            self.advance(line_height_mm);
        }
    }

    pub fn finish(self) -> LaidOutDocument {
        LaidOutDocument {
            geometry: *self.cursor.geometry(),
            pages: self.pages,
        }
    }
}
