//! Encodes a [`LaidOutDocument`] into PDF bytes with `pdf-writer`.
//!
//! Text is set in the standard Helvetica faces with WinAnsi encoding, so no font
//! files are embedded. The encoder does no layout of its own: every run is
//! written exactly where the layout pass put it.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use thiserror::Error;
use tracing::debug;

use crate::layout::cursor::LaidOutDocument;
use crate::layout::font_metrics::{FontFace, MM_PER_PT};

/// Upper bound on pages in one export.
pub const MAX_PAGES: usize = 1000;

const FACES: [FontFace; 2] = [FontFace::Regular, FontFace::Bold];

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("document has {pages} pages, limit is {limit}")]
    PageLimit { pages: usize, limit: usize },

    #[error("non-finite position or size for text {text:?} on page {page}")]
    InvalidRun { page: usize, text: String },

    #[error("document has no pages")]
    Empty,
}

pub fn encode(document: &LaidOutDocument) -> Result<Vec<u8>, RenderError> {
    let page_count = document.pages.len();
    if page_count == 0 {
        return Err(RenderError::Empty);
    }
    if page_count > MAX_PAGES {
        return Err(RenderError::PageLimit {
            pages: page_count,
            limit: MAX_PAGES,
        });
    }

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let font_ids: Vec<(FontFace, Ref)> = FACES.iter().map(|face| (*face, alloc())).collect();
    let page_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_count as i32);

    for (face, font_ref) in &font_ids {
        pdf.type1_font(*font_ref)
            .base_font(Name(face.base_font().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let geometry = &document.geometry;
    let page_width_pt = geometry.width_mm / MM_PER_PT;
    let page_height_pt = geometry.height_mm / MM_PER_PT;

    for (index, page) in document.pages.iter().enumerate() {
        let mut content = Content::new();
        for run in &page.runs {
            let x_pt = run.x_mm / MM_PER_PT;
            let y_pt = page_height_pt - run.y_mm / MM_PER_PT;
            if !(x_pt.is_finite() && y_pt.is_finite() && run.style.size_pt.is_finite()) {
                return Err(RenderError::InvalidRun {
                    page: index,
                    text: run.text.clone(),
                });
            }
            let encoded = to_win_ansi(&run.text);
            content
                .begin_text()
                .set_font(Name(run.style.face.resource_name().as_bytes()), run.style.size_pt)
                .next_line(x_pt, y_pt)
                .show(Str(&encoded))
                .end_text();
        }
        pdf.stream(content_ids[index], &content.finish());

        let mut pdf_page = pdf.page(page_ids[index]);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, page_width_pt, page_height_pt))
            .parent(pages_id)
            .contents(content_ids[index]);
        {
            let mut resources = pdf_page.resources();
            let mut fonts = resources.fonts();
            for (face, font_ref) in &font_ids {
                fonts.pair(Name(face.resource_name().as_bytes()), *font_ref);
            }
        }
    }

    let bytes = pdf.finish();
    debug!("Encoded {} page(s) into {} bytes", page_count, bytes.len());
    Ok(bytes)
}

/// Maps text onto WinAnsiEncoding. Characters outside it become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
