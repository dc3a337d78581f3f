// Report Compositor: turns an analysis report or a resume into a paginated PDF.
// Layout happens in `analysis` / `resume`, encoding in `render::pdf`. No network I/O.

pub mod analysis;
pub mod handlers;
pub mod resume;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::layout::font_metrics::get_metrics;
use crate::layout::{wrap_text, DocumentBuilder, PageGeometry, TextStyle};
use crate::models::analysis::AnalysisReport;
use crate::models::resume::ResumeDocument;
use crate::render::{self, RenderError};

pub const BODY_SIZE_PT: f32 = 10.0;
const HEADING_ADVANCE_MM: f32 = 8.0;
const BULLET_PREFIX: &str = "\u{2022} ";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0} is required")]
    MissingInput(&'static str),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),
}

/// Which document an export produced; part of the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Report,
    Resume,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Report => "report",
            ExportKind::Resume => "resume",
        }
    }

    fn fallback_subject(&self) -> &'static str {
        match self {
            ExportKind::Report => "resume-analysis",
            ExportKind::Resume => "export",
        }
    }
}

/// A finished export, ready to hand to the client as a download.
#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    pub file_name: String,
    pub bytes: Bytes,
    pub page_count: usize,
}

impl DocumentArtifact {
    pub const CONTENT_TYPE: &'static str = "application/pdf";
}

// ────────────────────────────────────────────────────────────────────────────
// Timestamps
// ────────────────────────────────────────────────────────────────────────────

/// Issues export timestamps with millisecond resolution that never repeat,
/// even for exports started within the same millisecond.
#[derive(Debug, Default)]
pub struct StampSource {
    last_millis: AtomicI64,
}

impl StampSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        let issued = now.max(previous + 1);
        DateTime::<Utc>::from_timestamp_millis(issued).unwrap_or_else(Utc::now)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Exporter
// ────────────────────────────────────────────────────────────────────────────

/// Entry points of the compositor. Cheap to clone; every call builds its own
/// cursor and document, so concurrent exports do not interact.
#[derive(Debug, Clone)]
pub struct Exporter {
    geometry: PageGeometry,
    stamps: Arc<StampSource>,
}

impl Exporter {
    pub fn new(geometry: PageGeometry) -> Self {
        Exporter {
            geometry,
            stamps: Arc::new(StampSource::new()),
        }
    }

    pub fn analysis_report(
        &self,
        report: Option<&AnalysisReport>,
        subject_name: Option<&str>,
    ) -> Result<DocumentArtifact, ExportError> {
        let report = report.ok_or(ExportError::MissingInput("analysis report"))?;
        let generated_at = self.stamps.next();
        let document =
            analysis::layout_analysis_report(report, subject_name, generated_at, self.geometry);
        let bytes = render::encode(&document)?;

        let artifact = DocumentArtifact {
            file_name: file_name(subject_name, ExportKind::Report, generated_at),
            bytes: Bytes::from(bytes),
            page_count: document.pages.len(),
        };
        info!(
            "Exported analysis report {} ({} pages)",
            artifact.file_name, artifact.page_count
        );
        Ok(artifact)
    }

    pub fn resume_document(
        &self,
        resume: Option<&ResumeDocument>,
    ) -> Result<DocumentArtifact, ExportError> {
        let resume = resume.ok_or(ExportError::MissingInput("resume"))?;
        let generated_at = self.stamps.next();
        let document = resume::layout_resume_document(resume, self.geometry);
        let bytes = render::encode(&document)?;

        let artifact = DocumentArtifact {
            file_name: file_name(resume.name.as_deref(), ExportKind::Resume, generated_at),
            bytes: Bytes::from(bytes),
            page_count: document.pages.len(),
        };
        info!(
            "Exported resume {} ({} pages)",
            artifact.file_name, artifact.page_count
        );
        Ok(artifact)
    }
}

/// `<subject>-<kind>-<epoch millis>.pdf`, with the subject reduced to a
/// filesystem-safe slug.
pub fn file_name(subject: Option<&str>, kind: ExportKind, stamp: DateTime<Utc>) -> String {
    let slug = subject.map(slugify).filter(|s| !s.is_empty());
    let subject = slug.as_deref().unwrap_or(kind.fallback_subject());
    format!("{subject}-{}-{}.pdf", kind.as_str(), stamp.timestamp_millis())
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Shared block writers
// ────────────────────────────────────────────────────────────────────────────

/// Uppercases the first character, leaving the rest untouched.
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Writes a section heading, kept on the same page as the first
/// `next_height_mm` of content that follows it.
pub(crate) fn write_heading(doc: &mut DocumentBuilder, heading: &str, style: TextStyle, next_height_mm: f32) {
    doc.ensure_space(HEADING_ADVANCE_MM + next_height_mm);
    doc.place(heading, doc.geometry().margin_left_mm, style);
    doc.advance(HEADING_ADVANCE_MM);
}

/// Writes one bulleted item. Continuation lines hang under the text, and every
/// line is checked for overflow on its own.
pub(crate) fn write_bullet(doc: &mut DocumentBuilder, text: &str, x_mm: f32, style: TextStyle, line_height_mm: f32) {
    let indent = get_metrics(style.face).width_mm(BULLET_PREFIX, style.size_pt);
    let width = doc.geometry().column_width_from(x_mm + indent);
    let lines = wrap_text(text, style.face, style.size_pt, width);

    for (i, line) in lines.into_iter().enumerate() {
        if i == 0 {
            doc.write_line(format!("{BULLET_PREFIX}{line}"), x_mm, style, line_height_mm);
        } else {
            doc.write_line(line, x_mm + indent, style, line_height_mm);
        }
    }
}
