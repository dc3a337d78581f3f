//! Section renderers for the analysis report.
//!
//! Block order is fixed: title, overall score, strengths, weaknesses, section
//! analysis, priority improvements. A section with nothing to show is left out
//! entirely, heading included.

use chrono::{DateTime, Utc};

use crate::export::{capitalize, write_bullet, write_heading, BODY_SIZE_PT};
use crate::layout::font_metrics::FontFace;
use crate::layout::{wrap_text, DocumentBuilder, LaidOutDocument, PageGeometry, TextStyle};
use crate::models::analysis::{
    round_half_up, AnalysisReport, PriorityImprovement, MAX_PRIORITY_IMPROVEMENTS,
};

pub const REPORT_TITLE: &str = "Resume Analysis Report";
pub const STRENGTHS_HEADING: &str = "Strengths";
pub const WEAKNESSES_HEADING: &str = "Areas for Improvement";
pub const SECTIONS_HEADING: &str = "Section Analysis";
pub const IMPROVEMENTS_HEADING: &str = "Priority Improvements";

const HEADING_STYLE: TextStyle = TextStyle::bold(14.0);

const LEFT_MM: f32 = 20.0;
const LIST_X_MM: f32 = 25.0;
const SUGGESTION_X_MM: f32 = 30.0;

const LIST_LINE_MM: f32 = 6.0;
const IMPROVEMENT_LINE_MM: f32 = 5.0;
const IMPROVEMENT_GAP_MM: f32 = 3.0;
const SECTION_GAP_MM: f32 = 5.0;

pub fn layout_analysis_report(
    report: &AnalysisReport,
    subject_name: Option<&str>,
    generated_at: DateTime<Utc>,
    geometry: PageGeometry,
) -> LaidOutDocument {
    let mut doc = DocumentBuilder::new(geometry);

    write_title_block(&mut doc, subject_name, generated_at);
    write_score_block(&mut doc, report);
    write_bullet_section(&mut doc, STRENGTHS_HEADING, &report.strengths);
    write_bullet_section(&mut doc, WEAKNESSES_HEADING, &report.weaknesses);
    write_section_scores(&mut doc, report);
    write_priority_improvements(&mut doc, &report.improvements.priority_improvements);

    doc.finish()
}

fn write_title_block(doc: &mut DocumentBuilder, subject_name: Option<&str>, generated_at: DateTime<Utc>) {
    doc.ensure_space(10.0);
    doc.place_centered(REPORT_TITLE, TextStyle::bold(20.0));
    doc.advance(10.0);

    if let Some(subject) = subject_name.map(str::trim).filter(|s| !s.is_empty()) {
        doc.ensure_space(5.0);
        doc.place_centered(format!("Generated for: {subject}"), TextStyle::regular(12.0));
        doc.advance(5.0);
    }

    doc.ensure_space(5.0);
    doc.place_centered(
        format!("Generated on: {}", generated_at.format("%B %-d, %Y")),
        TextStyle::regular(BODY_SIZE_PT),
    );
    doc.advance(15.0);
}

fn write_score_block(doc: &mut DocumentBuilder, report: &AnalysisReport) {
    // Heading, score and grade stay together.
    doc.ensure_space(8.0 + 6.0 + 6.0);
    doc.place("Overall Resume Score", LEFT_MM, TextStyle::bold(16.0));
    doc.advance(8.0);
    doc.place(
        format!("{}/100", round_half_up(report.overall_score)),
        LEFT_MM,
        TextStyle::bold(24.0),
    );
    doc.advance(6.0);
    doc.place(format!("Grade: {}", report.grade), LEFT_MM, TextStyle::regular(12.0));
    doc.advance(15.0);
}

fn write_bullet_section(doc: &mut DocumentBuilder, heading: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return;
    }

    write_heading(doc, heading, HEADING_STYLE, LIST_LINE_MM);
    for item in items {
        write_bullet(doc, item, LIST_X_MM, TextStyle::regular(BODY_SIZE_PT), LIST_LINE_MM);
    }
    doc.advance(SECTION_GAP_MM);
}

fn write_section_scores(doc: &mut DocumentBuilder, report: &AnalysisReport) {
    if report.section_analysis.is_empty() {
        return;
    }

    write_heading(doc, SECTIONS_HEADING, HEADING_STYLE, LIST_LINE_MM);
    for (name, score) in report.section_analysis.iter() {
        doc.write_line(
            format!("{}: {}%", capitalize(name), score.percentage()),
            LIST_X_MM,
            TextStyle::regular(BODY_SIZE_PT),
            LIST_LINE_MM,
        );
    }
    doc.advance(SECTION_GAP_MM);
}

fn write_priority_improvements(doc: &mut DocumentBuilder, improvements: &[PriorityImprovement]) {
    let shown = &improvements[..improvements.len().min(MAX_PRIORITY_IMPROVEMENTS)];
    if shown.is_empty() {
        return;
    }

    let width = doc.geometry().column_width_from(SUGGESTION_X_MM);
    let blocks: Vec<(String, Vec<String>)> = shown
        .iter()
        .map(|item| {
            let lines = wrap_text(&item.suggestion, FontFace::Regular, BODY_SIZE_PT, width);
            (format!("{}:", item.section), lines)
        })
        .collect();

    let first_height = improvement_height(&blocks[0].1);
    let content_height = doc.geometry().content_height_mm();
    write_heading(
        doc,
        IMPROVEMENTS_HEADING,
        HEADING_STYLE,
        first_height.min(content_height - 8.0),
    );

    for (title, lines) in &blocks {
        let height = improvement_height(lines);
        if height <= content_height {
            doc.ensure_space(height);
        } else {
            // Keep the title with at least the first suggestion line.
            doc.ensure_space(2.0 * IMPROVEMENT_LINE_MM);
        }
        doc.place(title.as_str(), LIST_X_MM, TextStyle::bold(BODY_SIZE_PT));
        doc.advance(IMPROVEMENT_LINE_MM);
        // Space is already reserved; per-line checks only bite for oversized blocks.
        doc.write_lines(
            lines,
            SUGGESTION_X_MM,
            TextStyle::regular(BODY_SIZE_PT),
            IMPROVEMENT_LINE_MM,
        );
        doc.advance(IMPROVEMENT_GAP_MM);
    }
}

/// Title line plus every wrapped suggestion line.
fn improvement_height(lines: &[String]) -> f32 {
    (1 + lines.len()) as f32 * IMPROVEMENT_LINE_MM
}
