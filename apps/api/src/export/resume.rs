//! Section renderers for the resume export.

use crate::export::{write_bullet, write_heading, BODY_SIZE_PT};
use crate::layout::font_metrics::FontFace;
use crate::layout::{wrap_text, DocumentBuilder, LaidOutDocument, PageGeometry, TextStyle};
use crate::models::resume::{ExperienceEntry, ResumeDocument};

pub const SUMMARY_HEADING: &str = "Summary";
pub const EXPERIENCE_HEADING: &str = "Experience";
pub const CONTACT_SEPARATOR: &str = " | ";

const HEADING_STYLE: TextStyle = TextStyle::bold(12.0);
const BODY: TextStyle = TextStyle::regular(BODY_SIZE_PT);

const LEFT_MM: f32 = 20.0;
const DETAIL_X_MM: f32 = 25.0;
const LINE_MM: f32 = 5.0;
const BLOCK_GAP_MM: f32 = 5.0;
const ENTRY_GAP_MM: f32 = 3.0;

pub fn layout_resume_document(resume: &ResumeDocument, geometry: PageGeometry) -> LaidOutDocument {
    let mut doc = DocumentBuilder::new(geometry);

    if let Some(name) = &resume.name {
        doc.write_line(name.as_str(), LEFT_MM, TextStyle::bold(18.0), 10.0);
    }
    write_contact_line(&mut doc, resume);
    if let Some(summary) = &resume.summary {
        write_summary(&mut doc, summary);
    }
    write_experience(&mut doc, &resume.experience);

    doc.finish()
}

fn write_contact_line(doc: &mut DocumentBuilder, resume: &ResumeDocument) {
    let fields = resume.contact_fields();
    if fields.is_empty() {
        return;
    }
    let width = doc.geometry().column_width_from(LEFT_MM);
    let lines = wrap_text(&fields.join(CONTACT_SEPARATOR), FontFace::Regular, BODY_SIZE_PT, width);
    doc.write_paragraph(&lines, LEFT_MM, BODY, LINE_MM);
    doc.advance(BLOCK_GAP_MM);
}

fn write_summary(doc: &mut DocumentBuilder, summary: &str) {
    let width = doc.geometry().column_width_from(LEFT_MM);
    let lines = wrap_text(summary, FontFace::Regular, BODY_SIZE_PT, width);
    if lines.is_empty() {
        return;
    }

    let paragraph_height = lines.len() as f32 * LINE_MM;
    let keep_height = if paragraph_height <= doc.geometry().content_height_mm() - 8.0 {
        paragraph_height
    } else {
        LINE_MM
    };
    write_heading(doc, SUMMARY_HEADING, HEADING_STYLE, keep_height);
    doc.write_paragraph(&lines, LEFT_MM, BODY, LINE_MM);
    doc.advance(BLOCK_GAP_MM);
}

fn write_experience(doc: &mut DocumentBuilder, entries: &[ExperienceEntry]) {
    let entries: Vec<&ExperienceEntry> = entries.iter().filter(|e| !is_blank(e)).collect();
    let Some(first) = entries.first() else {
        return;
    };

    write_heading(doc, EXPERIENCE_HEADING, HEADING_STYLE, entry_header_height(first));
    for entry in entries {
        write_entry(doc, entry);
    }
}

fn write_entry(doc: &mut DocumentBuilder, entry: &ExperienceEntry) {
    // Role and company move as one block, together with the first detail line.
    doc.ensure_space(entry_header_height(entry));

    if let Some(role) = &entry.role {
        doc.place(role.as_str(), LEFT_MM, TextStyle::bold(BODY_SIZE_PT));
        doc.advance(LINE_MM);
    }
    if let Some(company) = &entry.company {
        doc.place(company.as_str(), LEFT_MM, BODY);
        doc.advance(LINE_MM);
    }
    for detail in &entry.details {
        write_bullet(doc, detail, DETAIL_X_MM, BODY, LINE_MM);
    }
    doc.advance(ENTRY_GAP_MM);
}

fn entry_header_height(entry: &ExperienceEntry) -> f32 {
    let header_lines = usize::from(entry.role.is_some()) + usize::from(entry.company.is_some());
    let first_detail = usize::from(!entry.details.is_empty());
    (header_lines + first_detail) as f32 * LINE_MM
}

fn is_blank(entry: &ExperienceEntry) -> bool {
    entry.role.is_none() && entry.company.is_none() && entry.details.iter().all(|d| d.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(role: &str, company: &str, details: &[&str]) -> ExperienceEntry {
        ExperienceEntry {
            role: Some(role.to_string()),
            company: Some(company.to_string()),
            details: details.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn layout(resume: &ResumeDocument) -> LaidOutDocument {
        layout_resume_document(resume, PageGeometry::a4())
    }

    #[test]
    fn test_full_resume_order() {
        let resume = ResumeDocument {
            name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: None,
            location: Some("London".to_string()),
            summary: Some("Mathematician and first programmer.".to_string()),
            experience: vec![entry("Analyst", "Engine Works", &["Wrote the first program"])],
        };

        let doc = layout(&resume);
        assert_eq!(
            doc.lines(),
            vec![
                "Ada Lovelace",
                "ada@example.com | London",
                SUMMARY_HEADING,
                "Mathematician and first programmer.",
                EXPERIENCE_HEADING,
                "Analyst",
                "Engine Works",
                "\u{2022} Wrote the first program",
            ]
        );
    }

    #[test]
    fn test_empty_resume_yields_blank_page() {
        let doc = layout(&ResumeDocument::default());
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.lines().is_empty());
    }

    #[test]
    fn test_role_and_company_never_split_from_each_other() {
        let experience = (0..40)
            .map(|i| entry(&format!("Role {i}"), &format!("Company {i}"), &["Did things", "Did more things"]))
            .collect();
        let resume = ResumeDocument {
            experience,
            ..Default::default()
        };

        let doc = layout(&resume);
        assert!(doc.pages.len() > 1);
        for page in &doc.pages {
            let last = page.runs.last().unwrap();
            assert!(!last.text.starts_with("Role "), "role orphaned: {}", last.text);
            assert!(!last.text.starts_with("Company "), "company orphaned: {}", last.text);
        }
        for run in doc.runs() {
            assert!(run.y_mm <= doc.geometry.bottom_limit_mm());
        }
    }

    #[test]
    fn test_long_summary_wraps_and_stays_with_heading() {
        let summary = "Seasoned engineer with a record of shipping reliable systems. ".repeat(12);
        let resume = ResumeDocument {
            summary: Some(summary),
            ..Default::default()
        };

        let doc = layout(&resume);
        let lines = doc.lines();
        assert_eq!(lines[0], SUMMARY_HEADING);
        assert!(lines.len() > 3);
        let metrics = crate::layout::font_metrics::get_metrics(FontFace::Regular);
        for run in doc.runs().skip(1) {
            assert!(run.x_mm + metrics.width_mm(&run.text, BODY_SIZE_PT) <= 190.0 + 1e-3);
        }
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let resume = ResumeDocument {
            experience: vec![ExperienceEntry::default()],
            ..Default::default()
        };
        assert!(layout(&resume).lines().is_empty());
    }

    #[test]
    fn test_long_detail_wraps_with_hanging_indent() {
        let detail = "Led the migration of forty services to a shared deployment pipeline, \
                      cutting release time from days to under an hour across every team";
        let resume = ResumeDocument {
            experience: vec![entry("Lead", "Acme", &[detail])],
            ..Default::default()
        };

        let doc = layout(&resume);
        let detail_runs: Vec<_> = doc.runs().filter(|r| r.x_mm >= DETAIL_X_MM).collect();
        assert!(detail_runs.len() >= 2);
        assert!(detail_runs[0].text.starts_with('\u{2022}'));
        assert!(detail_runs[1].x_mm > DETAIL_X_MM);
    }
}
