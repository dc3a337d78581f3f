use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of priority improvements rendered in an exported report.
pub const MAX_PRIORITY_IMPROVEMENTS: usize = 5;

/// Analysis overview as returned by `GET /analysis/overview`.
///
/// Every list field may be absent in the backend payload; absent and empty are
/// treated the same way downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub grade: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub section_analysis: SectionAnalysis,
    #[serde(default, deserialize_with = "null_as_default")]
    pub improvements: Improvements,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Improvements {
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority_improvements: Vec<PriorityImprovement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityImprovement {
    pub section: String,
    pub suggestion: String,
    #[serde(default)]
    pub impact: String,
}

/// Section scores keyed by section name, in the order the backend sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionAnalysis(pub Vec<(String, SectionScore)>);

impl SectionAnalysis {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionScore)> {
        self.0.iter().map(|(name, score)| (name.as_str(), score))
    }
}

impl Serialize for SectionAnalysis {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, score)| (name, score)))
    }
}

impl<'de> Deserialize<'de> for SectionAnalysis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedSections;

        impl<'de> Visitor<'de> for OrderedSections {
            type Value = SectionAnalysis;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of section name to section score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut sections = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, score)) = map.next_entry::<String, Option<SectionScore>>()? {
                    // Sections the backend could not score come through as null.
                    if let Some(score) = score {
                        sections.push((name, score));
                    }
                }
                Ok(SectionAnalysis(sections))
            }
        }

        deserializer.deserialize_map(OrderedSections)
    }
}

/// A per-section sub-score.
///
/// The backend emits two conventions under the same shape: a bare `score` that
/// is a 0–1 fraction, or a `score` out of `max_score`. The variant records which
/// one was received so the percentage is never computed under the wrong one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionScore {
    Fraction(f64),
    Absolute { score: f64, max: f64 },
}

#[derive(Serialize, Deserialize)]
struct RawSectionScore {
    #[serde(default)]
    score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_score: Option<f64>,
}

impl<'de> Deserialize<'de> for SectionScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawSectionScore::deserialize(deserializer)?;
        Ok(match raw.max_score {
            // A zero max is falsy on the producer side and means "no max".
            Some(max) if max != 0.0 => SectionScore::Absolute {
                score: raw.score,
                max,
            },
            _ => SectionScore::Fraction(raw.score),
        })
    }
}

impl Serialize for SectionScore {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match *self {
            SectionScore::Fraction(score) => RawSectionScore {
                score,
                max_score: None,
            },
            SectionScore::Absolute { score, max } => RawSectionScore {
                score,
                max_score: Some(max),
            },
        };
        raw.serialize(serializer)
    }
}

impl SectionScore {
    /// Whole-number percentage shown in reports. May exceed 100.
    pub fn percentage(&self) -> i64 {
        match *self {
            SectionScore::Fraction(fraction) => round_half_up(fraction * 100.0),
            SectionScore::Absolute { score, max } => round_half_up(score / max * 100.0),
        }
    }
}

/// Rounds .5 toward positive infinity, the way the dashboard rounds scores.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_score_without_max_is_fraction() {
        let score: SectionScore = serde_json::from_value(json!({ "score": 0.8 })).unwrap();
        assert_eq!(score, SectionScore::Fraction(0.8));
        assert_eq!(score.percentage(), 80);
    }

    #[test]
    fn test_section_score_with_max_is_absolute() {
        let score: SectionScore =
            serde_json::from_value(json!({ "score": 45, "max_score": 50 })).unwrap();
        assert_eq!(
            score,
            SectionScore::Absolute {
                score: 45.0,
                max: 50.0
            }
        );
        assert_eq!(score.percentage(), 90);
    }

    #[test]
    fn test_zero_max_score_falls_back_to_fraction() {
        let score: SectionScore =
            serde_json::from_value(json!({ "score": 0.5, "max_score": 0 })).unwrap();
        assert_eq!(score, SectionScore::Fraction(0.5));
        assert_eq!(score.percentage(), 50);
    }

    #[test]
    fn test_percentage_boundaries_absolute() {
        let zero = SectionScore::Absolute { score: 0.0, max: 20.0 };
        let full = SectionScore::Absolute { score: 20.0, max: 20.0 };
        let over = SectionScore::Absolute { score: 30.0, max: 20.0 };
        assert_eq!(zero.percentage(), 0);
        assert_eq!(full.percentage(), 100);
        assert_eq!(over.percentage(), 150);
    }

    #[test]
    fn test_percentage_boundaries_fraction() {
        assert_eq!(SectionScore::Fraction(0.0).percentage(), 0);
        assert_eq!(SectionScore::Fraction(1.0).percentage(), 100);
        assert_eq!(SectionScore::Fraction(1.25).percentage(), 125);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(SectionScore::Absolute { score: 1.0, max: 8.0 }.percentage(), 13);
        assert_eq!(SectionScore::Fraction(0.333).percentage(), 33);
        assert_eq!(round_half_up(72.4), 72);
        assert_eq!(round_half_up(72.5), 73);
        assert_eq!(round_half_up(-0.5), 0);
    }

    #[test]
    fn test_section_analysis_preserves_backend_order() {
        let report: AnalysisReport = serde_json::from_value(json!({
            "overall_score": 60,
            "grade": "C",
            "section_analysis": {
                "skills": { "score": 0.8 },
                "experience": { "score": 45, "max_score": 50 },
                "contact": { "score": 1.0 }
            }
        }))
        .unwrap();
        let names: Vec<&str> = report.section_analysis.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["skills", "experience", "contact"]);
    }

    #[test]
    fn test_missing_and_null_lists_decode_as_empty() {
        let report: AnalysisReport = serde_json::from_value(json!({
            "overall_score": 50,
            "grade": "D",
            "strengths": null,
            "section_analysis": { "projects": null },
            "improvements": null
        }))
        .unwrap();
        assert!(report.strengths.is_empty());
        assert!(report.weaknesses.is_empty());
        assert!(report.section_analysis.is_empty());
        assert!(report.improvements.priority_improvements.is_empty());
    }

    #[test]
    fn test_section_score_serializes_back_to_wire_shape() {
        let value = serde_json::to_value(SectionScore::Absolute { score: 3.0, max: 4.0 }).unwrap();
        assert_eq!(value, json!({ "score": 3.0, "max_score": 4.0 }));
        let value = serde_json::to_value(SectionScore::Fraction(0.5)).unwrap();
        assert_eq!(value, json!({ "score": 0.5 }));
    }
}
