use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A parsed resume as returned by the backend's resume endpoints.
///
/// The backend payload is loosely typed, so decoding never fails on shape:
/// numbers are stringified, blank strings and wrong-typed fields become `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeDocument {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub experience: Vec<ExperienceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExperienceEntry {
    pub role: Option<String>,
    pub company: Option<String>,
    pub details: Vec<String>,
}

impl ResumeDocument {
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(lenient_string);
        let experience = value
            .get("experience")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(ExperienceEntry::from_value).collect())
            .unwrap_or_default();

        ResumeDocument {
            name: field("name"),
            email: field("email"),
            phone: field("phone"),
            location: field("location"),
            summary: field("summary"),
            experience,
        }
    }

    /// Contact fields that are present, in display order.
    pub fn contact_fields(&self) -> Vec<&str> {
        [&self.email, &self.phone, &self.location]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .collect()
    }
}

impl ExperienceEntry {
    pub fn from_value(value: &Value) -> Self {
        let details = value
            .get("details")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(lenient_string).collect())
            .unwrap_or_default();

        ExperienceEntry {
            role: value.get("role").and_then(lenient_string),
            company: value.get("company").and_then(lenient_string),
            details,
        }
    }
}

impl<'de> Deserialize<'de> for ResumeDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(ResumeDocument::from_value(&value))
    }
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
