// Typed view of the JSON report produced by the agent pipeline.
//
// The pipeline is an LLM, so the payload is validated exactly once, here:
// every field is optional on the way in, missing or mistyped fields become
// blank strings, and each section is padded or cut to the number of slots
// the template has. Everything downstream can index without guards.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

pub const DATA_SIGNAL_GROUPS: usize = 3;
pub const SIGNALS_PER_GROUP: usize = 5;
pub const PERSONA_SLOTS: usize = 6;
pub const INSIGHT_SLOTS: usize = 3;
pub const RECOMMENDATION_SLOTS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("No JSON object found in report output")]
    MissingJson,
    #[error("Report JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Report provider error: {0}")]
    Provider(String),
    #[error("Report generation is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSignalGroup {
    pub title: String,
    pub signals: Vec<String>,
}

/// A missing group still fills every signal slot of the template.
impl Default for DataSignalGroup {
    fn default() -> Self {
        Self {
            title: String::new(),
            signals: vec![String::new(); SIGNALS_PER_GROUP],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Persona {
    pub title: String,
    pub description: String,
    pub segments: String,
    pub target_profiles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TitledText {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaplanReport {
    pub cohort_definition: String,
    pub data_signals: Vec<DataSignalGroup>,
    pub personas: Vec<Persona>,
    pub insights: Vec<TitledText>,
    pub recommendations: Vec<TitledText>,
    pub competitive_advantage: String,
}

impl MediaplanReport {
    /// Builds a report from arbitrary JSON, tolerating missing fields.
    pub fn from_value(value: &Value) -> Self {
        let data_signals = items(value, "data_signals", DATA_SIGNAL_GROUPS, |group| {
            DataSignalGroup {
                title: text(group, "title"),
                signals: padded(
                    list(group, "data_signals").into_iter().map(|v| scalar(&v)),
                    SIGNALS_PER_GROUP,
                ),
            }
        });

        let personas = items(value, "personas", PERSONA_SLOTS, |persona| Persona {
            title: text(persona, "title"),
            description: text(persona, "description"),
            segments: text(persona, "segments"),
            target_profiles: list(persona, "target_profiles")
                .iter()
                .map(scalar)
                .filter(|p| !p.trim().is_empty())
                .collect(),
        });

        Self {
            cohort_definition: text(value, "cohort_definition"),
            data_signals,
            personas,
            insights: items(value, "insights", INSIGHT_SLOTS, titled),
            recommendations: items(value, "recommendations", RECOMMENDATION_SLOTS, titled),
            competitive_advantage: text(value, "competitive_advantage"),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    /// Parses the first fenced ```json block in `markdown`, or the whole text
    /// when it is bare JSON.
    pub fn from_markdown(markdown: &str) -> Result<Self, ReportError> {
        static FENCED_JSON: OnceLock<Regex> = OnceLock::new();
        let re = FENCED_JSON.get_or_init(|| {
            Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("static regex is valid")
        });

        if let Some(captures) = re.captures(markdown) {
            return Self::from_json(&captures[1]);
        }

        let trimmed = markdown.trim();
        if trimmed.starts_with('{') {
            return Self::from_json(trimmed);
        }

        Err(ReportError::MissingJson)
    }
}

fn titled(value: &Value) -> TitledText {
    TitledText {
        title: text(value, "title"),
        description: text(value, "description"),
    }
}

/// String form of a field; numbers are stringified, anything else is blank.
fn text(value: &Value, key: &str) -> String {
    value.get(key).map(scalar).unwrap_or_default()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn list(value: &Value, key: &str) -> Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn items<T: Default>(value: &Value, key: &str, slots: usize, map: impl Fn(&Value) -> T) -> Vec<T> {
    padded(list(value, key).iter().map(map), slots)
}

fn padded<T: Default>(iter: impl Iterator<Item = T>, slots: usize) -> Vec<T> {
    let mut out: Vec<T> = iter.take(slots).collect();
    out.resize_with(slots, T::default);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_sections_are_padded_blank() {
        let report = MediaplanReport::from_value(&json!({
            "cohort_definition": "Frequent flyers",
            "personas": [{"title": "✈️\nRoad Warrior", "segments": 12}]
        }));

        assert_eq!(report.cohort_definition, "Frequent flyers");
        assert_eq!(report.data_signals.len(), DATA_SIGNAL_GROUPS);
        assert!(report
            .data_signals
            .iter()
            .all(|g| g.signals.len() == SIGNALS_PER_GROUP));
        assert_eq!(report.personas.len(), PERSONA_SLOTS);
        assert_eq!(report.personas[0].segments, "12");
        assert_eq!(report.personas[1].title, "");
        assert_eq!(report.insights.len(), INSIGHT_SLOTS);
        assert_eq!(report.recommendations.len(), RECOMMENDATION_SLOTS);
    }

    #[test]
    fn test_absent_signal_groups_get_blank_signals() {
        let report = MediaplanReport::from_value(&json!({
            "data_signals": [{"title": "Travel", "data_signals": ["Books flights"]}]
        }));

        assert_eq!(report.data_signals[0].signals[0], "Books flights");
        assert_eq!(report.data_signals[0].signals.len(), SIGNALS_PER_GROUP);
        for group in &report.data_signals[1..] {
            assert_eq!(group.title, "");
            assert_eq!(group.signals, vec![String::new(); SIGNALS_PER_GROUP]);
        }
    }

    #[test]
    fn test_extra_items_are_cut() {
        let report = MediaplanReport::from_value(&json!({
            "insights": [
                {"title": "1"}, {"title": "2"}, {"title": "3"}, {"title": "4"}
            ]
        }));
        assert_eq!(report.insights.len(), 3);
        assert_eq!(report.insights[2].title, "3");
    }

    #[test]
    fn test_from_markdown_reads_fenced_block() {
        let markdown = "# Final report\n\nSome prose.\n\n```json\n{\"cohort_definition\": \"Gamers\"}\n```\n";
        let report = MediaplanReport::from_markdown(markdown).unwrap();
        assert_eq!(report.cohort_definition, "Gamers");
    }

    #[test]
    fn test_from_markdown_accepts_bare_json() {
        let report = MediaplanReport::from_markdown("  {\"competitive_advantage\": \"Reach\"} ").unwrap();
        assert_eq!(report.competitive_advantage, "Reach");
    }

    #[test]
    fn test_from_markdown_without_json_fails() {
        assert!(matches!(
            MediaplanReport::from_markdown("no data here"),
            Err(ReportError::MissingJson)
        ));
    }

    #[test]
    fn test_blank_profiles_dropped() {
        let report = MediaplanReport::from_value(&json!({
            "personas": [{"target_profiles": ["Students", " ", "Parents"]}]
        }));
        assert_eq!(report.personas[0].target_profiles, vec!["Students", "Parents"]);
    }
}
