//! Workflow progress model and the completion percentage.
//!
//! Shapes are read permissively from `serde_json::Value`: a field of the
//! wrong type is treated as absent, a non-object where a record is expected
//! is treated as an empty record. Nothing here returns an error.

use serde_json::{Map, Value};

use crate::normalize::{as_number, text};

/// Status glyph that marks a step as done regardless of its count.
pub const DONE_GLYPH: &str = "✅";
pub const NOT_DONE_GLYPH: &str = "❌";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    /// Raw count as it appeared in the document. See [`StepRecord::count`].
    pub count: Option<Value>,
    pub last_activity: Option<String>,
}

impl StepRecord {
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        Self {
            id: label(map.get("id")),
            title: text(map.get("title")),
            status: map.get("status").and_then(Value::as_str).map(str::to_string),
            count: map.get("count").filter(|v| !v.is_null()).cloned(),
            last_activity: label(map.get("last_activity")),
        }
    }

    /// Shorthand used by tests and callers building steps by hand.
    pub fn with_count(count: f64) -> Self {
        Self {
            count: serde_json::Number::from_f64(count).map(Value::Number),
            ..Self::default()
        }
    }

    /// Numeric count; absent or non-numeric is `None`.
    pub fn count(&self) -> Option<f64> {
        self.count.as_ref().and_then(as_number)
    }

    /// Contribution to the progress sum: never negative.
    pub fn weight(&self) -> f64 {
        self.count().unwrap_or(0.0).max(0.0)
    }

    /// Done iff the status is the completion glyph or the count is positive.
    pub fn is_done(&self) -> bool {
        self.status.as_deref() == Some(DONE_GLYPH) || self.count().is_some_and(|c| c > 0.0)
    }

    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| crate::normalize::PLACEHOLDER.to_string())
    }
}

/// Completion percentage for a list of steps.
///
/// With a finite positive `steps_total` the summed counts are measured
/// against it; otherwise every step is worth 1 and the denominator is the
/// step count (at least 1). The result is rounded half away from zero and
/// clamped to `0..=100`.
pub fn compute_percent(steps: &[StepRecord], steps_total: Option<f64>) -> u8 {
    let total_count: f64 = steps.iter().map(StepRecord::weight).sum();
    let denom = match steps_total {
        Some(t) if t.is_finite() && t > 0.0 => t,
        _ => steps.len().max(1) as f64,
    };
    let percent = (total_count / denom * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoachingEntry {
    /// Key under which the entry appeared in `coachings`.
    pub id: String,
    pub title: Option<String>,
    pub steps_target: Option<Value>,
    pub steps_metric: Option<Value>,
    pub in_control: Option<Value>,
    pub last_activity: Option<Value>,
    pub steps: Vec<StepRecord>,
    pub steps_total: Option<f64>,
}

impl CoachingEntry {
    pub fn from_value(id: &str, value: &Value) -> Self {
        let empty = Map::new();
        let map = value.as_object().unwrap_or(&empty);
        let steps = match map.get("steps") {
            Some(Value::Array(items)) => items.iter().map(StepRecord::from_value).collect(),
            _ => Vec::new(),
        };
        Self {
            id: id.to_string(),
            title: text(map.get("title")),
            steps_target: map.get("steps_target").cloned(),
            steps_metric: map.get("steps_metric").cloned(),
            in_control: map.get("in_control").cloned(),
            last_activity: map.get("last_activity").cloned(),
            steps,
            steps_total: map.get("steps_total").and_then(as_number),
        }
    }

    pub fn percent(&self) -> u8 {
        compute_percent(&self.steps, self.steps_total)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillTrack {
    pub name: Option<String>,
    pub code: Option<String>,
    pub status: Option<String>,
    pub last_update: Option<String>,
    /// In document order.
    pub coachings: Vec<CoachingEntry>,
}

impl SkillTrack {
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let coachings = match map.get("coachings") {
            Some(Value::Object(entries)) => entries
                .iter()
                .map(|(id, entry)| CoachingEntry::from_value(id, entry))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            name: text(map.get("skill_track_name")),
            code: text(map.get("skill_track_code")),
            status: map
                .get("skill_status")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            last_update: label(map.get("skill_track_last_update_date")),
            coachings,
        }
    }

    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.code.as_deref())
            .unwrap_or("Skill")
    }
}

/// Skill tracks of a progress document. An empty result means the document
/// had no usable `skills` sequence.
pub fn parse_progress(doc: &Value) -> Vec<SkillTrack> {
    match doc.get("skills") {
        Some(Value::Array(skills)) => skills.iter().map(SkillTrack::from_value).collect(),
        _ => Vec::new(),
    }
}

/// Non-empty string, or a number rendered as text.
fn label(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Number(n)) => Some(n.to_string()),
        other => text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn counts(cs: &[f64]) -> Vec<StepRecord> {
        cs.iter().copied().map(StepRecord::with_count).collect()
    }

    #[test]
    fn empty_steps_is_zero() {
        assert_eq!(compute_percent(&[], None), 0);
        assert_eq!(compute_percent(&[], Some(10.0)), 0);
    }

    #[test]
    fn declared_total_is_the_denominator() {
        assert_eq!(compute_percent(&counts(&[3.0, 7.0]), Some(10.0)), 100);
        assert_eq!(compute_percent(&counts(&[1.0]), Some(2.0)), 50);
        assert_eq!(compute_percent(&counts(&[1.0]), Some(3.0)), 33);
    }

    #[test]
    fn missing_total_weights_each_step() {
        assert_eq!(compute_percent(&counts(&[1.0, 1.0, 0.0]), None), 67);
        assert_eq!(compute_percent(&counts(&[0.0, 0.0]), None), 0);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 1/8 = 12.5%
        assert_eq!(compute_percent(&counts(&[1.0]), Some(8.0)), 13);
        // 3/8 = 37.5%
        assert_eq!(compute_percent(&counts(&[3.0]), Some(8.0)), 38);
    }

    #[test]
    fn non_positive_total_falls_back() {
        let steps = counts(&[1.0, 0.0]);
        let fallback = compute_percent(&steps, None);
        assert_eq!(fallback, 50);
        assert_eq!(compute_percent(&steps, Some(0.0)), fallback);
        assert_eq!(compute_percent(&steps, Some(-5.0)), fallback);
        assert_eq!(compute_percent(&steps, Some(f64::NAN)), fallback);
        assert_eq!(compute_percent(&steps, Some(f64::INFINITY)), fallback);
    }

    #[test]
    fn clamps_to_hundred() {
        assert_eq!(compute_percent(&counts(&[1000.0]), Some(10.0)), 100);
        assert_eq!(compute_percent(&counts(&[5.0]), None), 100);
    }

    #[test]
    fn negative_and_junk_counts_contribute_nothing() {
        let steps = vec![
            StepRecord::from_value(&json!({"count": -4})),
            StepRecord::from_value(&json!({"count": "abc"})),
            StepRecord::from_value(&json!({"count": "2"})),
            StepRecord::from_value(&json!({})),
        ];
        assert_eq!(compute_percent(&steps, Some(4.0)), 50);
    }

    #[test]
    fn done_by_glyph_or_positive_count() {
        assert!(StepRecord::from_value(&json!({"status": "✅"})).is_done());
        assert!(StepRecord::from_value(&json!({"count": 2})).is_done());
        assert!(StepRecord::from_value(&json!({"count": "1"})).is_done());
        assert!(!StepRecord::from_value(&json!({"count": 0})).is_done());
        assert!(!StepRecord::from_value(&json!({"status": "❌", "count": 0})).is_done());
        assert!(!StepRecord::from_value(&json!({"status": "done"})).is_done());
        assert!(!StepRecord::from_value(&json!("garbage")).is_done());
    }

    #[test]
    fn step_title_falls_back_to_id() {
        let s = StepRecord::from_value(&json!({"id": "s1"}));
        assert_eq!(s.display_title(), "s1");
        let s = StepRecord::from_value(&json!({"id": "s1", "title": "Walk"}));
        assert_eq!(s.display_title(), "Walk");
    }

    #[test]
    fn coaching_entry_tolerates_bad_steps() {
        let e = CoachingEntry::from_value("c1", &json!({"steps": "oops", "steps_total": "4"}));
        assert!(e.steps.is_empty());
        assert_eq!(e.steps_total, Some(4.0));
        assert_eq!(e.percent(), 0);
        assert_eq!(e.display_title(), "c1");
    }

    #[test]
    fn coachings_keep_document_order() {
        let skill = SkillTrack::from_value(&json!({
            "skill_track_code": "RUN",
            "coachings": {"zeta": {}, "alpha": {}, "mid": {}}
        }));
        let ids: Vec<_> = skill.coachings.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);
        assert_eq!(skill.label(), "RUN");
    }

    #[test]
    fn steps_keep_document_order() {
        let e = CoachingEntry::from_value(
            "c",
            &json!({"steps": [{"id": "b"}, {"id": "a"}, {"id": "b"}]}),
        );
        let ids: Vec<_> = e.steps.iter().map(|s| s.id.clone().unwrap_or_default()).collect();
        assert_eq!(ids, ["b", "a", "b"]);
    }

    #[test]
    fn skills_must_be_a_sequence() {
        assert!(parse_progress(&json!({"skills": "oops"})).is_empty());
        assert!(parse_progress(&json!({})).is_empty());
        assert!(parse_progress(&json!([])).is_empty());
        assert_eq!(parse_progress(&json!({"skills": [{}, 3]})).len(), 2);
        assert_eq!(SkillTrack::from_value(&json!(3)).label(), "Skill");
    }

    #[test]
    fn blank_skill_status_is_dropped() {
        let s = SkillTrack::from_value(&json!({"skill_status": "   "}));
        assert_eq!(s.status, None);
        let s = SkillTrack::from_value(&json!({"skill_status": " active "}));
        assert_eq!(s.status.as_deref(), Some("active"));
    }
}
