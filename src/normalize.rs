//! Field-level normalization for loosely structured documents.
//!
//! Upstream files are produced by hand and by scripts, so the same concept
//! shows up as a boolean, an emoji or a word. Everything here is total: bad
//! input degrades to `Unknown`, `None` or the display placeholder.

use serde_json::Value;

/// Shown in place of a missing or empty field.
pub const PLACEHOLDER: &str = "—";

const TRUE_TOKENS: [&str; 7] = ["✅", "✔️", "🟢", "true", "ok", "yes", "y"];
const FALSE_TOKENS: [&str; 7] = ["❌", "⛔", "🔴", "false", "no", "n", "😭"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    True,
    False,
    Unknown,
}

impl TriState {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::True => Some(true),
            TriState::False => Some(false),
            TriState::Unknown => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(b: bool) -> Self {
        if b {
            TriState::True
        } else {
            TriState::False
        }
    }
}

/// Map a boolean, glyph or word onto true / false / unknown.
pub fn normalize_tri_state(value: &Value) -> TriState {
    match value {
        Value::Bool(b) => TriState::from(*b),
        Value::String(s) => {
            let token = s.trim().to_lowercase();
            if TRUE_TOKENS.contains(&token.as_str()) {
                TriState::True
            } else if FALSE_TOKENS.contains(&token.as_str()) {
                TriState::False
            } else {
                TriState::Unknown
            }
        }
        _ => TriState::Unknown,
    }
}

/// Label for a coaching entry's `in_control` field. Unrecognized values are
/// shown as-is so the reader can see what the data actually says.
pub fn in_control_label(raw: Option<&Value>) -> String {
    match raw.map(normalize_tri_state).and_then(TriState::as_bool) {
        Some(true) => "in control".to_string(),
        Some(false) => "out of control".to_string(),
        None => display(raw),
    }
}

/// Numeric coercion. Accepts JSON numbers and numeric strings; everything
/// else, and non-finite results, is `None`.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                t.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

/// Display form of an optional field, falling back to [`PLACEHOLDER`].
pub fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => PLACEHOLDER.to_string(),
        Some(Value::String(s)) if s.is_empty() => PLACEHOLDER.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Non-empty string field, or `None`.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn true_tokens_any_case_and_padding() {
        for t in [
            "✅", "✔️", "🟢", "true", "ok", "yes", "y", " TRUE ", "Ok", "\tYes\n", "Y",
        ] {
            assert_eq!(normalize_tri_state(&json!(t)), TriState::True, "{t:?}");
        }
    }

    #[test]
    fn false_tokens_any_case_and_padding() {
        for t in ["❌", "⛔", "🔴", "false", "no", "n", "😭", " False", "NO ", "N"] {
            assert_eq!(normalize_tri_state(&json!(t)), TriState::False, "{t:?}");
        }
    }

    #[test]
    fn native_booleans_pass_through() {
        assert_eq!(normalize_tri_state(&json!(true)), TriState::True);
        assert_eq!(normalize_tri_state(&json!(false)), TriState::False);
    }

    #[test]
    fn everything_else_is_unknown() {
        assert_eq!(normalize_tri_state(&json!(42)), TriState::Unknown);
        assert_eq!(normalize_tri_state(&json!("maybe")), TriState::Unknown);
        assert_eq!(normalize_tri_state(&json!("")), TriState::Unknown);
        assert_eq!(normalize_tri_state(&Value::Null), TriState::Unknown);
        assert_eq!(normalize_tri_state(&json!({"v": true})), TriState::Unknown);
        assert_eq!(normalize_tri_state(&json!([true])), TriState::Unknown);
    }

    #[test]
    fn in_control_label_falls_back_to_raw() {
        assert_eq!(in_control_label(Some(&json!("🟢"))), "in control");
        assert_eq!(in_control_label(Some(&json!(false))), "out of control");
        assert_eq!(in_control_label(Some(&json!("meh"))), "meh");
        assert_eq!(in_control_label(None), PLACEHOLDER);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(as_number(&json!(3)), Some(3.0));
        assert_eq!(as_number(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!("")), None);
        assert_eq!(as_number(&json!(true)), None);
        assert_eq!(as_number(&Value::Null), None);
        assert_eq!(as_number(&json!("inf")), None);
    }

    #[test]
    fn display_placeholder_rules() {
        assert_eq!(display(None), PLACEHOLDER);
        assert_eq!(display(Some(&Value::Null)), PLACEHOLDER);
        assert_eq!(display(Some(&json!(""))), PLACEHOLDER);
        assert_eq!(display(Some(&json!(0))), "0");
        assert_eq!(display(Some(&json!(10000))), "10000");
        assert_eq!(display(Some(&json!("steps"))), "steps");
        assert_eq!(display(Some(&json!([1, 2]))), "[1,2]");
    }
}
