//! One conversion from whatever the store holds to a [`RuleList`].
//!
//! Two schemas exist in the wild: the current `rules` key holding
//! `[{type, value}]`, and the legacy `selectors` key holding plain selector
//! strings. Both the trigger read path and the editor save path go through
//! [`normalize`], so migration logic lives here only.
use serde_json::Value;

use crate::rules::types::{Rule, RuleList};

/// Storage key of the current schema.
pub const RULES_KEY: &str = "rules";

/// Storage key of the legacy selector-string schema.
pub const LEGACY_SELECTORS_KEY: &str = "selectors";

/// Converts a stored value into rules.
///
/// - An object whose `rules` is truthy in the JavaScript sense uses it, even
///   when it is an empty array. `null`, `false`, `0` and `""` fall through.
/// - Otherwise an object with `selectors` maps each string to a selector rule.
/// - A bare array is read as a rule array, so `normalize` accepts its own output.
/// - Anything else is an empty list.
///
/// Malformed entries are skipped. Applying `normalize` to the serialized
/// result yields the same list.
pub fn normalize(raw: &Value) -> RuleList {
    match raw {
        Value::Object(map) => match map.get(RULES_KEY).filter(|v| is_truthy(v)) {
            Some(rules) => parse_rule_array(rules),
            None => map
                .get(LEGACY_SELECTORS_KEY)
                .map(parse_rule_array)
                .unwrap_or_default(),
        },
        Value::Array(_) => parse_rule_array(raw),
        _ => RuleList::default(),
    }
}

/// Legacy selector strings held under `selectors`, if that key has the old shape.
pub fn legacy_selectors(raw: &Value) -> Option<Vec<String>> {
    let items = raw.get(LEGACY_SELECTORS_KEY)?.as_array()?;
    if !items.first().is_some_and(Value::is_string) {
        return None;
    }
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
    )
}

/// JavaScript truthiness of a stored value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_rule_array(value: &Value) -> RuleList {
    let Some(items) = value.as_array() else {
        tracing::warn!(found = %kind_of(value), "stored rules are not an array; ignoring");
        return RuleList::default();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| parse_rule(index, item))
        .collect()
}

fn parse_rule(index: usize, item: &Value) -> Option<Rule> {
    match item {
        Value::String(selector) => Some(Rule::selector(selector.clone())),
        Value::Object(_) => match serde_json::from_value::<Rule>(item.clone()) {
            Ok(rule) => Some(rule),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed stored rule");
                None
            }
        },
        other => {
            tracing::warn!(index, found = %kind_of(other), "skipping stored rule of unexpected shape");
            None
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::types::RuleKind;
    use serde_json::json;

    #[test]
    fn legacy_selectors_become_selector_rules() {
        let list = normalize(&json!({"selectors": ["a.btn", "#x"]}));
        assert_eq!(
            list,
            RuleList::new(vec![Rule::selector("a.btn"), Rule::selector("#x")])
        );
    }

    #[test]
    fn normalizing_the_output_again_changes_nothing() {
        let once = normalize(&json!({"selectors": ["a.btn", "#x"]}));
        let as_stored = serde_json::to_value(&once).unwrap();

        assert_eq!(normalize(&as_stored), once);
        assert_eq!(normalize(&json!({ "rules": as_stored })), once);
    }

    #[test]
    fn rules_key_wins_even_when_empty() {
        let list = normalize(&json!({"rules": [], "selectors": ["#legacy"]}));
        assert!(list.is_empty());

        let list = normalize(&json!({"rules": null, "selectors": ["#legacy"]}));
        assert_eq!(list, RuleList::new(vec![Rule::selector("#legacy")]));
    }

    #[test]
    fn missing_or_odd_input_is_empty() {
        assert!(normalize(&json!({})).is_empty());
        assert!(normalize(&Value::Null).is_empty());
        assert!(normalize(&json!("button")).is_empty());
        assert!(normalize(&json!({"rules": {"type": "text"}})).is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped_in_place() {
        let list = normalize(&json!({"rules": [
            {"type": "text", "value": "Next"},
            {"type": "selector"},
            42,
            "#plain",
            {"type": "xpath", "value": "//a"}
        ]}));
        assert_eq!(
            list.into_rules(),
            vec![
                Rule::text("Next"),
                Rule::selector("#plain"),
                Rule {
                    kind: RuleKind::Unknown("xpath".into()),
                    value: "//a".into()
                },
            ]
        );
    }

    #[test]
    fn detects_legacy_shape_by_first_entry() {
        assert_eq!(
            legacy_selectors(&json!({"selectors": ["a", "b"]})),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(legacy_selectors(&json!({"selectors": []})), None);
        assert_eq!(
            legacy_selectors(&json!({"selectors": [{"type": "text", "value": "x"}]})),
            None
        );
        assert_eq!(legacy_selectors(&json!({"rules": []})), None);
    }

    #[test]
    fn falsy_rules_fall_back_to_selectors() {
        for falsy in [json!(null), json!(false), json!(0), json!(""), json!(0.0)] {
            let raw = json!({"rules": falsy, "selectors": ["#legacy"]});
            assert_eq!(
                normalize(&raw),
                RuleList::new(vec![Rule::selector("#legacy")]),
                "rules = {falsy}"
            );
        }
        // Truthy non-arrays still win, and hold no readable rules.
        assert!(normalize(&json!({"rules": "x", "selectors": ["#legacy"]})).is_empty());
    }
}
