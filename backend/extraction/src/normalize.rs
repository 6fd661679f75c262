//! Tolerant normalization of the vision model's JSON output.
//!
//! The model is asked for a bare JSON array of `{name, description}` objects
//! but does not reliably honor that: the array may arrive fenced in
//! markdown, wrapped under an unexpected key, or collapsed to a single
//! object. Each stage here is a best-effort recovery step. Their order
//! decides which data wins when a response contains more than one plausible
//! array, so it must not change.

use menulens_core::DishRecord;
use serde_json::Value;
use thiserror::Error;

/// Keys checked, in priority order, for the dish array inside an object
/// response.
const ARRAY_KEYS: [&str; 3] = ["items", "menu_items", "dishes"];

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The response text was not JSON at all. Terminal: no partial recovery
    /// of malformed text is attempted.
    #[error("response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Run the full recovery chain over the model's raw response text.
///
/// Emptiness and the placeholder sentinel are a consumption-time concern;
/// only structural filtering happens here.
pub fn normalize(raw_text: &str) -> Result<Vec<DishRecord>, NormalizeError> {
    let parsed: Value = serde_json::from_str(strip_fences(raw_text))?;
    let records = coerce_to_list(locate_dish_array(&parsed))
        .into_iter()
        .filter_map(dish_from_value)
        .collect();
    Ok(records)
}

/// Strip a leading ```` ```json ```` marker and/or a trailing ```` ``` ````
/// marker. Tolerates the marker being present on only one side.
fn strip_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

/// Locate the value most plausibly holding the dish list.
///
/// Priority: `items`, then `menu_items`, then `dishes`; a bare array is used
/// directly; otherwise the first non-empty array-valued field in the
/// document's own key order wins. A priority key always takes its value,
/// whatever the type; the later coercion stage decides what that value is
/// worth.
fn locate_dish_array(parsed: &Value) -> Option<&Value> {
    match parsed {
        Value::Object(map) => ARRAY_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .or_else(|| {
                map.values()
                    .find(|value| value.as_array().is_some_and(|a| !a.is_empty()))
            }),
        Value::Array(_) => Some(parsed),
        _ => None,
    }
}

/// Shape coercion: a lone object wraps into a one-element list; anything
/// else that is not an array yields nothing.
fn coerce_to_list(located: Option<&Value>) -> Vec<&Value> {
    match located {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(object @ Value::Object(_)) => vec![object],
        _ => Vec::new(),
    }
}

/// Structural filter: only objects carrying both a string `name` and a
/// string `description` become records.
fn dish_from_value(value: &Value) -> Option<DishRecord> {
    let map = value.as_object()?;
    let name = map.get("name")?.as_str()?;
    let description = map.get("description")?.as_str()?;
    Some(DishRecord::new(name, description))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish(name: &str, description: &str) -> DishRecord {
        DishRecord::new(name, description)
    }

    #[test]
    fn finds_array_under_items_key() {
        let out = normalize(r#"{"items":[{"name":"A","description":"B"}]}"#).unwrap();
        assert_eq!(out, vec![dish("A", "B")]);
    }

    #[test]
    fn finds_array_under_menu_items_key() {
        let out = normalize(r#"{"menu_items":[{"name":"A","description":"B"}]}"#).unwrap();
        assert_eq!(out, vec![dish("A", "B")]);
    }

    #[test]
    fn finds_array_under_dishes_key() {
        let out = normalize(r#"{"dishes":[{"name":"A","description":"B"}]}"#).unwrap();
        assert_eq!(out, vec![dish("A", "B")]);
    }

    #[test]
    fn accepts_bare_array() {
        let out = normalize(r#"[{"name":"A","description":"B"}]"#).unwrap();
        assert_eq!(out, vec![dish("A", "B")]);
    }

    #[test]
    fn items_outranks_dishes_when_both_present() {
        let text = r#"{"dishes":[{"name":"loser","description":"x"}],
                       "items":[{"name":"winner","description":"y"}]}"#;
        let out = normalize(text).unwrap();
        assert_eq!(out, vec![dish("winner", "y")]);
    }

    #[test]
    fn falls_back_to_first_array_valued_field() {
        let text = r#"{"foo":"bar","candidates":[{"name":"A","description":"B"}]}"#;
        let out = normalize(text).unwrap();
        assert_eq!(out, vec![dish("A", "B")]);
    }

    #[test]
    fn fallback_respects_document_key_order() {
        // Two plausible arrays and no priority key: the one appearing first
        // in the document wins, not the alphabetically first.
        let text = r#"{"zz":[{"name":"first","description":"x"}],
                       "aa":[{"name":"second","description":"y"}]}"#;
        let out = normalize(text).unwrap();
        assert_eq!(out, vec![dish("first", "x")]);
    }

    #[test]
    fn fallback_skips_empty_arrays() {
        let text = r#"{"empty":[],"full":[{"name":"A","description":"B"}]}"#;
        let out = normalize(text).unwrap();
        assert_eq!(out, vec![dish("A", "B")]);
    }

    #[test]
    fn priority_key_with_empty_array_yields_nothing() {
        // An empty `items` wins over a populated fallback field.
        let text = r#"{"items":[],"other":[{"name":"A","description":"B"}]}"#;
        assert!(normalize(text).unwrap().is_empty());
    }

    #[test]
    fn single_object_under_priority_key_is_wrapped() {
        let out = normalize(r#"{"items":{"name":"A","description":"B"}}"#).unwrap();
        assert_eq!(out, vec![dish("A", "B")]);
    }

    #[test]
    fn bare_dish_object_yields_nothing() {
        // No priority key, no array-valued field: the candidate list is empty.
        assert!(normalize(r#"{"name":"A","description":"B"}"#).unwrap().is_empty());
    }

    #[test]
    fn scalar_response_yields_nothing() {
        assert!(normalize("42").unwrap().is_empty());
    }

    #[test]
    fn fenced_input_equals_unfenced() {
        let body = r#"{"items":[{"name":"A","description":"B"}]}"#;
        let fenced = format!("```json\n{body}\n```");
        assert_eq!(normalize(&fenced).unwrap(), normalize(body).unwrap());
    }

    #[test]
    fn tolerates_fence_on_one_side_only() {
        let body = r#"[{"name":"A","description":"B"}]"#;
        let open_only = format!("```json\n{body}");
        let close_only = format!("{body}\n```");
        assert_eq!(normalize(&open_only).unwrap(), vec![dish("A", "B")]);
        assert_eq!(normalize(&close_only).unwrap(), vec![dish("A", "B")]);
    }

    #[test]
    fn malformed_json_is_terminal() {
        assert!(normalize("not json at all").is_err());
        assert!(normalize(r#"{"items": [}"#).is_err());
    }

    #[test]
    fn filters_entries_missing_required_keys() {
        let text = r#"[{"name":"A","description":"B"},
                       {"name":"no description"},
                       {"description":"no name"},
                       "just a string",
                       7]"#;
        let out = normalize(text).unwrap();
        assert_eq!(out, vec![dish("A", "B")]);
    }

    #[test]
    fn keeps_placeholder_entries_for_downstream_validation() {
        // Structural filtering only; the sentinel check belongs to consumers.
        let text = r#"```json
{"dishes":[{"name":"Caesar Salad","description":"Crisp romaine, parmesan, croutons"},{"name":"Dish Name","description":""}]}
```"#;
        let out = normalize(text).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], dish("Caesar Salad", "Crisp romaine, parmesan, croutons"));
        assert_eq!(out[1], dish("Dish Name", ""));
    }

    #[test]
    fn rerunning_on_same_input_is_stable() {
        let text = r#"{"items":[{"name":"A","description":"B"}]}"#;
        assert_eq!(normalize(text).unwrap(), normalize(text).unwrap());
    }
}
