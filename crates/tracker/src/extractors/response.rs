//! Recovering the JSON payload from a model response.
//!
//! Models do not reliably wrap their output in fences, so several layers are
//! tried in order and the first that yields something wins.

use serde_json::Value;
use tracing::debug;

use crate::canonical::models::{RECORD_KEY, RecordContainer};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Returns the slice of `output` that most likely holds the JSON payload.
pub fn extract_json(output: &str) -> Option<&str> {
    if let Some(inner) = fenced_json_block(output) {
        debug!("JSON recovered from fenced block");
        return Some(inner);
    }

    let start = output.find(['[', '{']);
    let end = output.rfind([']', '}']);
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            debug!("JSON recovered from delimiter scan");
            return Some(&output[start..=end]);
        }
    }

    let trimmed = output.trim();
    if (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'))
    {
        return Some(trimmed);
    }

    None
}

fn fenced_json_block(output: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets valid for slicing `output`.
    let lowered = output.to_ascii_lowercase();
    let open = lowered.find(JSON_FENCE)?;
    let body_start = open + JSON_FENCE.len();
    let body_len = output[body_start..].find(FENCE)?;

    let inner = output[body_start..body_start + body_len].trim();
    (!inner.is_empty()).then_some(inner)
}

/// Parses `json_text` and coerces it into a record container.
///
/// A bare list becomes the container, an object already keyed by
/// [`RECORD_KEY`] passes through, any other object becomes a one-entry list.
pub fn coerce_to_record_container(json_text: &str) -> Option<RecordContainer> {
    let value: Value = match serde_json::from_str(json_text) {
        Ok(value) => value,
        Err(e) => {
            debug!("Recovered text is not valid JSON: {}", e);
            return None;
        }
    };

    match value {
        Value::Array(registro) => Some(RecordContainer { registro }),
        Value::Object(mut object) => match object.remove(RECORD_KEY) {
            Some(Value::Array(registro)) => Some(RecordContainer { registro }),
            Some(_) => None,
            None => Some(RecordContainer {
                registro: vec![Value::Object(object)],
            }),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LIST: &str = r#"[{"name": "press banca", "series": [{"repetitions": 5, "weight": 75}]}]"#;

    #[test]
    fn test_fenced_block_is_taken_verbatim() {
        let output = format!("Aquí tienes:\n```json\n{}\n```\nSaludos", LIST);
        assert_eq!(extract_json(&output), Some(LIST));
    }

    #[test]
    fn test_uppercase_fence_tag() {
        let output = format!("```JSON\n{}\n```", LIST);
        assert_eq!(extract_json(&output), Some(LIST));
    }

    #[test]
    fn test_unfenced_list_at_top_level() {
        assert_eq!(extract_json(LIST), Some(LIST));
        assert_eq!(extract_json(&format!("\n  {}  \n", LIST)), Some(LIST));
    }

    #[test]
    fn test_delimiter_scan_skips_prose() {
        let output = format!("Claro, el registro es {} espero que ayude.", LIST);
        assert_eq!(extract_json(&output), Some(LIST));
    }

    #[test]
    fn test_untagged_fence_falls_back_to_scan() {
        let output = "```\n{\"name\": \"correr\", \"duration_minutes\": 30}\n```";
        assert_eq!(
            extract_json(output),
            Some("{\"name\": \"correr\", \"duration_minutes\": 30}")
        );
    }

    #[test]
    fn test_no_json_found() {
        assert_eq!(extract_json("No entendí el entrenamiento."), None);
        assert_eq!(extract_json("} al revés {"), None);
        assert_eq!(extract_json(""), None);
    }

    #[test]
    fn test_bare_list_is_wrapped() {
        let container = coerce_to_record_container(LIST).unwrap();
        assert_eq!(container.registro.len(), 1);
    }

    #[test]
    fn test_keyed_object_passes_through() {
        let container =
            coerce_to_record_container(r#"{"registro": [{"name": "a"}, {"name": "b"}]}"#).unwrap();
        assert_eq!(container.registro.len(), 2);
    }

    #[test]
    fn test_single_object_is_wrapped() {
        let container =
            coerce_to_record_container(r#"{"name": "correr", "duration_minutes": 30}"#).unwrap();
        assert_eq!(
            container.registro,
            vec![json!({"name": "correr", "duration_minutes": 30})]
        );
    }

    #[test]
    fn test_other_shapes_yield_nothing() {
        assert!(coerce_to_record_container("42").is_none());
        assert!(coerce_to_record_container("\"texto\"").is_none());
        assert!(coerce_to_record_container(r#"{"registro": "nada"}"#).is_none());
        assert!(coerce_to_record_container("[1, 2").is_none());
    }
}
