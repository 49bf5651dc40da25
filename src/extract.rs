//! Pulls image URLs out of edit responses.
//!
//! The API is not consistent about its envelope: sometimes `outputs` sits
//! directly under `data`, sometimes one level deeper under `data.data`, and
//! the transport may or may not have unwrapped the outer `data` already.
//! Extraction therefore walks a fixed list of paths and takes the first hit.

use serde_json::Value;

/// Paths tried, in order, relative to the unwrapped envelope.
const OUTPUT_PATHS: &[&[&str]] = &[&["outputs"], &["data", "outputs"]];

/// Returns every string in the first `outputs` array found, in order.
///
/// Missing envelopes, non-array `outputs` and non-string entries all degrade
/// to an empty or partial result; this never fails.
pub fn extract_image_urls(response: Option<&Value>) -> Vec<String> {
    let envelope = match response {
        Some(value) if !value.is_null() => unwrap_envelope(value),
        _ => return Vec::new(),
    };

    match locate_outputs(envelope) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| entry.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn unwrap_envelope(response: &Value) -> &Value {
    match response.get("data") {
        Some(inner) if !inner.is_null() => inner,
        _ => response,
    }
}

fn locate_outputs(envelope: &Value) -> Option<&Value> {
    OUTPUT_PATHS
        .iter()
        .find_map(|path| lookup(envelope, path).filter(|value| is_truthy(value)))
}

/// JSON truthiness: `null`, `false`, `0` and `""` are empty, containers never are.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shallow_outputs_in_full_envelope() {
        let response = json!({
            "code": 200,
            "message": "success",
            "data": {
                "outputs": [
                    "https://example.com/image1.jpeg",
                    "https://example.com/image2.jpeg"
                ]
            }
        });
        assert_eq!(
            extract_image_urls(Some(&response)),
            vec![
                "https://example.com/image1.jpeg".to_string(),
                "https://example.com/image2.jpeg".to_string()
            ]
        );
    }

    #[test]
    fn test_deeper_outputs_drop_non_strings() {
        let response = json!({
            "data": { "data": { "outputs": ["https://example.com/webp.webp", 123, null] } }
        });
        assert_eq!(
            extract_image_urls(Some(&response)),
            vec!["https://example.com/webp.webp".to_string()]
        );
    }

    #[test]
    fn test_already_unwrapped_envelope() {
        let response = json!({ "outputs": ["https://example.com/a.png"] });
        assert_eq!(
            extract_image_urls(Some(&response)),
            vec!["https://example.com/a.png".to_string()]
        );
    }

    #[test]
    fn test_mixed_entries_keep_relative_order() {
        let response = json!({
            "data": { "outputs": ["a", {"url": "x"}, "b", 4.5, false, "c"] }
        });
        assert_eq!(extract_image_urls(Some(&response)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unrecognized_shapes_yield_nothing() {
        let cases = [
            json!({ "status": "ok", "result": { "images": ["https://example.com/not-used.png"] } }),
            json!({ "data": { "outputs": "https://example.com/not-an-array.png" } }),
            json!({ "data": { "outputs": [] } }),
            json!({ "data": null }),
            json!([1, 2, 3]),
            json!("outputs"),
            json!(42),
        ];
        for case in cases.iter() {
            assert!(extract_image_urls(Some(case)).is_empty(), "case: {}", case);
        }
    }

    #[test]
    fn test_null_and_missing_response() {
        assert!(extract_image_urls(None).is_empty());
        assert!(extract_image_urls(Some(&Value::Null)).is_empty());
    }

    #[test]
    fn test_shallow_wins_over_deeper() {
        let response = json!({
            "data": {
                "outputs": ["shallow"],
                "data": { "outputs": ["deep"] }
            }
        });
        assert_eq!(extract_image_urls(Some(&response)), vec!["shallow"]);
    }

    #[test]
    fn test_null_shallow_falls_through_to_deeper() {
        for shallow in [json!(null), json!(false), json!(0), json!(""), json!(0.0)] {
            let response = json!({
                "data": { "outputs": shallow, "data": { "outputs": ["deep"] } }
            });
            assert_eq!(
                extract_image_urls(Some(&response)),
                vec!["deep"],
                "shallow: {}",
                shallow
            );
        }
    }

    #[test]
    fn test_non_empty_shallow_value_stops_search() {
        for shallow in [json!({}), json!("x"), json!(true), json!(1)] {
            let response = json!({
                "data": { "outputs": shallow, "data": { "outputs": ["deep"] } }
            });
            assert!(
                extract_image_urls(Some(&response)).is_empty(),
                "shallow: {}",
                shallow
            );
        }
    }

    #[test]
    fn test_duplicates_are_kept() {
        let response = json!({ "data": { "outputs": ["same", "same"] } });
        assert_eq!(extract_image_urls(Some(&response)), vec!["same", "same"]);
    }
}
