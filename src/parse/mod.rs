//! Parse phase: lenient JSON text → untyped document tree.

pub mod types;

pub use types::*;

use serde_json::{Map, Value};

use crate::error::StructuralError;

/// The untyped top-level object of a branch graph document.
pub type RawDocument = Map<String, Value>;

/// Parse document text, tolerating comments and trailing commas.
///
/// The root must be an object carrying a `branches` array.
pub fn parse_document(text: &str) -> Result<RawDocument, StructuralError> {
    let root: Value = json5::from_str(text)?;
    let Value::Object(document) = root else {
        return Err(StructuralError::MissingBranches);
    };
    if !document.get("branches").is_some_and(Value::is_array) {
        return Err(StructuralError::MissingBranches);
    }
    Ok(document)
}

/// Fetch an optional top-level list. Absent and `null` both mean "none".
pub fn optional_array<'a>(
    document: &'a RawDocument,
    key: &'static str,
) -> Result<Option<&'a Vec<Value>>, StructuralError> {
    match document.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(StructuralError::NotAnArray(key)),
    }
}

/// How the document format reads optional values: `null`, `false`, `0` and
/// `""` mean "not set".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_comments_and_trailing_commas() {
        let text = r#"{
            // the bot's branches
            branches: [
                { name: "Main", },
            ],
        }"#;
        let document = parse_document(text).unwrap();
        assert_eq!(document["branches"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn syntax_error_is_structural() {
        let err = parse_document("{ branches: [ }").unwrap_err();
        assert!(matches!(err, StructuralError::Syntax(_)));
    }

    #[test]
    fn branches_must_be_an_array() {
        assert!(matches!(
            parse_document(r#"{"branches": {}}"#),
            Err(StructuralError::MissingBranches)
        ));
        assert!(matches!(
            parse_document("[]"),
            Err(StructuralError::MissingBranches)
        ));
        assert_eq!(
            parse_document("{}").unwrap_err().to_string(),
            "expected \"branches\" array!"
        );
    }

    #[test]
    fn optional_arrays() {
        let document = parse_document(r#"{"branches": [], "edges": null, "branchspecs": 3}"#).unwrap();
        assert!(optional_array(&document, "edges").unwrap().is_none());
        assert!(optional_array(&document, "missing").unwrap().is_none());
        assert!(matches!(
            optional_array(&document, "branchspecs"),
            Err(StructuralError::NotAnArray("branchspecs"))
        ));
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&serde_json::json!(false)));
        assert!(!is_truthy(&serde_json::json!(0)));
        assert!(!is_truthy(&serde_json::json!("")));
        assert!(is_truthy(&serde_json::json!({})));
        assert!(is_truthy(&serde_json::json!([])));
        assert!(is_truthy(&serde_json::json!(true)));
    }
}
