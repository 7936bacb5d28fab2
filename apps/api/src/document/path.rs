#![allow(dead_code)]

//! Dotted-path accessor over JSON documents.
//!
//! Every editing operation goes through these four functions. Reads are
//! lenient (`None` for any missing branch, callers supply defaults); writes
//! return a fresh document and never mutate the caller's copy.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Malformed path '{0}'")]
    Malformed(String),

    #[error("Path '{0}' does not address an editable location")]
    NotAddressable(String),

    #[error("Index {index} out of bounds for sequence at '{path}' (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },
}

/// Reads the value at `path`, e.g. `"styling.name.color"`. Returns `None` if
/// any intermediate key is missing — never an error, so callers can probe
/// optional branches freely. Numeric segments index into sequences.
pub fn get<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Returns a new document with `value` placed at `path`. Missing intermediate
/// objects are created; scalar values in the way are replaced by objects,
/// matching how the editor grows optional branches like `styling.*`.
pub fn set(doc: &Value, path: &str, value: Value) -> Result<Value, PathError> {
    let segments = parse(path)?;
    let mut root = doc.clone();
    {
        let slot = resolve_mut(&mut root, &segments, path)?;
        *slot = value;
    }
    Ok(root)
}

/// Returns a new document with `item` appended to the sequence at `path`.
/// If the location is absent or not a sequence it becomes a fresh sequence
/// holding only `item`.
pub fn append_to_sequence(doc: &Value, path: &str, item: Value) -> Result<Value, PathError> {
    let segments = parse(path)?;
    let mut root = doc.clone();
    {
        let slot = resolve_mut(&mut root, &segments, path)?;
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            items.push(item);
        }
    }
    Ok(root)
}

/// Returns a new document with the element at `index` removed from the
/// sequence at `path`; later elements shift down by one. Fails with
/// `IndexOutOfBounds` (leaving the caller's document untouched) when the
/// index is out of range or the location holds no sequence.
pub fn remove_from_sequence(doc: &Value, path: &str, index: usize) -> Result<Value, PathError> {
    let segments = parse(path)?;
    let mut root = doc.clone();
    {
        let slot = resolve_mut(&mut root, &segments, path)?;
        let items = match slot {
            Value::Array(items) => items,
            _ => {
                return Err(PathError::IndexOutOfBounds {
                    path: path.to_string(),
                    index,
                    len: 0,
                })
            }
        };
        if index >= items.len() {
            return Err(PathError::IndexOutOfBounds {
                path: path.to_string(),
                index,
                len: items.len(),
            });
        }
        items.remove(index);
    }
    Ok(root)
}

fn parse(path: &str) -> Result<Vec<&str>, PathError> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(PathError::Malformed(path.to_string()));
    }
    Ok(path.split('.').collect())
}

/// Walks to the slot addressed by `segments`, creating intermediate objects
/// along the way. Indexing into an existing sequence past its end is an
/// error; sequences never grow implicitly.
fn resolve_mut<'a>(
    current: &'a mut Value,
    segments: &[&str],
    full_path: &str,
) -> Result<&'a mut Value, PathError> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(current);
    };

    if let Value::Array(items) = current {
        let index = head
            .parse::<usize>()
            .map_err(|_| PathError::NotAddressable(full_path.to_string()))?;
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or_else(|| PathError::IndexOutOfBounds {
                path: full_path.to_string(),
                index,
                len,
            })?;
        return resolve_mut(slot, rest, full_path);
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            let slot = map.entry((*head).to_string()).or_insert(Value::Null);
            resolve_mut(slot, rest, full_path)
        }
        _ => Err(PathError::NotAddressable(full_path.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "personalInfo": {"name": "Ada", "title": "Engineer"},
            "contact": {"email": "ada@example.com"},
            "extracurriculars": ["chess", "climbing", "choir"],
            "projects": [{"name": "engine", "tags": ["math"]}]
        })
    }

    #[test]
    fn test_get_nested_value() {
        let doc = sample();
        assert_eq!(get(&doc, "personalInfo.name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_get_through_sequence_index() {
        let doc = sample();
        assert_eq!(get(&doc, "projects.0.tags.0"), Some(&json!("math")));
    }

    #[test]
    fn test_get_missing_branch_is_none_not_error() {
        let doc = sample();
        assert_eq!(get(&doc, "styling.name.color"), None);
        assert_eq!(get(&doc, "personalInfo.name.deeper"), None);
        assert_eq!(get(&doc, "extracurriculars.9"), None);
    }

    #[test]
    fn test_set_get_round_trip() {
        let doc = sample();
        let updated = set(&doc, "contact.email", json!("new@example.com")).unwrap();
        assert_eq!(get(&updated, "contact.email"), Some(&json!("new@example.com")));
    }

    #[test]
    fn test_set_does_not_mutate_input() {
        let doc = sample();
        let before = doc.clone();
        let _ = set(&doc, "personalInfo.name", json!("Grace")).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_creates_missing_intermediate_objects() {
        let doc = sample();
        let updated = set(&doc, "styling.name.color", json!("#ffffff")).unwrap();
        assert_eq!(get(&updated, "styling.name.color"), Some(&json!("#ffffff")));
        // Siblings are untouched.
        assert_eq!(get(&updated, "personalInfo.name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_set_through_sequence_index() {
        let doc = sample();
        let updated = set(&doc, "projects.0.name", json!("compiler")).unwrap();
        assert_eq!(get(&updated, "projects.0.name"), Some(&json!("compiler")));
    }

    #[test]
    fn test_set_past_sequence_end_fails() {
        let doc = sample();
        let err = set(&doc, "projects.5.name", json!("x")).unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfBounds { index: 5, .. }));
    }

    #[test]
    fn test_set_rejects_malformed_paths() {
        let doc = sample();
        assert_eq!(
            set(&doc, "", json!(1)).unwrap_err(),
            PathError::Malformed(String::new())
        );
        assert!(matches!(
            set(&doc, "contact..email", json!(1)).unwrap_err(),
            PathError::Malformed(_)
        ));
    }

    #[test]
    fn test_append_to_existing_sequence() {
        let doc = sample();
        let updated = append_to_sequence(&doc, "extracurriculars", json!("debate")).unwrap();
        assert_eq!(
            get(&updated, "extracurriculars").unwrap().as_array().unwrap().len(),
            4
        );
        assert_eq!(get(&updated, "extracurriculars.3"), Some(&json!("debate")));
    }

    #[test]
    fn test_append_creates_sequence_when_absent() {
        let doc = sample();
        let updated = append_to_sequence(&doc, "education", json!({"degree": "BSc"})).unwrap();
        assert_eq!(get(&updated, "education.0.degree"), Some(&json!("BSc")));
    }

    #[test]
    fn test_remove_shifts_later_elements() {
        let doc = sample();
        let updated = remove_from_sequence(&doc, "extracurriculars", 1).unwrap();
        let items = get(&updated, "extracurriculars").unwrap().as_array().unwrap();
        assert_eq!(items, &vec![json!("chess"), json!("choir")]);
    }

    #[test]
    fn test_remove_out_of_range_fails_and_preserves_input() {
        let doc = sample();
        let before = doc.clone();
        let err = remove_from_sequence(&doc, "extracurriculars", 3).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfBounds {
                path: "extracurriculars".to_string(),
                index: 3,
                len: 3,
            }
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_remove_from_non_sequence_fails() {
        let doc = sample();
        let err = remove_from_sequence(&doc, "personalInfo.name", 0).unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfBounds { len: 0, .. }));
    }
}
