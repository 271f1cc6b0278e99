//! JSON Patch (RFC 6902) over transfer shapes
//!
//! Operations are applied to the JSON form of a patch shape. Object keys are
//! matched ignoring ASCII case, so `/Title` and `/title` address the same
//! member of a camelCase shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: JsonValue },
    Remove { path: String },
    Replace { path: String, value: JsonValue },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: JsonValue },
}

impl PatchOperation {
    /// Target pointer of the operation
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }
}

/// Ordered list of patch operations, applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("invalid JSON pointer '{0}'")]
    InvalidPointer(String),
    #[error("the target location '{0}' was not found")]
    PathNotFound(String),
    #[error("cannot remove or replace the document root")]
    RootModification,
    #[error("'{from}' cannot be moved into its own child '{path}'")]
    MoveIntoChild { from: String, path: String },
    #[error("the current value at '{0}' does not match the test value")]
    TestFailed(String),
}

impl PatchError {
    /// Pointer the error refers to, if any
    pub fn pointer(&self) -> Option<&str> {
        match self {
            PatchError::InvalidPointer(p) | PatchError::PathNotFound(p) | PatchError::TestFailed(p) => {
                Some(p)
            }
            PatchError::MoveIntoChild { path, .. } => Some(path),
            PatchError::RootModification => None,
        }
    }
}

impl PatchDocument {
    /// Apply every operation to a copy of `target`; on failure `target` is untouched.
    pub fn apply(&self, target: &mut JsonValue) -> Result<(), PatchError> {
        let mut working = target.clone();
        for (index, operation) in self.0.iter().enumerate() {
            if let Err(e) = apply_operation(&mut working, operation) {
                debug!(index, path = operation.path(), error = %e, "Patch operation failed");
                return Err(e);
            }
        }
        *target = working;
        Ok(())
    }
}

fn apply_operation(doc: &mut JsonValue, operation: &PatchOperation) -> Result<(), PatchError> {
    match operation {
        PatchOperation::Add { path, value } => add(doc, path, value.clone()),
        PatchOperation::Remove { path } => remove(doc, path).map(drop),
        PatchOperation::Replace { path, value } => {
            let tokens = split_pointer(path)?;
            if tokens.is_empty() {
                *doc = value.clone();
                return Ok(());
            }
            let slot = navigate_mut(doc, &tokens, path)?;
            *slot = value.clone();
            Ok(())
        }
        PatchOperation::Move { from, path } => {
            if path.len() > from.len()
                && path.to_ascii_lowercase().starts_with(&format!("{}/", from.to_ascii_lowercase()))
            {
                return Err(PatchError::MoveIntoChild {
                    from: from.clone(),
                    path: path.clone(),
                });
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let tokens = split_pointer(from)?;
            let value = navigate(doc, &tokens)
                .ok_or_else(|| PatchError::PathNotFound(from.clone()))?
                .clone();
            add(doc, path, value)
        }
        PatchOperation::Test { path, value } => {
            let tokens = split_pointer(path)?;
            let current = navigate(doc, &tokens).ok_or_else(|| PatchError::PathNotFound(path.clone()))?;
            if current == value {
                Ok(())
            } else {
                Err(PatchError::TestFailed(path.clone()))
            }
        }
    }
}

/// Split `/a/b~1c` into `["a", "b/c"]`; the empty pointer is the root.
fn split_pointer(pointer: &str) -> Result<Vec<String>, PatchError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PatchError::InvalidPointer(pointer.to_string()));
    };
    Ok(rest
        .split('/')
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect())
}

fn matching_key(map: &Map<String, JsonValue>, token: &str) -> Option<String> {
    if map.contains_key(token) {
        return Some(token.to_string());
    }
    map.keys().find(|k| k.eq_ignore_ascii_case(token)).cloned()
}

fn parse_index(token: &str, len: usize, allow_end: bool) -> Option<usize> {
    if allow_end && token == "-" {
        return Some(len);
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    let index = token.parse::<usize>().ok()?;
    let bound = if allow_end { len } else { len.saturating_sub(1) };
    if (allow_end || len > 0) && index <= bound { Some(index) } else { None }
}

fn navigate<'a>(doc: &'a JsonValue, tokens: &[String]) -> Option<&'a JsonValue> {
    let mut current = doc;
    for token in tokens {
        current = match current {
            JsonValue::Object(map) => map.get(&matching_key(map, token)?)?,
            JsonValue::Array(items) => items.get(parse_index(token, items.len(), false)?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn navigate_mut<'a>(
    doc: &'a mut JsonValue,
    tokens: &[String],
    pointer: &str,
) -> Result<&'a mut JsonValue, PatchError> {
    let not_found = || PatchError::PathNotFound(pointer.to_string());
    let mut current = doc;
    for token in tokens {
        current = match current {
            JsonValue::Object(map) => {
                let key = matching_key(map, token).ok_or_else(not_found)?;
                map.get_mut(&key).ok_or_else(not_found)?
            }
            JsonValue::Array(items) => {
                let index = parse_index(token, items.len(), false).ok_or_else(not_found)?;
                items.get_mut(index).ok_or_else(not_found)?
            }
            _ => return Err(not_found()),
        };
    }
    Ok(current)
}

fn add(doc: &mut JsonValue, pointer: &str, value: JsonValue) -> Result<(), PatchError> {
    let tokens = split_pointer(pointer)?;
    let Some((last, parents)) = tokens.split_last() else {
        *doc = value;
        return Ok(());
    };

    match navigate_mut(doc, parents, pointer)? {
        JsonValue::Object(map) => {
            let key = matching_key(map, last).unwrap_or_else(|| last.clone());
            map.insert(key, value);
            Ok(())
        }
        JsonValue::Array(items) => {
            let index = parse_index(last, items.len(), true)
                .ok_or_else(|| PatchError::PathNotFound(pointer.to_string()))?;
            items.insert(index, value);
            Ok(())
        }
        _ => Err(PatchError::PathNotFound(pointer.to_string())),
    }
}

fn remove(doc: &mut JsonValue, pointer: &str) -> Result<JsonValue, PatchError> {
    let tokens = split_pointer(pointer)?;
    let Some((last, parents)) = tokens.split_last() else {
        return Err(PatchError::RootModification);
    };

    let not_found = || PatchError::PathNotFound(pointer.to_string());
    match navigate_mut(doc, parents, pointer)? {
        JsonValue::Object(map) => {
            let key = matching_key(map, last).ok_or_else(not_found)?;
            map.remove(&key).ok_or_else(not_found)
        }
        JsonValue::Array(items) => {
            let index = parse_index(last, items.len(), false).ok_or_else(not_found)?;
            Ok(items.remove(index))
        }
        _ => Err(not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document(ops: JsonValue) -> PatchDocument {
        serde_json::from_value(ops).unwrap()
    }

    #[test]
    fn test_deserializes_operation_list() {
        let patch = document(json!([
            {"op": "replace", "path": "/title", "value": "Heat"},
            {"op": "move", "from": "/a", "path": "/b"},
        ]));
        assert_eq!(
            patch.0,
            vec![
                PatchOperation::Replace {
                    path: "/title".into(),
                    value: json!("Heat")
                },
                PatchOperation::Move {
                    from: "/a".into(),
                    path: "/b".into()
                },
            ]
        );
    }

    #[test]
    fn test_replace_matches_keys_case_insensitively() {
        let mut target = json!({"title": "Old", "price": 5.0});
        document(json!([{"op": "replace", "path": "/Title", "value": "New"}]))
            .apply(&mut target)
            .unwrap();
        assert_eq!(target, json!({"title": "New", "price": 5.0}));
    }

    #[test]
    fn test_add_remove_copy_move() {
        let mut target = json!({"name": "Ana", "tags": ["a"], "biography": "x"});
        document(json!([
            {"op": "add", "path": "/tags/-", "value": "b"},
            {"op": "add", "path": "/tags/0", "value": "z"},
            {"op": "remove", "path": "/biography"},
            {"op": "copy", "from": "/name", "path": "/alias"},
            {"op": "move", "from": "/alias", "path": "/nick"},
        ]))
        .apply(&mut target)
        .unwrap();
        assert_eq!(target, json!({"name": "Ana", "tags": ["z", "a", "b"], "nick": "Ana"}));
    }

    #[test]
    fn test_failed_test_leaves_target_untouched() {
        let mut target = json!({"title": "Heat", "price": 5.0});
        let err = document(json!([
            {"op": "replace", "path": "/price", "value": 7.5},
            {"op": "test", "path": "/title", "value": "Alien"},
        ]))
        .apply(&mut target)
        .unwrap_err();
        assert_eq!(err, PatchError::TestFailed("/title".into()));
        assert_eq!(target, json!({"title": "Heat", "price": 5.0}));
    }

    #[test]
    fn test_operation_paths() {
        let patch = document(json!([
            {"op": "copy", "from": "/name", "path": "/alias"},
            {"op": "test", "path": "/price", "value": 1},
        ]));
        let paths: Vec<&str> = patch.0.iter().map(PatchOperation::path).collect();
        assert_eq!(paths, vec!["/alias", "/price"]);
    }

    #[test]
    fn test_errors() {
        let mut target = json!({"a": {"b": 1}});
        assert_matches!(
            document(json!([{"op": "remove", "path": "/missing"}])).apply(&mut target),
            Err(PatchError::PathNotFound(_))
        );
        assert_matches!(
            document(json!([{"op": "replace", "path": "no-slash", "value": 1}])).apply(&mut target),
            Err(PatchError::InvalidPointer(_))
        );
        assert_matches!(
            document(json!([{"op": "move", "from": "/a", "path": "/a/c"}])).apply(&mut target),
            Err(PatchError::MoveIntoChild { .. })
        );
        assert_matches!(
            document(json!([{"op": "remove", "path": ""}])).apply(&mut target),
            Err(PatchError::RootModification)
        );
    }
}
