//! Recursive merge of partial updates into nested mappings

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::errors::DeploydError;

/// Merge `update` into `current`, key by key.
///
/// - a key missing from `current` is introduced,
/// - a key whose values are both mappings is merged recursively,
/// - any other present key overwrites, including `null`, `""`, `0` and `false`.
///
/// Keys missing from `update` are never touched and no key is ever removed.
pub fn merge(current: &mut Map<String, Value>, update: &Map<String, Value>) {
    for (key, new_value) in update {
        if let Some(current_value) = current.get_mut(key) {
            match (current_value, new_value) {
                (Value::Object(current_map), Value::Object(update_map)) => {
                    merge(current_map, update_map);
                }
                (current_value, _) => {
                    if *current_value != *new_value {
                        *current_value = new_value.clone();
                    }
                }
            }
        } else {
            current.insert(key.clone(), new_value.clone());
        }
    }
}

/// Merge a serializable patch into a typed value and read the result back
/// as the full type.
///
/// Fails with `InvalidInput` when the merged mapping no longer has the full
/// shape of `T`, e.g. a newly introduced entry that lacks required fields.
pub fn merge_typed<T, P>(current: &T, patch: &P) -> Result<T, DeploydError>
where
    T: Serialize + DeserializeOwned,
    P: Serialize,
{
    let mut current_value = serde_json::to_value(current)?;
    let patch_value = serde_json::to_value(patch)?;

    match (&mut current_value, &patch_value) {
        (Value::Object(current_map), Value::Object(patch_map)) => merge(current_map, patch_map),
        _ => {
            return Err(DeploydError::InvalidInput(
                "Only mappings can be merged".to_string(),
            ))
        }
    }

    serde_json::from_value(current_value)
        .map_err(|e| DeploydError::InvalidInput(format!("Invalid update: {}", e)))
}
