#![allow(dead_code)]

//! Normalize-on-write edits for skill entries.
//!
//! Skill categories hold a mix of bare labels and rated `{name, proficiency}`
//! pairs. The two edit operations below deserialize the target element as a
//! `SkillEntry`, normalize it through the typed union, and write the rated
//! form back — so the string/object polymorphism is handled in one place
//! instead of being re-checked by every consumer.

use serde_json::Value;

use crate::document::path::{self, PathError};
use crate::models::cv::SkillEntry;

/// Renames the skill at `category_path[index]` (e.g. `"skills.programming"`).
/// A bare label is promoted to `{name, proficiency: 75}`; a rated entry keeps
/// its proficiency.
pub fn set_skill_name(
    doc: &Value,
    category_path: &str,
    index: usize,
    name: &str,
) -> Result<Value, PathError> {
    edit_entry(doc, category_path, index, |entry| entry.with_name(name))
}

/// Re-rates the skill at `category_path[index]`. A bare label is promoted to
/// `{name: <label>, proficiency}`; a rated entry keeps its name.
pub fn set_skill_proficiency(
    doc: &Value,
    category_path: &str,
    index: usize,
    proficiency: u8,
) -> Result<Value, PathError> {
    edit_entry(doc, category_path, index, |entry| {
        entry.with_proficiency(proficiency)
    })
}

fn edit_entry(
    doc: &Value,
    category_path: &str,
    index: usize,
    apply: impl FnOnce(SkillEntry) -> SkillEntry,
) -> Result<Value, PathError> {
    let entries = path::get(doc, category_path)
        .and_then(Value::as_array)
        .ok_or_else(|| PathError::IndexOutOfBounds {
            path: category_path.to_string(),
            index,
            len: 0,
        })?;
    let current = entries
        .get(index)
        .ok_or_else(|| PathError::IndexOutOfBounds {
            path: category_path.to_string(),
            index,
            len: entries.len(),
        })?;

    let entry: SkillEntry = serde_json::from_value(current.clone())
        .map_err(|_| PathError::NotAddressable(format!("{category_path}.{index}")))?;
    let updated = serde_json::to_value(apply(entry))
        .map_err(|_| PathError::NotAddressable(format!("{category_path}.{index}")))?;

    path::set(doc, &format!("{category_path}.{index}"), updated)
}
