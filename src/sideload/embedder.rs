//! Sideload group merging
//!
//! Two merge strategies exist:
//! - *direct*: group members carry their own `id`; a record's same-named
//!   URL field is resolved to the member with that trailing-segment id.
//! - *nested-by-owner*: members belong to a primary record whose id is a
//!   middle segment of the member's own `url` field. Members are grouped by
//!   owner before the merge; owners with zero members receive `[]`.
//!
//! A requested group missing from the envelope is a contract violation of the
//! remote API and errors out; it is not handled defensively.

use crate::error::{Error, Result};
use crate::urls::{parse_owner_id, parse_resource_id};
use serde_json::Value;
use std::collections::HashMap;

/// The one group whose members are owned by primary records instead of
/// matching them 1:1.
const NESTED_BY_OWNER_GROUP: &str = "content";

/// Build the query parameters requesting sideloads with a list call.
pub fn build_sideload_params(
    sideloads: &[String],
    content_schema_ids: &[String],
) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if !sideloads.is_empty() {
        params.insert("sideload".to_string(), sideloads.join(","));
    }
    if !content_schema_ids.is_empty() {
        params.insert(
            "content.schema_id".to_string(),
            content_schema_ids.join(","),
        );
    }
    params
}

/// Splice the requested sideload groups into the primary records in place.
///
/// `data` is the whole page envelope: `results` plus one top-level key per
/// requested group.
pub fn embed_sideloads(data: &mut Value, sideloads: &[String]) -> Result<()> {
    if sideloads.is_empty() {
        return Ok(());
    }
    let indexes = index_sideload_groups(data, sideloads)?;

    let results = data
        .get_mut("results")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| Error::envelope("missing results key"))?;

    for record in results.iter_mut() {
        for sideload in sideloads {
            let field = to_singular(sideload);
            let reference = record
                .get(&field)
                .ok_or_else(|| Error::envelope(format!("record has no '{field}' field")))?;
            if reference.is_null() {
                continue;
            }
            let url = reference.as_str().ok_or_else(|| {
                Error::envelope(format!("record field '{field}' is not a URL string"))
            })?;
            let id = parse_resource_id(url)?;
            // An id absent from the index means the owner has zero members.
            let replacement = indexes[sideload.as_str()]
                .get(&id)
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()));
            record[&field] = replacement;
        }
    }
    Ok(())
}

/// Build an id -> value index for every requested group.
fn index_sideload_groups<'a>(
    data: &Value,
    sideloads: &'a [String],
) -> Result<HashMap<&'a str, HashMap<u64, Value>>> {
    let mut indexes = HashMap::new();
    for sideload in sideloads {
        let group = data
            .get(sideload)
            .and_then(Value::as_array)
            .ok_or_else(|| Error::envelope(format!("missing sideload group '{sideload}'")))?;

        let index = if sideload == NESTED_BY_OWNER_GROUP {
            index_by_owner(group)?
        } else {
            index_by_id(group, sideload)?
        };
        indexes.insert(sideload.as_str(), index);
    }
    Ok(indexes)
}

/// Group members by the owning record's id parsed from each member's URL.
fn index_by_owner(group: &[Value]) -> Result<HashMap<u64, Value>> {
    let mut by_owner: HashMap<u64, Vec<Value>> = HashMap::new();
    for member in group {
        let url = member
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::envelope("nested group member has no 'url' field"))?;
        let owner = parse_owner_id(url)?;
        by_owner.entry(owner).or_default().push(member.clone());
    }
    Ok(by_owner
        .into_iter()
        .map(|(owner, members)| (owner, Value::Array(members)))
        .collect())
}

/// Index members directly by their own `id` field.
fn index_by_id(group: &[Value], sideload: &str) -> Result<HashMap<u64, Value>> {
    group
        .iter()
        .map(|member| {
            let id = member.get("id").and_then(Value::as_u64).ok_or_else(|| {
                Error::envelope(format!("member of group '{sideload}' has no numeric 'id'"))
            })?;
            Ok((id, member.clone()))
        })
        .collect()
}

/// Singular form of a group name, used as the record field name.
///
/// Covers the plural shapes that appear as group names; not a general
/// inflection engine.
pub fn to_singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix('s') {
        if !word.ends_with("ss") {
            return stem.to_string();
        }
    }
    word.to_string()
}
