//! Parsers for the two source document formats.
//!
//! Reading the documents (file system, HTTP) is the caller's job; these functions only turn the
//! text into raw JSON records for [`crate::normalize`].

use crate::model::json_type_name;
use crate::{Error, Result};
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

/// Parses an `automations.yaml` document into raw records.
///
/// A list is returned as-is, a single mapping becomes a singleton and an empty document yields no
/// records. Tagged scalars (`!secret`, `!input`, ...) keep their untagged value. A record that has
/// no JSON form (a NaN, a sequence used as a key) is dropped and logged; its siblings are kept.
pub fn parse_config_yaml(text: &str) -> Result<Vec<Value>> {
    if text.trim().is_empty() {
        tracing::warn!("automations YAML is empty");
        return Ok(Vec::new());
    }
    let doc: YamlValue = serde_yaml::from_str(text)?;
    let records = yaml_records(doc)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match yaml_record_to_json(index, record) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(index, "dropping automation record: {err}");
                None
            }
        })
        .collect::<Vec<_>>();
    tracing::info!(records = records.len(), "parsed automations YAML");
    Ok(records)
}

/// Parses a states dump (the platform's `/api/states` response body).
pub fn parse_states_json(text: &str) -> Result<Vec<Value>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: Value = serde_json::from_str(text)?;
    let states = records_from_document(doc, "states JSON")?;
    tracing::debug!(states = states.len(), "parsed states JSON");
    Ok(states)
}

/// Selects the enabled automation entities from a states dump.
pub fn enabled_automation_states(states: &[Value]) -> Vec<Value> {
    states
        .iter()
        .filter(|state| {
            let is_automation = state
                .get("entity_id")
                .and_then(Value::as_str)
                .is_some_and(|id| id.starts_with("automation."));
            let is_on = state.get("state").and_then(Value::as_str) == Some("on");
            is_automation && is_on
        })
        .cloned()
        .collect()
}

fn records_from_document(doc: Value, source_name: &'static str) -> Result<Vec<Value>> {
    match doc {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::Object(map) => Ok(vec![Value::Object(map)]),
        other => Err(Error::UnexpectedShape {
            source_name,
            found: json_type_name(&other),
        }),
    }
}

fn yaml_records(doc: YamlValue) -> Result<Vec<YamlValue>> {
    match doc {
        YamlValue::Tagged(tagged) => yaml_records(tagged.value),
        YamlValue::Null => Ok(Vec::new()),
        YamlValue::Sequence(items) => Ok(items),
        YamlValue::Mapping(map) if map.is_empty() => Ok(Vec::new()),
        YamlValue::Mapping(map) => Ok(vec![YamlValue::Mapping(map)]),
        other => Err(Error::UnexpectedShape {
            source_name: "automations YAML",
            found: yaml_type_name(&other),
        }),
    }
}

fn yaml_record_to_json(index: usize, mut record: YamlValue) -> Result<Value> {
    let unsupported = |message: String| Error::UnsupportedYaml { index, message };
    record
        .apply_merge()
        .map_err(|err| unsupported(err.to_string()))?;
    yaml_to_json(record).map_err(unsupported)
}

/// Converts a YAML value into its JSON form, dropping tags.
fn yaml_to_json(value: YamlValue) -> std::result::Result<Value, String> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("number {n} has no JSON form"))?
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<std::result::Result<_, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_key(key: YamlValue) -> std::result::Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(format!("a {} cannot be a mapping key", yaml_type_name(&other))),
    }
}

fn yaml_type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "boolean",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "array",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(tagged) => yaml_type_name(&tagged.value),
    }
}
