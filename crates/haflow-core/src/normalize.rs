//! Source adapters that turn raw automation records into [`Automation`]s.
//!
//! Both adapters share the same signature ([`SourceAdapter`]) and are selected through
//! [`SourceKind::adapter`], so downstream code never needs to know which source produced a
//! record.

use crate::model::{
    Automation, DEVICE_NAME_FIELD, FRIENDLY_NAME_FIELD, SourceKind, TARGET_FRIENDLY_NAME_FIELD,
    ensure_list, json_type_name,
};
use crate::names::NameBinding;
use crate::{Error, Result};
use serde_json::{Map, Value, json};

pub type SourceAdapter = fn(raw: &Value, index: usize, names: &NameBinding) -> Result<Automation>;

/// Placeholder shown for automations known only from a runtime state snapshot.
pub const CONFIG_NOT_ACCESSIBLE: &str = "Config not accessible - check YAML path";

impl SourceKind {
    pub fn adapter(self) -> SourceAdapter {
        match self {
            Self::ConfigFile => normalize_config_record,
            Self::StateSnapshot => normalize_state_record,
        }
    }
}

/// Normalizes one raw record with the adapter for `source`.
pub fn normalize(
    raw: &Value,
    index: usize,
    source: SourceKind,
    names: &NameBinding,
) -> Result<Automation> {
    (source.adapter())(raw, index, names)
}

/// Normalizes a batch, dropping (and logging) records that fail.
///
/// One malformed record never aborts the batch; well-formed siblings keep their order.
pub fn normalize_all(raws: &[Value], source: SourceKind, names: &NameBinding) -> Vec<Automation> {
    let adapter = source.adapter();
    let mut out = Vec::with_capacity(raws.len());
    for (index, raw) in raws.iter().enumerate() {
        match adapter(raw, index, names) {
            Ok(automation) => {
                tracing::debug!(
                    alias = %automation.display_name,
                    triggers = automation.triggers.len(),
                    conditions = automation.conditions.len(),
                    actions = automation.actions.len(),
                    "loaded automation"
                );
                out.push(automation);
            }
            Err(err) => {
                tracing::warn!(index, source = source.as_str(), "skipping automation: {err}");
            }
        }
    }
    tracing::info!(
        loaded = out.len(),
        skipped = raws.len() - out.len(),
        source = source.as_str(),
        "normalized automations"
    );
    out
}

fn normalize_config_record(raw: &Value, index: usize, names: &NameBinding) -> Result<Automation> {
    let record = as_record(raw, index)?;

    let id = match record.get("id") {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(v) => scalar_field(v, index, "id")?,
    };
    let display_name = match record.get("alias") {
        None | Some(Value::Null) => format!("Automation {id}"),
        Some(v) => scalar_field(v, index, "alias")?,
    };

    let triggers = entries_field(record, "triggers", "trigger");
    let conditions = entries_field(record, "conditions", "condition");
    let actions = entries_field(record, "actions", "action");

    Ok(Automation {
        entity_id: format!("automation.{id}"),
        id,
        display_name,
        source: SourceKind::ConfigFile,
        triggers: enrich_entries(triggers, names),
        conditions: enrich_entries(conditions, names),
        actions: enrich_entries(actions, names),
    })
}

fn normalize_state_record(raw: &Value, index: usize, _names: &NameBinding) -> Result<Automation> {
    let record = as_record(raw, index)?;

    let entity_id = match record.get("entity_id") {
        None | Some(Value::Null) => String::new(),
        Some(v) => scalar_field(v, index, "entity_id")?,
    };
    let attributes = record.get("attributes").and_then(Value::as_object);

    let id = match attributes.and_then(|a| a.get("id")) {
        Some(v) if !v.is_null() => scalar_field(v, index, "attributes.id")?,
        _ => entity_id
            .strip_prefix("automation.")
            .unwrap_or(&entity_id)
            .to_string(),
    };
    let friendly_name = attributes
        .and_then(|a| a.get("friendly_name"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty());
    let display_name = match friendly_name {
        Some(name) => name.to_string(),
        None if !entity_id.is_empty() => entity_id.clone(),
        None => format!("Automation {index}"),
    };

    Ok(Automation {
        entity_id: if entity_id.is_empty() {
            format!("automation.{id}")
        } else {
            entity_id
        },
        id,
        display_name,
        source: SourceKind::StateSnapshot,
        triggers: vec![json!({ "platform": "unknown", "entity_id": CONFIG_NOT_ACCESSIBLE })],
        conditions: Vec::new(),
        actions: vec![json!({ "service": "unknown" })],
    })
}

fn as_record(raw: &Value, index: usize) -> Result<&Map<String, Value>> {
    raw.as_object().ok_or(Error::MalformedAutomation {
        index,
        found: json_type_name(raw),
    })
}

fn scalar_field(value: &Value, index: usize, field: &'static str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::InvalidField {
            index,
            field,
            message: format!("expected a scalar, found {}", json_type_name(other)),
        }),
    }
}

/// Reads the plural key first (current config format), then the singular one.
fn entries_field(record: &Map<String, Value>, plural: &str, singular: &str) -> Vec<Value> {
    match record.get(plural) {
        Some(v) if !v.is_null() => ensure_list(Some(v)),
        _ => ensure_list(record.get(singular)),
    }
}

/// Copies each structured entry and attaches resolved names under reserved fields.
///
/// Names are only attached on lookup hits, and never overwrite a field the source already set.
pub fn enrich_entries(entries: Vec<Value>, names: &NameBinding) -> Vec<Value> {
    entries
        .into_iter()
        .map(|entry| match entry {
            Value::Object(map) => Value::Object(enrich_entry(map, names)),
            other => other,
        })
        .collect()
}

fn enrich_entry(mut entry: Map<String, Value>, names: &NameBinding) -> Map<String, Value> {
    let friendly = entry
        .get("entity_id")
        .and_then(|id| names.resolve_field(id));
    let target_friendly = entry
        .get("target")
        .and_then(Value::as_object)
        .and_then(|target| target.get("entity_id"))
        .and_then(|id| names.resolve_field(id));
    let device_name = entry
        .get("device_id")
        .and_then(|id| names.resolve_field(id));

    for (field, name) in [
        (FRIENDLY_NAME_FIELD, friendly),
        (TARGET_FRIENDLY_NAME_FIELD, target_friendly),
        (DEVICE_NAME_FIELD, device_name),
    ] {
        let Some(name) = name else {
            continue;
        };
        if !entry.contains_key(field) {
            entry.insert(field.to_string(), Value::String(name));
        }
    }
    entry
}
