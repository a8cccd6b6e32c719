use serde::Serialize;
use serde_json::{Map, Value};

/// Reserved field holding the resolved name of an entry's `entity_id`.
pub const FRIENDLY_NAME_FIELD: &str = "_friendly_name";
/// Reserved field holding the resolved name of an entry's `target.entity_id`.
pub const TARGET_FRIENDLY_NAME_FIELD: &str = "_target_friendly_name";
/// Reserved field holding the resolved name of an entry's `device_id`.
pub const DEVICE_NAME_FIELD: &str = "_device_name";

/// Where a raw automation record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// An `automations.yaml` style configuration document.
    #[default]
    ConfigFile,
    /// A runtime state snapshot (`/api/states`), which carries no rule bodies.
    StateSnapshot,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigFile => "config_file",
            Self::StateSnapshot => "state_snapshot",
        }
    }
}

/// The role an entry plays inside an automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Trigger,
    Condition,
    Action,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Condition => "condition",
            Self::Action => "action",
        }
    }
}

/// Canonical automation shape shared by every source.
///
/// `triggers`, `conditions` and `actions` are always sequences. Structured entries are copies of
/// the source mappings, optionally enriched with the reserved `_friendly_name`-style fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Automation {
    pub id: String,
    pub display_name: String,
    pub entity_id: String,
    pub source: SourceKind,
    pub triggers: Vec<Value>,
    pub conditions: Vec<Value>,
    pub actions: Vec<Value>,
}

impl Automation {
    pub fn entries(&self, kind: EntryKind) -> &[Value] {
        match kind {
            EntryKind::Trigger => &self.triggers,
            EntryKind::Condition => &self.conditions,
            EntryKind::Action => &self.actions,
        }
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }
}

/// The three raw shapes a trigger/condition/action entry can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<'a> {
    /// A mapping with a discriminator key plus type-specific fields.
    Structured(&'a Map<String, Value>),
    /// A bare primitive, rendered through its text form.
    Scalar(String),
    /// Anything else; carries the generic type name.
    Unclassified(&'static str),
}

impl<'a> Entry<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self::Structured(map),
            Value::String(s) => Self::Scalar(s.clone()),
            Value::Number(n) => Self::Scalar(n.to_string()),
            Value::Bool(b) => Self::Scalar(b.to_string()),
            other => Self::Unclassified(json_type_name(other)),
        }
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

/// Renders a primitive (or a list of primitives) as display text.
///
/// Lists are joined with `", "`. Returns `None` for `null`, mappings, and lists without any
/// primitive element.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Coerces a field into a sequence: lists pass through, absent and falsy values (null, `false`,
/// zero, `""`, `{}`) become empty, and any other single value becomes a singleton.
pub fn ensure_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Vec::new(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(Value::Object(map)) if map.is_empty() => Vec::new(),
        Some(other) => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ensure_list_coerces_bare_and_missing_values() {
        assert_eq!(ensure_list(None), Vec::<Value>::new());
        assert_eq!(ensure_list(Some(&Value::Null)), Vec::<Value>::new());
        assert_eq!(ensure_list(Some(&json!(""))), Vec::<Value>::new());
        assert_eq!(ensure_list(Some(&json!({}))), Vec::<Value>::new());
        assert_eq!(
            ensure_list(Some(&json!({ "platform": "sun" }))),
            vec![json!({ "platform": "sun" })]
        );
        assert_eq!(ensure_list(Some(&json!([1, 2]))), vec![json!(1), json!(2)]);
    }

    #[test]
    fn ensure_list_treats_false_and_zero_as_empty() {
        assert_eq!(ensure_list(Some(&json!(false))), Vec::<Value>::new());
        assert_eq!(ensure_list(Some(&json!(0))), Vec::<Value>::new());
        assert_eq!(ensure_list(Some(&json!(0.0))), Vec::<Value>::new());
        assert_eq!(ensure_list(Some(&json!(true))), vec![json!(true)]);
        assert_eq!(ensure_list(Some(&json!(7))), vec![json!(7)]);
        assert_eq!(ensure_list(Some(&json!("0"))), vec![json!("0")]);
    }

    #[test]
    fn value_text_joins_lists_and_skips_null() {
        assert_eq!(value_text(&json!(["on", "off"])).as_deref(), Some("on, off"));
        assert_eq!(value_text(&json!(21.5)).as_deref(), Some("21.5"));
        assert_eq!(value_text(&Value::Null), None);
        assert_eq!(value_text(&json!([null, {}])), None);
    }

    #[test]
    fn classify_separates_the_three_shapes() {
        let mapping = json!({ "platform": "state" });
        assert!(matches!(Entry::classify(&mapping), Entry::Structured(_)));
        assert_eq!(
            Entry::classify(&json!("07:00:00")),
            Entry::Scalar("07:00:00".to_string())
        );
        assert_eq!(Entry::classify(&json!(false)), Entry::Scalar("false".to_string()));
        assert_eq!(Entry::classify(&json!([1])), Entry::Unclassified("array"));
        assert_eq!(Entry::classify(&Value::Null), Entry::Unclassified("null"));
    }
}
