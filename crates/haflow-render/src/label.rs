//! Node labeling: one normalized entry in, one `{icon, label, sublabel}` description out.
//!
//! Triggers and conditions are decoded through a discriminator table; actions go through
//! [`ActionVariant`], which also recognizes control-flow shapes. Text returned here is raw;
//! serializers escape it when embedding.

use haflow_core::model::{
    DEVICE_NAME_FIELD, Entry, EntryKind, FRIENDLY_NAME_FIELD, TARGET_FRIENDLY_NAME_FIELD,
    ensure_list, value_text,
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Scalar entries longer than this are ellipsized.
pub const SCALAR_LABEL_LIMIT: usize = 30;

pub const TRIGGER_ICON: &str = "🎯";
pub const CONDITION_ICON: &str = "❔";
pub const ACTION_ICON: &str = "▶️";

type Fields = Map<String, Value>;
type Formatter = fn(&Fields) -> String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeLabel {
    pub icon: &'static str,
    pub label: String,
    pub sublabel: Option<String>,
}

/// One row of a discriminator table.
#[derive(Debug)]
pub struct LabelRule {
    pub key: &'static str,
    pub icon: &'static str,
    pub format: Formatter,
}

static TRIGGER_RULES: &[LabelRule] = &[
    LabelRule { key: "state", icon: "🔄", format: trigger_state },
    LabelRule { key: "time", icon: "⏰", format: trigger_time },
    LabelRule { key: "numeric_state", icon: "📊", format: numeric_state },
    LabelRule { key: "sun", icon: "🌅", format: trigger_sun },
    LabelRule { key: "webhook", icon: "🔗", format: trigger_webhook },
    LabelRule { key: "mqtt", icon: "📡", format: trigger_mqtt },
    LabelRule { key: "event", icon: "⚡", format: trigger_event },
    LabelRule { key: "zone", icon: "📍", format: trigger_zone },
    LabelRule { key: "conversation", icon: "💬", format: trigger_conversation },
    LabelRule { key: "device", icon: "📱", format: device_type },
    LabelRule { key: "time_pattern", icon: "🔁", format: trigger_time_pattern },
    LabelRule { key: "homeassistant", icon: "🏠", format: trigger_homeassistant },
    LabelRule { key: "template", icon: "📝", format: template },
];

static CONDITION_RULES: &[LabelRule] = &[
    LabelRule { key: "state", icon: "🔄", format: condition_state },
    LabelRule { key: "numeric_state", icon: "📊", format: numeric_state },
    LabelRule { key: "time", icon: "⏰", format: condition_time },
    LabelRule { key: "sun", icon: "🌅", format: condition_sun },
    LabelRule { key: "zone", icon: "📍", format: condition_zone },
    LabelRule { key: "template", icon: "📝", format: template },
    LabelRule { key: "and", icon: "🔗", format: condition_and },
    LabelRule { key: "or", icon: "🔀", format: condition_or },
    LabelRule { key: "not", icon: "🚫", format: condition_not },
    LabelRule { key: "device", icon: "📱", format: device_type },
];

/// Control-flow action shapes, keyed by a structural marker field. Order is priority.
static CONTROL_FLOW_RULES: &[LabelRule] = &[
    LabelRule { key: "delay", icon: "⏱️", format: action_delay },
    LabelRule { key: "wait_template", icon: "⏳", format: action_wait_template },
    LabelRule { key: "wait_for_trigger", icon: "⏳", format: action_wait_for_trigger },
    LabelRule { key: "choose", icon: "🔀", format: action_choose },
    LabelRule { key: "repeat", icon: "🔁", format: action_repeat },
    LabelRule { key: "if", icon: "❓", format: action_if },
    LabelRule { key: "parallel", icon: "⏸️", format: action_parallel },
    LabelRule { key: "stop", icon: "⛔", format: action_stop },
];

static SERVICE_DOMAIN_ICONS: &[(&str, &str)] = &[
    ("light", "💡"),
    ("switch", "🔌"),
    ("notify", "🔔"),
    ("climate", "🌡️"),
    ("media_player", "🎵"),
    ("scene", "🎬"),
    ("script", "📜"),
    ("cover", "🪟"),
    ("lock", "🔒"),
    ("fan", "🌀"),
];

const SERVICE_ICON: &str = "⚙️";
const EVENT_ICON: &str = "⚡";
const DEVICE_ICON: &str = "📱";

/// A trigger or condition decoded through its discriminator table.
#[derive(Debug, Clone, Copy)]
pub enum Variant<'a> {
    Known(&'static LabelRule),
    /// The discriminator is not in the table; it is displayed verbatim.
    Unknown(&'a str),
}

impl<'a> Variant<'a> {
    fn decode(table: &'static [LabelRule], discriminator: &'a str) -> Self {
        table
            .iter()
            .find(|rule| rule.key == discriminator)
            .map_or(Self::Unknown(discriminator), Self::Known)
    }

    fn describe(self, fields: &Fields, fallback_icon: &'static str) -> (&'static str, String) {
        match self {
            Self::Known(rule) => (rule.icon, (rule.format)(fields)),
            Self::Unknown(discriminator) => (fallback_icon, discriminator.to_string()),
        }
    }
}

/// Discriminator used for mappings that carry none.
const MISSING_DISCRIMINATOR: &str = "unknown";

pub fn trigger_variant(fields: &Fields) -> Variant<'_> {
    let discriminator = non_empty_str(fields, "platform")
        .or_else(|| non_empty_str(fields, "trigger"))
        .unwrap_or(MISSING_DISCRIMINATOR);
    Variant::decode(TRIGGER_RULES, discriminator)
}

pub fn condition_variant(fields: &Fields) -> Variant<'_> {
    let discriminator = non_empty_str(fields, "condition").unwrap_or(MISSING_DISCRIMINATOR);
    Variant::decode(CONDITION_RULES, discriminator)
}

/// The shapes an action mapping can take, in labeling priority order (an `alias` overrides every
/// shape except [`ActionVariant::ControlFlow`]).
#[derive(Debug, Clone, Copy)]
pub enum ActionVariant<'a> {
    ControlFlow(&'static LabelRule),
    Service {
        domain: Option<&'a str>,
        name: &'a str,
    },
    Event(&'a str),
    DeviceAction(&'a str),
    Generic,
}

impl<'a> ActionVariant<'a> {
    pub fn decode(fields: &'a Fields) -> Self {
        if let Some(rule) = CONTROL_FLOW_RULES
            .iter()
            .find(|rule| fields.contains_key(rule.key))
        {
            return Self::ControlFlow(rule);
        }
        if let Some(id) =
            non_empty_str(fields, "service").or_else(|| non_empty_str(fields, "action"))
        {
            return match id.split_once('.') {
                Some((domain, name)) if !domain.is_empty() && !name.is_empty() => Self::Service {
                    domain: Some(domain),
                    name,
                },
                _ => {
                    let bare = id.trim_matches('.');
                    Self::Service {
                        domain: None,
                        name: if bare.is_empty() { id } else { bare },
                    }
                }
            };
        }
        if let Some(event) = non_empty_str(fields, "event") {
            return Self::Event(event);
        }
        if let Some(kind) = non_empty_str(fields, "type") {
            return Self::DeviceAction(kind);
        }
        Self::Generic
    }

    fn icon(self) -> &'static str {
        match self {
            Self::ControlFlow(rule) => rule.icon,
            Self::Service {
                domain: Some(domain),
                ..
            } => SERVICE_DOMAIN_ICONS
                .iter()
                .find(|(d, _)| *d == domain)
                .map_or(SERVICE_ICON, |&(_, icon)| icon),
            Self::Service { domain: None, .. } => SERVICE_ICON,
            Self::Event(_) => EVENT_ICON,
            Self::DeviceAction(_) => DEVICE_ICON,
            Self::Generic => ACTION_ICON,
        }
    }

    fn label(self, fields: &Fields) -> String {
        match self {
            Self::ControlFlow(rule) => (rule.format)(fields),
            Self::Service {
                domain: Some(domain),
                name,
            } => format!("{domain}: {}", title_case(name)),
            Self::Service { domain: None, name } | Self::Event(name) => title_case(name),
            Self::DeviceAction(kind) => format!("Device: {}", title_case(kind)),
            Self::Generic => "Action".to_string(),
        }
    }
}

pub fn label_entry(kind: EntryKind, entry: &Value) -> NodeLabel {
    match kind {
        EntryKind::Trigger => label_trigger(entry),
        EntryKind::Condition => label_condition(entry),
        EntryKind::Action => label_action(entry),
    }
}

pub fn label_trigger(entry: &Value) -> NodeLabel {
    match Entry::classify(entry) {
        Entry::Structured(fields) => {
            let (icon, label) = trigger_variant(fields).describe(fields, TRIGGER_ICON);
            NodeLabel {
                icon,
                label,
                sublabel: entity_sublabel(fields),
            }
        }
        other => fallback_label(other, TRIGGER_ICON),
    }
}

pub fn label_condition(entry: &Value) -> NodeLabel {
    match Entry::classify(entry) {
        Entry::Structured(fields) => {
            let (icon, label) = condition_variant(fields).describe(fields, CONDITION_ICON);
            NodeLabel {
                icon,
                label,
                sublabel: entity_sublabel(fields),
            }
        }
        other => fallback_label(other, CONDITION_ICON),
    }
}

pub fn label_action(entry: &Value) -> NodeLabel {
    match Entry::classify(entry) {
        Entry::Structured(fields) => {
            let variant = ActionVariant::decode(fields);
            let alias = non_empty_str(fields, "alias");
            let label = match (variant, alias) {
                (ActionVariant::ControlFlow(_), _) | (_, None) => variant.label(fields),
                (_, Some(alias)) => alias.to_string(),
            };
            NodeLabel {
                icon: variant.icon(),
                label,
                sublabel: action_sublabel(fields),
            }
        }
        other => fallback_label(other, ACTION_ICON),
    }
}

fn fallback_label(entry: Entry<'_>, icon: &'static str) -> NodeLabel {
    let label = match entry {
        Entry::Scalar(text) if !text.is_empty() => truncate_label(&text, SCALAR_LABEL_LIMIT),
        Entry::Scalar(_) => "string".to_string(),
        Entry::Unclassified(type_name) => type_name.to_string(),
        Entry::Structured(_) => MISSING_DISCRIMINATOR.to_string(),
    };
    NodeLabel {
        icon,
        label,
        sublabel: None,
    }
}

/// Ellipsizes `text` to `limit` characters, ending in `...` when cut.
pub fn truncate_label(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// `turn_on` -> `Turn On`: underscores become spaces, each word is capitalized and the rest of
/// the word lowercased.
pub fn title_case(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len());
    let mut prev_is_letter = false;
    for ch in identifier.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

fn non_empty_str<'a>(fields: &'a Fields, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn text(fields: &Fields, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(value_text)
        .filter(|s| !s.is_empty())
}

fn entity_sublabel(fields: &Fields) -> Option<String> {
    text(fields, FRIENDLY_NAME_FIELD)
        .or_else(|| text(fields, "entity_id"))
        .or_else(|| text(fields, DEVICE_NAME_FIELD))
}

fn action_sublabel(fields: &Fields) -> Option<String> {
    let target = fields.get("target").and_then(Value::as_object);
    text(fields, FRIENDLY_NAME_FIELD)
        .or_else(|| text(fields, "entity_id"))
        .or_else(|| text(fields, TARGET_FRIENDLY_NAME_FIELD))
        .or_else(|| target.and_then(|t| text(t, "entity_id")))
        .or_else(|| {
            fields
                .get("data")
                .and_then(Value::as_object)
                .and_then(|d| text(d, "entity_id"))
        })
        .or_else(|| text(fields, DEVICE_NAME_FIELD))
        .or_else(|| target.and_then(target_scope))
}

/// Describes a target that addresses areas/labels instead of entities.
fn target_scope(target: &Fields) -> Option<String> {
    let parts: Vec<String> = [("Area", "Areas", "area_id"), ("Label", "Labels", "label_id")]
        .into_iter()
        .filter_map(|(one, many, key)| {
            let value = target.get(key)?;
            let names = text(target, key)?;
            let plural = matches!(value, Value::Array(items) if items.len() > 1);
            Some(format!("{}: {names}", if plural { many } else { one }))
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn or_named(prefix: &str, value: Option<String>) -> String {
    match value {
        Some(v) => format!("{prefix}: {v}"),
        None => prefix.to_string(),
    }
}

fn trigger_state(f: &Fields) -> String {
    let from = text(f, "from");
    let to = text(f, "to");
    if from.is_none() && to.is_none() {
        return "State change".to_string();
    }
    format!(
        "State: {} → {}",
        from.as_deref().unwrap_or("any"),
        to.as_deref().unwrap_or("any")
    )
}

fn trigger_time(f: &Fields) -> String {
    or_named("Time", text(f, "at"))
}

fn numeric_state(f: &Fields) -> String {
    match (text(f, "above"), text(f, "below")) {
        (Some(above), Some(below)) => format!("Numeric: > {above}, < {below}"),
        (Some(above), None) => format!("Numeric: > {above}"),
        (None, Some(below)) => format!("Numeric: < {below}"),
        (None, None) => "Numeric state".to_string(),
    }
}

fn trigger_sun(f: &Fields) -> String {
    match (text(f, "event"), text(f, "offset")) {
        (Some(event), Some(offset)) => format!("Sun: {event} ({offset})"),
        (event, _) => or_named("Sun", event),
    }
}

fn trigger_webhook(f: &Fields) -> String {
    or_named("Webhook", text(f, "webhook_id"))
}

fn trigger_mqtt(f: &Fields) -> String {
    or_named("MQTT", text(f, "topic"))
}

fn trigger_event(f: &Fields) -> String {
    or_named("Event", text(f, "event_type"))
}

fn trigger_zone(f: &Fields) -> String {
    match (text(f, "event"), text(f, "zone")) {
        (Some(event), Some(zone)) => format!("Zone: {event} {zone}"),
        (event, zone) => or_named("Zone", zone.or(event)),
    }
}

fn trigger_conversation(f: &Fields) -> String {
    let commands: Vec<String> = ensure_list(f.get("command"))
        .iter()
        .filter_map(value_text)
        .take(2)
        .collect();
    if commands.is_empty() {
        return "Conversation".to_string();
    }
    format!("Say: {}", commands.join(", "))
}

fn device_type(f: &Fields) -> String {
    or_named("Device", text(f, "type").map(|t| title_case(&t)))
}

fn trigger_time_pattern(f: &Fields) -> String {
    let parts: Vec<String> = [("hours", "h"), ("minutes", "m"), ("seconds", "s")]
        .into_iter()
        .filter_map(|(key, unit)| text(f, key).map(|v| format!("{v}{unit}")))
        .collect();
    if parts.is_empty() {
        return "Time pattern".to_string();
    }
    format!("Every: {}", parts.join(" "))
}

fn trigger_homeassistant(f: &Fields) -> String {
    or_named("Home Assistant", text(f, "event"))
}

fn template(_: &Fields) -> String {
    "Template".to_string()
}

fn condition_state(f: &Fields) -> String {
    or_named("State", text(f, "state"))
}

fn condition_time(f: &Fields) -> String {
    if let Some(weekdays) = text(f, "weekday") {
        return format!("Time: {weekdays}");
    }
    match (text(f, "after"), text(f, "before")) {
        (Some(after), Some(before)) => format!("Time: {after} - {before}"),
        (Some(after), None) => format!("Time: after {after}"),
        (None, Some(before)) => format!("Time: before {before}"),
        (None, None) => "Time".to_string(),
    }
}

fn condition_sun(f: &Fields) -> String {
    let parts: Vec<String> = ["after", "before"]
        .into_iter()
        .filter_map(|key| text(f, key).map(|v| format!("{key} {v}")))
        .collect();
    if parts.is_empty() {
        return "Sun".to_string();
    }
    format!("Sun: {}", parts.join(", "))
}

fn condition_zone(f: &Fields) -> String {
    or_named("Zone", text(f, "zone"))
}

fn counted(prefix: &str, count: usize, one: &str, many: &str) -> String {
    format!("{prefix}: {count} {}", if count == 1 { one } else { many })
}

fn nested_conditions(f: &Fields) -> usize {
    ensure_list(f.get("conditions")).len()
}

fn condition_and(f: &Fields) -> String {
    counted("AND", nested_conditions(f), "condition", "conditions")
}

fn condition_or(f: &Fields) -> String {
    counted("OR", nested_conditions(f), "condition", "conditions")
}

fn condition_not(f: &Fields) -> String {
    counted("NOT", nested_conditions(f), "condition", "conditions")
}

fn action_delay(f: &Fields) -> String {
    let duration = match f.get("delay") {
        Some(Value::Number(n)) => Some(format!("{n}s")),
        Some(Value::Object(map)) => {
            let parts: Vec<String> = [
                ("days", "d"),
                ("hours", "h"),
                ("minutes", "m"),
                ("seconds", "s"),
                ("milliseconds", "ms"),
            ]
            .into_iter()
            .filter_map(|(key, unit)| text(map, key).map(|v| format!("{v}{unit}")))
            .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        Some(other) => value_text(other).filter(|s| !s.is_empty()),
        None => None,
    };
    or_named("Delay", duration)
}

fn action_wait_template(_: &Fields) -> String {
    "Wait for template".to_string()
}

fn action_wait_for_trigger(_: &Fields) -> String {
    "Wait for trigger".to_string()
}

fn action_choose(f: &Fields) -> String {
    counted("Choose", ensure_list(f.get("choose")).len(), "option", "options")
}

fn action_repeat(f: &Fields) -> String {
    let Some(repeat) = f.get("repeat").and_then(Value::as_object) else {
        return "Repeat".to_string();
    };
    if let Some(count) = text(repeat, "count") {
        return format!("Repeat: {count}x");
    }
    if repeat.contains_key("while") {
        return "Repeat while".to_string();
    }
    if repeat.contains_key("until") {
        return "Repeat until".to_string();
    }
    if repeat.contains_key("for_each") {
        return "Repeat for each".to_string();
    }
    "Repeat".to_string()
}

fn action_if(f: &Fields) -> String {
    if f.contains_key("else") {
        "If / then / else".to_string()
    } else {
        "If / then".to_string()
    }
}

fn action_parallel(f: &Fields) -> String {
    counted("Parallel", ensure_list(f.get("parallel")).len(), "action", "actions")
}

fn action_stop(_: &Fields) -> String {
    "Stop".to_string()
}
