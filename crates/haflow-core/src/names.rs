use rustc_hash::FxHashMap;
use serde_json::Value;

/// Fetch-scoped mapping from entity/device identifiers to friendly names.
///
/// Built once per fetch from a platform snapshot and only read afterwards. An empty binding is
/// the "enrichment source unreachable" case: every lookup misses and [`NameBinding::resolve`]
/// hands back the identifier itself.
#[derive(Debug, Clone, Default)]
pub struct NameBinding {
    names: FxHashMap<String, String>,
}

impl NameBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a binding from `(identifier, attributes)` pairs, reading `attributes.friendly_name`.
    ///
    /// Pairs without a non-empty string friendly name are skipped.
    pub fn from_snapshot<'a, I>(snapshot: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let mut binding = Self::new();
        for (id, attributes) in snapshot {
            let Some(name) = attributes.get("friendly_name").and_then(Value::as_str) else {
                continue;
            };
            binding.insert(id, name);
        }
        binding
    }

    /// Builds a binding from a states dump (`[{entity_id, state, attributes}, ...]`).
    pub fn from_states(states: &[Value]) -> Self {
        let binding = Self::from_snapshot(states.iter().filter_map(|state| {
            let id = state.get("entity_id")?.as_str()?;
            let attributes = state.get("attributes")?;
            Some((id, attributes))
        }));
        tracing::info!(names = binding.len(), "built name binding from states");
        binding
    }

    pub fn insert(&mut self, id: &str, name: &str) {
        if id.is_empty() || name.trim().is_empty() {
            return;
        }
        self.names.insert(id.to_string(), name.to_string());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn lookup(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Total lookup: the friendly name when known, otherwise the identifier itself.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.lookup(id).unwrap_or(id)
    }

    /// Resolves an `entity_id`-style field, which may hold one identifier or a list of them.
    ///
    /// Returns `None` unless at least one identifier has a friendly name; lists resolve
    /// element-wise (misses keep their identifier) and are joined with `", "`.
    pub fn resolve_field(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(id) => {
                let name = self.lookup(id);
                if name.is_none() {
                    tracing::debug!(entity_id = %id, "no friendly name");
                }
                name.map(str::to_string)
            }
            Value::Array(items) => {
                let ids: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if !ids.iter().any(|id| self.lookup(id).is_some()) {
                    return None;
                }
                let names: Vec<&str> = ids.iter().map(|id| self.resolve(id)).collect();
                Some(names.join(", "))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_falls_back_to_identifier() {
        let binding = NameBinding::new();
        assert!(binding.is_empty());
        assert_eq!(binding.resolve("light.kitchen"), "light.kitchen");
        assert_eq!(binding.lookup("light.kitchen"), None);
    }

    #[test]
    fn from_states_reads_friendly_names() {
        let states = vec![
            json!({ "entity_id": "light.kitchen", "state": "on", "attributes": { "friendly_name": "Kitchen Light" } }),
            json!({ "entity_id": "sensor.raw", "state": "3", "attributes": {} }),
            json!({ "state": "orphan" }),
            json!("not a state"),
        ];
        let binding = NameBinding::from_states(&states);
        assert_eq!(binding.len(), 1);
        assert_eq!(binding.resolve("light.kitchen"), "Kitchen Light");
        assert_eq!(binding.resolve("sensor.raw"), "sensor.raw");
    }

    #[test]
    fn resolve_field_handles_lists() {
        let mut binding = NameBinding::new();
        binding.insert("light.a", "Lamp A");
        assert_eq!(
            binding.resolve_field(&json!(["light.a", "light.b"])).as_deref(),
            Some("Lamp A, light.b")
        );
        assert_eq!(binding.resolve_field(&json!(["light.b"])), None);
        assert_eq!(binding.resolve_field(&json!("light.a")).as_deref(), Some("Lamp A"));
        assert_eq!(binding.resolve_field(&json!(3)), None);
    }

    #[test]
    fn blank_names_are_not_stored() {
        let mut binding = NameBinding::new();
        binding.insert("light.a", "  ");
        binding.insert("", "Nameless");
        assert!(binding.is_empty());
    }
}
