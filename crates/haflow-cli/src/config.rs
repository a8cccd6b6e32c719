//! Environment-driven defaults. `.env` is loaded by `main` before this is read.

use haflow::render::OutputFormat;

pub const AUTOMATIONS_YAML_PATH_VAR: &str = "AUTOMATIONS_YAML_PATH";
pub const HA_STATES_PATH_VAR: &str = "HA_STATES_PATH";
pub const FORMAT_VAR: &str = "HAFLOW_FORMAT";
pub const LOG_VAR: &str = "HAFLOW_LOG";

pub const DEFAULT_AUTOMATIONS_YAML_PATH: &str = "/opt/homeassistant/automations.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub automations_yaml_path: String,
    pub states_path: Option<String>,
    pub format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            automations_yaml_path: DEFAULT_AUTOMATIONS_YAML_PATH.to_string(),
            states_path: None,
            format: OutputFormat::Html,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(path) = var(AUTOMATIONS_YAML_PATH_VAR) {
            config.automations_yaml_path = path;
        }
        config.states_path = var(HA_STATES_PATH_VAR);
        if let Some(name) = var(FORMAT_VAR) {
            match name.parse::<OutputFormat>() {
                Ok(format) => config.format = format,
                Err(err) => tracing::warn!("ignoring {FORMAT_VAR}: {err}"),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(CliConfig::from_lookup(lookup(&[])), CliConfig::default());
        assert_eq!(
            CliConfig::from_lookup(lookup(&[(AUTOMATIONS_YAML_PATH_VAR, "  ")])).automations_yaml_path,
            DEFAULT_AUTOMATIONS_YAML_PATH
        );
    }

    #[test]
    fn variables_override_defaults() {
        let config = CliConfig::from_lookup(lookup(&[
            (AUTOMATIONS_YAML_PATH_VAR, "/config/automations.yaml"),
            (HA_STATES_PATH_VAR, "/tmp/states.json"),
            (FORMAT_VAR, "mermaid"),
        ]));
        assert_eq!(config.automations_yaml_path, "/config/automations.yaml");
        assert_eq!(config.states_path.as_deref(), Some("/tmp/states.json"));
        assert_eq!(config.format, OutputFormat::Mermaid);
    }

    #[test]
    fn unknown_format_keeps_default() {
        let config = CliConfig::from_lookup(lookup(&[(FORMAT_VAR, "svg")]));
        assert_eq!(config.format, OutputFormat::Html);
    }
}
