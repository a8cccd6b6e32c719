pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Automation record {index} is not a mapping (found {found})")]
    MalformedAutomation { index: usize, found: &'static str },

    #[error("Automation record {index} has an invalid `{field}` field: {message}")]
    InvalidField {
        index: usize,
        field: &'static str,
        message: String,
    },

    #[error("Automation record {index} has no JSON form: {message}")]
    UnsupportedYaml { index: usize, message: String },

    #[error("Invalid automations YAML: {0}")]
    ConfigYaml(#[from] serde_yaml::Error),

    #[error("Invalid states JSON: {0}")]
    StatesJson(#[from] serde_json::Error),

    #[error("Unexpected {source_name} document: expected a list of records, found {found}")]
    UnexpectedShape {
        source_name: &'static str,
        found: &'static str,
    },
}
