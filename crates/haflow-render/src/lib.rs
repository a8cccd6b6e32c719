#![forbid(unsafe_code)]

//! Node labeling and flowchart serialization for normalized automations.
//!
//! [`flow::render`] turns a batch of [`haflow_core::Automation`]s into a [`FlowDocument`]; the
//! serializers turn that into an HTML fragment, Mermaid source or JSON.

pub mod escape;
pub mod flow;
pub mod html;
pub mod label;
pub mod mermaid;
pub mod theme;

pub use flow::{BRANCH_LABEL, FlowBlock, FlowDocument, FlowEdge, FlowNode, FlowSection, render};
pub use html::to_html;
pub use label::{NodeLabel, label_entry};
pub use mermaid::to_mermaid;
pub use theme::{RenderOptions, Theme};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported output format: {name}")]
    UnsupportedFormat { name: String },
    #[error("flow document JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Serialization targets for a [`FlowDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Html,
    Mermaid,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Mermaid => "mermaid",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "mermaid" | "mmd" => Ok(Self::Mermaid),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat {
                name: s.to_string(),
            }),
        }
    }
}

pub fn to_json(document: &FlowDocument, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(text)
}

/// Serializes `document` in `format`. `pretty` only affects JSON.
pub fn serialize(
    document: &FlowDocument,
    format: OutputFormat,
    options: &RenderOptions,
    pretty: bool,
) -> Result<String> {
    match format {
        OutputFormat::Html => Ok(to_html(document, options)),
        OutputFormat::Mermaid => Ok(to_mermaid(document, &options.theme)),
        OutputFormat::Json => to_json(document, pretty),
    }
}
