#![forbid(unsafe_code)]

//! `haflow` renders home-automation rules as trigger → condition → action flowcharts.
//!
//! This crate is the headless entry point: it normalizes raw records from either source, lays
//! them out and serializes the result. An empty or fully-dropped batch yields `None`, which hosts
//! turn into a "nothing to render" response rather than an empty diagram.

pub use haflow_core::*;

pub mod render {
    pub use haflow_render::escape::{escape_html, escape_mermaid};
    pub use haflow_render::label::{label_action, label_condition, label_trigger};
    pub use haflow_render::{
        BRANCH_LABEL, FlowBlock, FlowDocument, FlowEdge, FlowNode, FlowSection, NodeLabel,
        OutputFormat, RenderOptions, Theme, label_entry, render, serialize, to_html, to_json,
        to_mermaid,
    };
}

use crate::render::{FlowDocument, OutputFormat, RenderOptions};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Source(#[from] haflow_core::Error),
    #[error(transparent)]
    Render(#[from] haflow_render::Error),
}

pub type HeadlessResult<T> = std::result::Result<T, HeadlessError>;

/// Normalizes and lays out `raws`; `None` when nothing survives normalization.
pub fn produce_document(
    raws: &[Value],
    source: SourceKind,
    names: &NameBinding,
) -> Option<FlowDocument> {
    if raws.is_empty() {
        tracing::info!(source = source.as_str(), "no automation records to render");
        return None;
    }
    let automations = normalize_all(raws, source, names);
    if automations.is_empty() {
        tracing::warn!(
            source = source.as_str(),
            records = raws.len(),
            "every automation record was dropped"
        );
        return None;
    }
    Some(render::render(&automations))
}

/// HTML fragment for `raws`, or `None` when there is nothing to render.
pub fn produce_diagram(
    raws: &[Value],
    source: SourceKind,
    names: &NameBinding,
    options: &RenderOptions,
) -> Option<String> {
    produce_document(raws, source, names).map(|doc| render::to_html(&doc, options))
}

/// Like [`produce_diagram`], for any [`OutputFormat`].
pub fn produce(
    raws: &[Value],
    source: SourceKind,
    names: &NameBinding,
    format: OutputFormat,
    options: &RenderOptions,
    pretty: bool,
) -> HeadlessResult<Option<String>> {
    let Some(doc) = produce_document(raws, source, names) else {
        return Ok(None);
    };
    Ok(Some(render::serialize(&doc, format, options, pretty)?))
}

/// Parses an `automations.yaml` document and renders it in one step.
pub fn produce_from_config_yaml(
    yaml: &str,
    names: &NameBinding,
    format: OutputFormat,
    options: &RenderOptions,
) -> HeadlessResult<Option<String>> {
    let raws = parse_config_yaml(yaml)?;
    produce(&raws, SourceKind::ConfigFile, names, format, options, false)
}

/// Parses a `/api/states` dump and renders its enabled automations, naming entities from the
/// same dump.
pub fn produce_from_states_json(
    json: &str,
    format: OutputFormat,
    options: &RenderOptions,
) -> HeadlessResult<Option<String>> {
    let states = parse_states_json(json)?;
    let names = NameBinding::from_states(&states);
    let raws = enabled_automation_states(&states);
    produce(&raws, SourceKind::StateSnapshot, &names, format, options, false)
}
