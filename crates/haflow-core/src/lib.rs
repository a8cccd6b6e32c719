#![forbid(unsafe_code)]

//! Home-automation rule normalizer (headless).
//!
//! Turns loosely-structured automation records into one canonical [`Automation`] shape:
//! - two sources: `automations.yaml` config documents and runtime state snapshots
//! - every trigger/condition/action field coerced to a sequence
//! - best-effort friendly-name enrichment through a fetch-scoped [`NameBinding`]
//!
//! Records that cannot be normalized are dropped individually; the rest of the batch survives.

pub mod error;
pub mod model;
pub mod names;
pub mod normalize;
pub mod sources;

pub use error::{Error, Result};
pub use model::{Automation, Entry, EntryKind, SourceKind};
pub use names::NameBinding;
pub use normalize::{SourceAdapter, normalize, normalize_all};
pub use sources::{enabled_automation_states, parse_config_yaml, parse_states_json};

#[cfg(test)]
mod tests;
