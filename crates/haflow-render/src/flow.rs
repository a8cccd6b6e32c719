//! Flow document model: per-automation node sequences plus the edges linking them.
//!
//! Node ids are positional (`auto_{i}_trigger_{j}`); they are unique within one document and
//! carry no identity across renders.

use crate::label::label_entry;
use haflow_core::{Automation, EntryKind};
use serde::Serialize;

/// Annotation on the edge that enters the actions after a condition gate.
pub const BRANCH_LABEL: &str = "yes";

const SECTION_ORDER: [EntryKind; 3] = [EntryKind::Trigger, EntryKind::Condition, EntryKind::Action];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowDocument {
    pub blocks: Vec<FlowBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowBlock {
    pub id: String,
    pub title: String,
    pub entity_id: String,
    /// Non-empty sections only, in trigger, condition, action order.
    pub sections: Vec<FlowSection>,
    pub edges: Vec<FlowEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSection {
    pub kind: EntryKind,
    pub title: &'static str,
    pub nodes: Vec<FlowNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub id: String,
    pub kind: EntryKind,
    pub icon: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sublabel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
}

pub fn section_title(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Trigger => "Triggers",
        EntryKind::Condition => "Conditions",
        EntryKind::Action => "Actions",
    }
}

impl FlowDocument {
    pub fn node_count(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|b| &b.sections)
            .map(|s| s.nodes.len())
            .sum()
    }
}

impl FlowBlock {
    pub fn section(&self, kind: EntryKind) -> Option<&FlowSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Label of the edge(s) entering `node_id`, if any carries one.
    pub fn incoming_label(&self, node_id: &str) -> Option<&'static str> {
        self.edges
            .iter()
            .filter(|e| e.to == node_id)
            .find_map(|e| e.label)
    }
}

/// Lays out every automation as trigger → condition → action.
pub fn render(automations: &[Automation]) -> FlowDocument {
    let blocks: Vec<FlowBlock> = automations
        .iter()
        .enumerate()
        .map(|(index, automation)| render_block(index, automation))
        .collect();
    let document = FlowDocument { blocks };
    tracing::debug!(
        blocks = document.blocks.len(),
        nodes = document.node_count(),
        "rendered flow document"
    );
    document
}

fn render_block(index: usize, automation: &Automation) -> FlowBlock {
    let block_id = format!("auto_{index}");

    let sections: Vec<FlowSection> = SECTION_ORDER
        .into_iter()
        .filter_map(|kind| {
            let entries = automation.entries(kind);
            if entries.is_empty() {
                return None;
            }
            let nodes = entries
                .iter()
                .enumerate()
                .map(|(j, entry)| {
                    let label = label_entry(kind, entry);
                    FlowNode {
                        id: format!("{block_id}_{}_{j}", kind.as_str()),
                        kind,
                        icon: label.icon,
                        label: label.label,
                        sublabel: label.sublabel,
                    }
                })
                .collect();
            Some(FlowSection {
                kind,
                title: section_title(kind),
                nodes,
            })
        })
        .collect();

    let edges = link_sections(&block_id, &sections, automation.has_conditions());

    FlowBlock {
        id: block_id,
        title: automation.display_name.clone(),
        entity_id: automation.entity_id.clone(),
        sections,
        edges,
    }
}

/// Triggers fan out from the header (any of them starts the flow); conditions and actions chain
/// in order. The edge into the first action is the branch edge when conditions exist.
fn link_sections(block_id: &str, sections: &[FlowSection], gated: bool) -> Vec<FlowEdge> {
    let mut edges = Vec::new();
    let mut tails: Vec<&str> = vec![block_id];

    for section in sections {
        let label = (gated && section.kind == EntryKind::Action).then_some(BRANCH_LABEL);
        match section.kind {
            EntryKind::Trigger => {
                for node in &section.nodes {
                    for tail in &tails {
                        edges.push(edge(tail, &node.id, None));
                    }
                }
                tails = section.nodes.iter().map(|n| n.id.as_str()).collect();
            }
            EntryKind::Condition | EntryKind::Action => {
                let mut nodes = section.nodes.iter();
                let Some(first) = nodes.next() else {
                    continue;
                };
                for tail in &tails {
                    edges.push(edge(tail, &first.id, label));
                }
                let mut prev = first;
                for node in nodes {
                    edges.push(edge(&prev.id, &node.id, None));
                    prev = node;
                }
                tails = vec![prev.id.as_str()];
            }
        }
    }
    edges
}

fn edge(from: &str, to: &str, label: Option<&'static str>) -> FlowEdge {
    FlowEdge {
        from: from.to_string(),
        to: to.to_string(),
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haflow_core::SourceKind;
    use serde_json::json;

    fn automation(
        triggers: Vec<serde_json::Value>,
        conditions: Vec<serde_json::Value>,
        actions: Vec<serde_json::Value>,
    ) -> Automation {
        Automation {
            id: "1".to_string(),
            display_name: "Test".to_string(),
            entity_id: "automation.1".to_string(),
            source: SourceKind::ConfigFile,
            triggers,
            conditions,
            actions,
        }
    }

    fn edge_tuples(block: &FlowBlock) -> Vec<(&str, &str, Option<&str>)> {
        block
            .edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str(), e.label))
            .collect()
    }

    #[test]
    fn ungated_flow_has_no_branch_edge() {
        let doc = render(&[automation(
            vec![json!({ "platform": "sun" }), json!({ "platform": "time" })],
            vec![],
            vec![json!({ "service": "light.turn_on" }), json!({ "delay": 5 })],
        )]);
        let block = &doc.blocks[0];
        assert!(block.section(EntryKind::Condition).is_none());
        assert_eq!(
            edge_tuples(block),
            vec![
                ("auto_0", "auto_0_trigger_0", None),
                ("auto_0", "auto_0_trigger_1", None),
                ("auto_0_trigger_0", "auto_0_action_0", None),
                ("auto_0_trigger_1", "auto_0_action_0", None),
                ("auto_0_action_0", "auto_0_action_1", None),
            ]
        );
    }

    #[test]
    fn gated_flow_marks_the_edge_into_the_first_action() {
        let doc = render(&[automation(
            vec![json!({ "platform": "sun" })],
            vec![json!({ "condition": "state" }), json!({ "condition": "sun" })],
            vec![json!({ "service": "light.turn_on" })],
        )]);
        let block = &doc.blocks[0];
        assert_eq!(
            edge_tuples(block),
            vec![
                ("auto_0", "auto_0_trigger_0", None),
                ("auto_0_trigger_0", "auto_0_condition_0", None),
                ("auto_0_condition_0", "auto_0_condition_1", None),
                ("auto_0_condition_1", "auto_0_action_0", Some(BRANCH_LABEL)),
            ]
        );
        assert_eq!(block.incoming_label("auto_0_action_0"), Some("yes"));
        assert_eq!(block.incoming_label("auto_0_condition_0"), None);
    }

    #[test]
    fn empty_sections_are_omitted_and_ids_are_indexed_per_block() {
        let doc = render(&[
            automation(vec![], vec![], vec![json!({ "service": "x.y" })]),
            automation(vec![json!("07:00")], vec![], vec![]),
        ]);
        assert_eq!(doc.blocks[0].sections.len(), 1);
        assert_eq!(doc.blocks[0].sections[0].title, "Actions");
        assert_eq!(
            edge_tuples(&doc.blocks[0]),
            vec![("auto_0", "auto_0_action_0", None)]
        );
        assert_eq!(doc.blocks[1].sections[0].nodes[0].id, "auto_1_trigger_0");
        assert_eq!(doc.node_count(), 2);
    }
}
