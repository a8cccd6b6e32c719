//! Mermaid flowchart serializer.
//!
//! Emits `flowchart TD` source; layout is left to whatever Mermaid renderer consumes it. Each
//! automation becomes a subgraph whose id is the block id.

use crate::escape::escape_mermaid;
use crate::flow::{FlowBlock, FlowDocument, FlowNode};
use crate::theme::Theme;
use haflow_core::EntryKind;
use std::fmt::Write as _;

const KINDS: [EntryKind; 3] = [EntryKind::Trigger, EntryKind::Condition, EntryKind::Action];

pub fn to_mermaid(document: &FlowDocument, theme: &Theme) -> String {
    let mut out = String::from("flowchart TD\n");
    for block in &document.blocks {
        push_block(&mut out, block);
    }
    let _ = writeln!(
        out,
        "    classDef header fill:{},color:{},stroke:none",
        theme.automation, theme.text
    );
    for kind in KINDS {
        let _ = writeln!(
            out,
            "    classDef {} fill:{},color:{},stroke:none",
            kind.as_str(),
            theme.fill_for(kind),
            theme.text
        );
    }
    out
}

fn push_block(out: &mut String, block: &FlowBlock) {
    let _ = writeln!(
        out,
        "    subgraph {id}_group[\"{title}\"]",
        id = block.id,
        title = escape_mermaid(&block.entity_id),
    );
    let _ = writeln!(
        out,
        "        {}[\"{}\"]:::header",
        block.id,
        escape_mermaid(&block.title)
    );
    for node in block.sections.iter().flat_map(|s| &s.nodes) {
        push_node(out, node);
    }
    for edge in &block.edges {
        match edge.label {
            Some(label) => {
                let _ = writeln!(
                    out,
                    "        {} -->|{}| {}",
                    edge.from,
                    escape_mermaid(label),
                    edge.to
                );
            }
            None => {
                let _ = writeln!(out, "        {} --> {}", edge.from, edge.to);
            }
        }
    }
    out.push_str("    end\n");
}

fn push_node(out: &mut String, node: &FlowNode) {
    let _ = write!(
        out,
        "        {}[\"{} {}",
        node.id,
        node.icon,
        escape_mermaid(&node.label)
    );
    if let Some(sublabel) = &node.sublabel {
        let _ = write!(out, "<br/>{}", escape_mermaid(sublabel));
    }
    let _ = writeln!(out, "\"]:::{}", node.kind.as_str());
}
