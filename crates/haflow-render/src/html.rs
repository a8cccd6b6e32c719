//! HTML fragment serializer.
//!
//! Output is one `<div class="ha-flows">` container holding a `flow-block` per automation. All
//! text coming from the document is escaped; ids and class names are generated here.

use crate::escape::escape_html_display as esc;
use crate::flow::{FlowBlock, FlowDocument, FlowNode, FlowSection};
use crate::theme::{RenderOptions, Theme};
use std::fmt::Write as _;

const ARROW: &str = "↓";

pub fn to_html(document: &FlowDocument, options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(r#"<div class="ha-flows">"#);
    if options.embed_style {
        push_style(&mut out, &options.theme);
    }
    for block in &document.blocks {
        push_block(&mut out, block);
    }
    out.push_str("</div>");
    out
}

fn push_block(out: &mut String, block: &FlowBlock) {
    let _ = write!(
        out,
        r#"<div class="flow-block" id="{}"><div class="flow-header" title="{}">{}</div>"#,
        esc(&block.id),
        esc(&block.entity_id),
        esc(&block.title),
    );
    for (i, section) in block.sections.iter().enumerate() {
        if i > 0 {
            push_arrow(out, block, section);
        }
        push_section(out, section);
    }
    out.push_str("</div>");
}

/// Separator in front of `section`; annotated when the edge into its first node carries a label.
fn push_arrow(out: &mut String, block: &FlowBlock, section: &FlowSection) {
    let label = section
        .nodes
        .first()
        .and_then(|node| block.incoming_label(&node.id));
    match label {
        Some(label) => {
            let _ = write!(
                out,
                r#"<div class="flow-arrow flow-arrow-branch">{ARROW} <span class="flow-edge-label">{}</span></div>"#,
                esc(label)
            );
        }
        None => {
            let _ = write!(out, r#"<div class="flow-arrow">{ARROW}</div>"#);
        }
    }
}

fn push_section(out: &mut String, section: &FlowSection) {
    let _ = write!(
        out,
        r#"<div class="flow-section flow-section-{kind}s"><div class="flow-section-title">{title}</div>"#,
        kind = section.kind.as_str(),
        title = esc(section.title),
    );
    for node in &section.nodes {
        push_node(out, node);
    }
    out.push_str("</div>");
}

fn push_node(out: &mut String, node: &FlowNode) {
    let _ = write!(
        out,
        r#"<div class="flow-node flow-node-{kind}" id="{id}"><span class="node-icon">{icon}</span><span class="node-label">{label}</span>"#,
        kind = node.kind.as_str(),
        id = esc(&node.id),
        icon = esc(node.icon),
        label = esc(&node.label),
    );
    if let Some(sublabel) = &node.sublabel {
        let _ = write!(
            out,
            r#"<span class="node-sublabel">{}</span>"#,
            esc(sublabel)
        );
    }
    out.push_str("</div>");
}

fn push_style(out: &mut String, theme: &Theme) {
    let _ = write!(
        out,
        concat!(
            "<style>",
            ".ha-flows{{background:{bg};color:{text};font-family:sans-serif;padding:16px}}",
            ".flow-block{{margin:0 0 24px;padding:12px;border-radius:8px}}",
            ".flow-header{{background:{auto};padding:8px 12px;border-radius:6px;font-weight:bold}}",
            ".flow-section{{margin-top:8px}}",
            ".flow-section-title{{text-transform:uppercase;font-size:0.75em;opacity:0.7}}",
            ".flow-node{{display:flex;flex-direction:column;margin:4px 0;padding:6px 10px;border-radius:6px}}",
            ".flow-node-trigger{{background:{trigger}}}",
            ".flow-node-condition{{background:{condition}}}",
            ".flow-node-action{{background:{action}}}",
            ".node-sublabel{{font-size:0.8em;opacity:0.8}}",
            ".flow-arrow{{text-align:center;opacity:0.8}}",
            ".flow-edge-label{{font-size:0.8em;font-style:italic}}",
            "</style>"
        ),
        bg = esc(&theme.background),
        text = esc(&theme.text),
        auto = esc(&theme.automation),
        trigger = esc(&theme.trigger),
        condition = esc(&theme.condition),
        action = esc(&theme.action),
    );
}
