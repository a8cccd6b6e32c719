use haflow_core::{Automation, NameBinding, SourceKind, normalize_all};
use haflow_render::{OutputFormat, RenderOptions, render, serialize, to_html};
use serde_json::{Value, json};

fn normalized(raws: &[Value]) -> Vec<Automation> {
    normalize_all(raws, SourceKind::ConfigFile, &NameBinding::new())
}

fn labels(automations: &[Automation]) -> Vec<String> {
    render(automations)
        .blocks
        .iter()
        .flat_map(|b| &b.sections)
        .flat_map(|s| &s.nodes)
        .map(|n| n.label.clone())
        .collect()
}

#[test]
fn night_mode_has_sun_trigger_and_light_action_without_conditions() {
    let automations = normalized(&[json!({
        "alias": "Night Mode",
        "trigger": { "platform": "sun", "event": "sunset" },
        "action": { "service": "light.turn_on" }
    })]);
    assert_eq!(labels(&automations), vec!["Sun: sunset", "light: Turn On"]);

    let html = to_html(&render(&automations), &RenderOptions::default());
    assert!(html.contains("Night Mode"));
    assert!(!html.contains("Conditions"));
    assert!(!html.contains("yes"));
}

#[test]
fn weekday_condition_gates_actions_with_yes_edge() {
    let automations = normalized(&[json!({
        "alias": "Weekdays",
        "trigger": [{ "platform": "time", "at": "07:00" }],
        "condition": [{ "condition": "time", "weekday": ["mon", "tue"] }],
        "action": [{ "service": "light.turn_on" }, { "delay": { "minutes": 5 } }]
    })]);
    let doc = render(&automations);
    let block = &doc.blocks[0];
    let conditions = block
        .section(haflow_core::EntryKind::Condition)
        .expect("conditions section");
    assert_eq!(conditions.nodes[0].label, "Time: mon, tue");

    let actions = block
        .section(haflow_core::EntryKind::Action)
        .expect("actions section");
    assert_eq!(block.incoming_label(&actions.nodes[0].id), Some("yes"));
    assert_eq!(block.incoming_label(&actions.nodes[1].id), None);

    let html = to_html(&doc, &RenderOptions::default());
    assert_eq!(html.matches(">yes<").count(), 1);
}

#[test]
fn area_targets_become_the_sublabel() {
    let automations = normalized(&[json!({
        "trigger": "sunset",
        "action": { "service": "light.turn_off", "target": { "area_id": ["kitchen", "hall"] } }
    })]);
    let doc = render(&automations);
    let action = &doc.blocks[0].sections[1].nodes[0];
    assert_eq!(action.sublabel.as_deref(), Some("Areas: kitchen, hall"));
}

#[test]
fn user_text_is_escaped_in_every_target() {
    let automations = normalized(&[json!({
        "alias": "<script>alert(1)</script>",
        "trigger": { "platform": "state", "entity_id": "sensor.a&b" },
        "action": { "alias": "Tom & Jerry", "service": "notify.x" }
    })]);
    let doc = render(&automations);
    let options = RenderOptions::default();

    let html = serialize(&doc, OutputFormat::Html, &options, false).expect("html");
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains("sensor.a&amp;b"));
    assert!(html.contains("Tom &amp; Jerry"));
    assert!(!html.contains("Tom & Jerry"));

    let mermaid = serialize(&doc, OutputFormat::Mermaid, &options, false).expect("mermaid");
    assert!(!mermaid.contains("<script>"));
    assert!(mermaid.contains("Tom #amp; Jerry"));
}

#[test]
fn identical_input_serializes_identically() {
    let raws = vec![
        json!({ "id": "a", "trigger": { "platform": "mqtt", "topic": "x/y" }, "action": { "service": "switch.toggle" } }),
        json!({ "id": "b", "trigger": { "platform": "event", "event_type": "call" }, "condition": { "condition": "or", "conditions": [{}, {}] }, "action": [] }),
    ];
    let options = RenderOptions::default();
    let first = serialize(&render(&normalized(&raws)), OutputFormat::Html, &options, false);
    let second = serialize(&render(&normalized(&raws)), OutputFormat::Html, &options, false);
    assert_eq!(first.expect("first"), second.expect("second"));

    let json_text = serialize(&render(&normalized(&raws)), OutputFormat::Json, &options, true)
        .expect("json");
    let parsed: Value = serde_json::from_str(&json_text).expect("valid json");
    assert_eq!(parsed["blocks"][1]["id"], "auto_1");
    assert_eq!(parsed["blocks"][1]["sections"][1]["nodes"][0]["label"], "OR: 2 conditions");
}

#[test]
fn output_format_parses_case_insensitively() {
    assert_eq!("HTML".parse::<OutputFormat>().ok(), Some(OutputFormat::Html));
    assert_eq!("mmd".parse::<OutputFormat>().ok(), Some(OutputFormat::Mermaid));
    assert!("svg".parse::<OutputFormat>().is_err());
}
