use crate::*;
use serde_json::json;

#[test]
fn parse_config_yaml_reads_a_list_of_automations() {
    let text = r#"
- id: "1"
  alias: Night Mode
  trigger:
    platform: sun
    event: sunset
  action:
    service: light.turn_on
- id: "2"
  alias: Morning
  triggers:
    - trigger: time
      at: "07:00:00"
  actions: []
"#;
    let records = parse_config_yaml(text).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0],
        json!({
            "id": "1",
            "alias": "Night Mode",
            "trigger": { "platform": "sun", "event": "sunset" },
            "action": { "service": "light.turn_on" }
        })
    );
    assert_eq!(records[1]["triggers"][0]["at"], "07:00:00");
}

#[test]
fn parse_config_yaml_accepts_single_mapping_and_empty_documents() {
    assert_eq!(parse_config_yaml("").unwrap().len(), 0);
    assert_eq!(parse_config_yaml("   \n").unwrap().len(), 0);
    assert_eq!(parse_config_yaml("~").unwrap().len(), 0);
    assert_eq!(parse_config_yaml("alias: Solo").unwrap(), vec![json!({ "alias": "Solo" })]);
}

#[test]
fn parse_config_yaml_rejects_scalars_and_bad_syntax() {
    let err = parse_config_yaml("just a string").unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedShape {
            found: "string",
            ..
        }
    ));
    assert!(matches!(
        parse_config_yaml("- alias: [unclosed").unwrap_err(),
        Error::ConfigYaml(_)
    ));
}

#[test]
fn parse_config_yaml_unwraps_tagged_values() {
    let text = r#"
- alias: Morning
  action:
    service: notify.mobile
- alias: Blueprint
  trigger:
    platform: state
    entity_id: !input motion_sensor
  action:
    service: notify.mobile
    data:
      message: !secret msg
"#;
    let records = parse_config_yaml(text).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["trigger"]["entity_id"], "motion_sensor");
    assert_eq!(records[1]["action"]["data"]["message"], "msg");
}

#[test]
fn parse_config_yaml_drops_only_records_without_a_json_form() {
    let text = r#"
- alias: Broken
  trigger:
    platform: numeric_state
    above: .nan
- alias: Fine
  trigger:
    platform: numeric_state
    above: 20
"#;
    let records = parse_config_yaml(text).unwrap();
    assert_eq!(records, vec![json!({
        "alias": "Fine",
        "trigger": { "platform": "numeric_state", "above": 20 }
    })]);
}

#[test]
fn parse_config_yaml_applies_merge_keys_and_stringifies_scalar_keys() {
    let text = r#"
- alias: Merged
  action:
    <<: { service: light.turn_on }
    data:
      1: one
      true: yes
"#;
    let records = parse_config_yaml(text).unwrap();
    assert_eq!(records[0]["action"]["service"], "light.turn_on");
    assert_eq!(records[0]["action"]["data"], json!({ "1": "one", "true": "yes" }));
}

#[test]
fn enabled_automation_states_filters_domain_and_state() {
    let states = parse_states_json(
        r#"[
            {"entity_id": "automation.a", "state": "on", "attributes": {}},
            {"entity_id": "automation.b", "state": "off", "attributes": {}},
            {"entity_id": "light.c", "state": "on", "attributes": {}},
            {"state": "on"}
        ]"#,
    )
    .unwrap();
    let enabled = enabled_automation_states(&states);
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0]["entity_id"], "automation.a");
}

#[test]
fn parse_states_json_reports_invalid_json() {
    assert!(matches!(
        parse_states_json("[{").unwrap_err(),
        Error::StatesJson(_)
    ));
    assert!(parse_states_json("").unwrap().is_empty());
}
