// integration tests for the resolve command

use crate::common::*;

fn field<'a>(json: &'a serde_json::Value, id: &str) -> &'a serde_json::Value {
    json["result"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["id"] == id)
        .unwrap_or_else(|| panic!("field {} missing from output", id))
}

#[test]
fn test_resolve_without_values_hides_follow_up() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let (output, json) = env.run_json(&["resolve", form.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["result"]["form"], "survey");

    // absent value: not_equals fires, equals does not
    let b = field(&json, "b");
    assert_eq!(b["isVisible"], false);
    assert_eq!(b["isRequired"], false);

    let a = field(&json, "a");
    assert_eq!(a["isVisible"], true);
    assert_eq!(a["isRequired"], true);
}

#[test]
fn test_resolve_with_set_shows_and_requires() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let (output, json) = env.run_json(&["resolve", form.to_str().unwrap(), "--set", "a=Yes"]);

    assert!(output.status.success());
    let b = field(&json, "b");
    assert_eq!(b["isVisible"], true);
    assert_eq!(b["isRequired"], true);
}

#[test]
fn test_resolve_numeric_comparison_from_values_file() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let values = env.write_raw("values.json5", "{ a: 'No', age: 12 }");

    let (output, json) = env.run_json(&[
        "resolve",
        form.to_str().unwrap(),
        "--values",
        values.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert_eq!(field(&json, "guardian")["isRequired"], true);
}

#[test]
fn test_resolve_set_overrides_values_file() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let values = env.write_json("values.json", &serde_json::json!({ "age": 12 }));

    let (_, json) = env.run_json(&[
        "resolve",
        form.to_str().unwrap(),
        "--values",
        values.to_str().unwrap(),
        "--set",
        "age:=30",
    ]);

    assert_eq!(field(&json, "guardian")["isRequired"], false);
}

#[test]
fn test_resolve_text_output() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let output = env.run_text(&["resolve", form.to_str().unwrap(), "--set", "a=Yes"]);
    let out = stdout(&output);

    assert!(output.status.success());
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("a "));
    assert!(lines[1].contains("visible"));
    assert!(lines[1].contains("required"));
    assert!(lines[3].contains("optional"));
}

#[test]
fn test_resolve_format_template() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let output = env.run(&[
        "resolve",
        form.to_str().unwrap(),
        "--field",
        "b",
        "--format",
        "{id}={isVisible}",
    ]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "b=false");
}

#[test]
fn test_resolve_unknown_field_suggests() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let (output, json) = env.run_json(&["resolve", form.to_str().unwrap(), "--field", "gardian"]);

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(json["error"]["code"], -32004);
    assert_eq!(json["error"]["data"]["suggestions"][0], "guardian");
}

#[test]
fn test_resolve_missing_form_file() {
    let env = TestEnv::new();
    let missing = env.path().join("nope.json");

    let output = env.run_text(&["resolve", missing.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("failed to read"));
}

#[test]
fn test_resolve_invalid_assignment() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let output = env.run_text(&["resolve", form.to_str().unwrap(), "--set", "novalue"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("invalid assignment"));
}

#[test]
fn test_resolve_tolerates_malformed_rules() {
    let env = TestEnv::new();
    let form = env.write_json(
        "form.json",
        &serde_json::json!({
            "id": "f",
            "fields": [
                { "id": "a", "fieldType": "text" },
                { "id": "b", "fieldType": "text" }
            ],
            "conditions": "[{\"sourceField\":\"a\",\"operator\":\"like\",\"value\":\"x\",\"targetField\":\"b\",\"action\":\"hide\"},{\"sourceField\":\"a\",\"operator\":\"is_empty\",\"targetField\":\"b\",\"action\":\"flash\"}]"
        }),
    );

    let (output, json) = env.run_json(&["resolve", form.to_str().unwrap(), "--set", "a=x"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(field(&json, "b")["isVisible"], true);
}

#[test]
fn test_resolve_tolerates_non_string_operator_and_action() {
    let env = TestEnv::new();
    let form = env.write_json(
        "form.json",
        &serde_json::json!({
            "id": "f",
            "fields": [
                { "id": "a", "fieldType": "text" },
                { "id": "b", "fieldType": "text" }
            ],
            "conditions": [
                { "sourceField": "a", "operator": null, "value": "x", "targetField": "b", "action": "hide" },
                { "sourceField": "a", "operator": "equals", "value": "x", "targetField": "b", "action": 7 },
                42
            ]
        }),
    );

    let (output, json) = env.run_json(&["resolve", form.to_str().unwrap(), "--set", "a=x"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(field(&json, "b")["isVisible"], true);
    assert_eq!(field(&json, "b")["isRequired"], false);
}

#[test]
fn test_resolve_quiet_prints_nothing() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let output = env.run(&["--quiet", "resolve", form.to_str().unwrap()]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}
