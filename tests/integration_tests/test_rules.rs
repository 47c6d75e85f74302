// integration tests for rule editing

use crate::common::*;

fn rule_ids(env: &TestEnv, form: &std::path::Path) -> Vec<String> {
    env.read_json(form)["conditions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_rule_add_appends_and_saves() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let (output, json) = env.run_json(&[
        "rule", "add", "--form", path, "--source", "age", "--operator", "greater_equal",
        "--value", "65", "--target", "guardian", "--action", "hide",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json["result"]["action"], "add");
    assert_eq!(json["result"]["rule"]["id"], "cond_1");
    assert_eq!(json["result"]["rule"]["operator"], "greater_equal");

    assert_eq!(rule_ids(&env, &form), vec!["c1", "c2", "c3", "c4", "cond_1"]);
}

#[test]
fn test_rule_add_rejects_self_reference() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let output = env.run_text(&[
        "rule", "add", "--form", path, "--source", "b", "--operator", "is_empty",
        "--target", "b", "--action", "hide",
    ]);

    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("cannot be both source and target"));
    // nothing written
    assert_eq!(rule_ids(&env, &form).len(), 4);
}

#[test]
fn test_rule_add_unknown_field_suggests() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let (output, json) = env.run_json(&[
        "rule", "add", "--form", path, "--source", "agee", "--operator", "is_empty",
        "--target", "b", "--action", "hide",
    ]);

    assert_eq!(output.status.code(), Some(5));
    assert_eq!(json["error"]["code"], -32005);
    assert_eq!(json["error"]["data"]["suggestions"][0], "age");
}

#[test]
fn test_rule_add_rejects_unknown_operator_and_missing_operand() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let output = env.run_text(&[
        "rule", "add", "--form", path, "--source", "a", "--operator", "matches",
        "--value", "x", "--target", "b", "--action", "hide",
    ]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("unknown operator 'matches'"));

    let output = env.run_text(&[
        "rule", "add", "--form", path, "--source", "a", "--operator", "contains",
        "--target", "b", "--action", "hide",
    ]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("needs a comparison value"));
}

#[test]
fn test_rule_update_keeps_position() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let output = env.run(&["rule", "update", "--form", path, "c2", "--value", "No"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let saved = env.read_json(&form);
    assert_eq!(saved["conditions"][1]["id"], "c2");
    assert_eq!(saved["conditions"][1]["value"], "No");
    assert_eq!(saved["conditions"][1]["operator"], "not_equals");
}

#[test]
fn test_rule_remove_and_missing_id() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let output = env.run_text(&["rule", "remove", "--form", path, "c2"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Removed rule c2"));
    assert_eq!(rule_ids(&env, &form), vec!["c1", "c3", "c4"]);

    let output = env.run_text(&["rule", "remove", "--form", path, "c2"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("no rule with id 'c2'"));
}

#[test]
fn test_rule_list_in_order() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let output = env.run_text(&["rule", "list", "--form", form.to_str().unwrap()]);
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();

    assert!(output.status.success());
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "1. [c1] when a equals \"Yes\" then show b");
    assert_eq!(lines[3], "4. [c4] when age less_than \"18\" then require guardian");
}

#[test]
fn test_rule_add_changes_resolution() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    // a later hide overrides the earlier show
    let output = env.run(&[
        "rule", "add", "--form", path, "--source", "age", "--operator", "is_not_empty",
        "--target", "b", "--action", "hide",
    ]);
    assert!(output.status.success());

    let output = env.run(&[
        "resolve", path, "--field", "b", "--set", "a=Yes", "--set", "age:=3",
        "--format", "{isVisible}",
    ]);
    assert_eq!(stdout(&output).trim(), "false");
}
