// integration tests for field editing

use crate::common::*;

fn field_ids(env: &TestEnv, form: &std::path::Path) -> Vec<(String, u64)> {
    env.read_json(form)["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            (
                f["id"].as_str().unwrap().to_string(),
                f["displayOrder"].as_u64().unwrap(),
            )
        })
        .collect()
}

#[test]
fn test_field_add_appends_with_generated_id() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let (output, json) = env.run_json(&[
        "field", "add", "--form", path, "Color", "--type", "select", "--option", "Red",
        "--option", "Blue", "--required",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json["result"]["action"], "add");
    assert_eq!(json["result"]["field"]["id"], "field_1");
    assert_eq!(json["result"]["field"]["fieldType"], "select");
    assert_eq!(json["result"]["field"]["isRequired"], true);
    assert_eq!(json["result"]["field"]["options"], serde_json::json!(["Red", "Blue"]));
    assert_eq!(json["result"]["field"]["displayOrder"], 4);
}

#[test]
fn test_field_add_at_position_resequences() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let output = env.run(&["field", "add", "--form", path, "Intro", "--at", "0"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let ids = field_ids(&env, &form);
    assert_eq!(ids[0], ("field_1".to_string(), 0));
    assert_eq!(ids[1], ("a".to_string(), 1));
    assert_eq!(ids[4], ("guardian".to_string(), 4));
}

#[test]
fn test_field_add_out_of_range() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let output = env.run_text(&[
        "field",
        "add",
        "--form",
        form.to_str().unwrap(),
        "X",
        "--at",
        "9",
    ]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("out of range"));
}

#[test]
fn test_field_remove_drops_referencing_rules() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let output = env.run_text(&["field", "remove", "--form", path, "b"]);
    let out = stdout(&output);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(out.contains("Removed field b (Pet Name)"));
    assert!(out.contains("Dropped 3 rule(s)"));

    let saved = env.read_json(&form);
    let rules = saved["conditions"].as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["id"], "c4");
    assert_eq!(
        field_ids(&env, &form),
        vec![
            ("a".to_string(), 0),
            ("age".to_string(), 1),
            ("guardian".to_string(), 2)
        ]
    );
}

#[test]
fn test_field_move() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let output = env.run(&["field", "move", "--form", path, "guardian", "--to", "1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let ids: Vec<String> = field_ids(&env, &form).into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["a", "guardian", "b", "age"]);
}

#[test]
fn test_field_update_required_and_label() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());
    let path = form.to_str().unwrap();

    let output = env.run(&[
        "field", "update", "--form", path, "b", "--label", "Name of pet", "--required", "yes",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let saved = env.read_json(&form);
    assert_eq!(saved["fields"][1]["label"], "Name of pet");
    assert_eq!(saved["fields"][1]["isRequired"], true);
}

#[test]
fn test_field_unknown_id_suggests() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let output = env.run_text(&["field", "remove", "--form", form.to_str().unwrap(), "agee"]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("unknown field 'agee'"));
    assert!(stderr(&output).contains("did you mean 'age'?"));
}

#[test]
fn test_field_list_in_display_order() {
    let env = TestEnv::new();
    let mut form = sample_form();
    form["fields"][0]["displayOrder"] = serde_json::json!(9);
    let form = env.write_json("form.json", &form);

    let output = env.run_text(&["field", "list", "--form", form.to_str().unwrap()]);
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();

    assert!(output.status.success());
    assert_eq!(lines[0], "1. Pet Name (b) [text]");
    assert_eq!(lines[3], "9. Has Pet (a) [radio] *");
}
