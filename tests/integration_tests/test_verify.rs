// integration tests for the verify command

use crate::common::*;

#[test]
fn test_verify_clean_form() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let (output, json) = env.run_json(&["verify", form.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json["result"]["valid"], true);
    assert_eq!(json["result"]["issues"], serde_json::json!([]));
}

#[test]
fn test_verify_text_clean_form() {
    let env = TestEnv::new();
    let form = env.write_json("form.json", &sample_form());

    let output = env.run_text(&["verify", form.to_str().unwrap()]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("✓ Form is valid"));
}

#[test]
fn test_verify_reports_errors_with_paths() {
    let env = TestEnv::new();
    let mut form = sample_form();
    form["conditions"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({
            "id": "c5", "sourceField": "b", "operator": "is_empty",
            "targetField": "b", "action": "hide"
        }));
    let form = env.write_json("form.json", &form);

    let output = env.run_text(&["verify", form.to_str().unwrap()]);
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(4));
    assert!(out.contains("error: conditions[4]:"));
    assert!(out.contains("both source and target"));
}

#[test]
fn test_verify_json_failure_carries_details() {
    let env = TestEnv::new();
    let mut form = sample_form();
    form["conditions"][0]["operator"] = serde_json::json!("like");
    let form = env.write_json("form.json", &form);

    let (output, json) = env.run_json(&["verify", form.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(json["error"]["message"], "form verification failed");
    assert_eq!(
        json["error"]["data"]["details"][0],
        "error: conditions[0]: unknown operator 'like'"
    );
}

#[test]
fn test_verify_warnings_pass_unless_strict() {
    let env = TestEnv::new();
    let mut form = sample_form();
    form["conditions"][0]["targetField"] = serde_json::json!("bb");
    let form = env.write_json("form.json", &form);
    let path = form.to_str().unwrap();

    let output = env.run_text(&["verify", path]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("target field 'bb' does not exist (did you mean 'b'?)"));

    let output = env.run_text(&["verify", path, "--strict"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_verify_strict_from_config() {
    let env = TestEnv::new();
    env.write_json(
        "config.json",
        &serde_json::json!({ "settings": { "verify": { "strict": true } } }),
    );
    let mut form = sample_form();
    form["fields"][0]["options"] = serde_json::json!([]);
    let form = env.write_json("form.json", &form);

    let output = env.run_text(&["verify", form.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stdout(&output).contains("radio field 'a' has no options"));
}

#[test]
fn test_verify_unparseable_form() {
    let env = TestEnv::new();
    let form = env.write_raw("form.json", "{ fields: [ ");

    let output = env.run_text(&["verify", form.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("failed to parse"));
}
