// integration tests for shell completions

use crate::common::*;

#[test]
fn test_completions_for_each_shell() {
    let env = TestEnv::new();

    for shell in ["bash", "zsh", "fish"] {
        let output = env.run(&["completions", shell]);
        let out = stdout(&output);

        assert!(output.status.success(), "{} failed: {}", shell, stderr(&output));
        assert!(out.contains("formlogic"), "{} script missing binary name", shell);
        assert!(out.contains("resolve"), "{} script missing subcommands", shell);
    }
}

#[test]
fn test_completions_unknown_shell() {
    let env = TestEnv::new();

    let output = env.run(&["completions", "tcsh"]);

    assert_eq!(output.status.code(), Some(2));
}
