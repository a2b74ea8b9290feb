//! Assertion behaviour of captured command results

use everest_cli_e2e::{normalize, E2eError, InvocationResult};
use test_case::test_case;

const HELP: &str = "Usage:\r\n  everest [command]\r\n\r\nAvailable Commands:\r\n  \
completion  Generate the autocompletion script for the specified shell\r\n  \
help        Help about any command\r\n  \
install\t\tInstall Kubernetes operators\r\n";

fn help_output() -> InvocationResult {
    InvocationResult::new("everest --help", 0, HELP, "")
}

#[test_case(0, true ; "zero is success")]
#[test_case(1, false ; "one is failure")]
#[test_case(-1, false ; "killed by signal")]
#[test_case(127, false ; "command not found")]
fn assert_success_iff_exit_code_zero(code: i32, ok: bool) {
    let out = InvocationResult::new("cmd", code, "", "");
    assert_eq!(out.assert_success().is_ok(), ok);
    assert_eq!(out.is_success(), ok);
}

#[test]
fn assert_success_reports_code_and_streams() {
    let out = InvocationResult::new("everest install operators", 1, "partial", "Backup name cannot be empty");
    match out.assert_success().unwrap_err() {
        E2eError::UnexpectedExitCode {
            expected,
            actual,
            stdout,
            stderr,
            ..
        } => {
            assert_eq!(expected, 0);
            assert_eq!(actual, 1);
            assert_eq!(stdout, "partial");
            assert_eq!(stderr, "Backup name cannot be empty");
        }
        other => panic!("expected UnexpectedExitCode, got {other:?}"),
    }
}

#[test]
fn exit_code_equals_matches_expected_code() {
    let out = InvocationResult::new("everest install operators", 1, "", "");
    assert!(out.exit_code_equals(1).is_ok());
    assert!(matches!(
        out.exit_code_equals(0),
        Err(E2eError::UnexpectedExitCode { expected: 0, actual: 1, .. })
    ));
}

#[test]
fn normalized_containment_survives_column_alignment() {
    let out = help_output();
    // Raw match fails on the alignment padding
    assert!(out.out_contains(["help Help about any command"]).is_err());
    out.out_contains_normalized_many([
        "Usage:",
        "everest [command]",
        "Available Commands:",
        "completion Generate the autocompletion script for the specified shell",
        "help Help about any command",
        "install Install Kubernetes operators",
    ])
    .unwrap();
}

#[test]
fn normalized_needle_is_normalized_too() {
    let out = InvocationResult::new("cmd", 0, "foo   bar", "");
    assert!(out.out_contains(["foo bar"]).is_err());
    out.out_contains_normalized_many(["foo bar"]).unwrap();
    out.out_contains_normalized_many(["foo \t bar  "]).unwrap();
}

#[test]
fn normalized_containment_still_rejects_absent_text() {
    let out = help_output();
    match out.out_contains_normalized_many(["Usage:", "uninstall"]).unwrap_err() {
        E2eError::MissingExpectedText { expected, stream, .. } => {
            assert_eq!(expected, "uninstall");
            assert_eq!(stream, "stdout");
        }
        other => panic!("expected MissingExpectedText, got {other:?}"),
    }
}

#[test]
fn first_missing_needle_is_reported() {
    let out = InvocationResult::new("kubectl get pods", 0, "everest-operator", "");
    let err = out
        .out_contains(["everest-operator", "percona-postgresql-operator", "percona-xtradb-cluster-operator"])
        .unwrap_err();
    assert!(matches!(
        err,
        E2eError::MissingExpectedText { ref expected, .. } if expected == "percona-postgresql-operator"
    ));
}

#[test]
fn stderr_only_checked_by_combined_assertions() {
    let out = InvocationResult::new(
        "everest install operators",
        0,
        "",
        "everest-operator operator has been installed\n",
    );
    assert!(out.out_contains(["everest-operator operator"]).is_err());
    out.out_err_contains(["everest-operator operator has been installed"]).unwrap();
    out.out_err_contains_normalized_many(["everest-operator   operator has been installed"])
        .unwrap();
}

#[test]
fn out_contains_and_out_not_contains_are_exclusive() {
    let out = InvocationResult::new("everest list versions --type pxc", 0, "pxc 8.0.32", "");
    assert!(out.out_contains(["pxc"]).is_ok());
    assert!(out.out_not_contains(["pxc"]).is_err());

    out.out_not_contains(["postgresql", "psmdb"]).unwrap();
    assert!(out.out_contains(["psmdb"]).is_err());
}

#[test]
fn out_not_contains_names_first_match() {
    let out = InvocationResult::new("kubectl get pods", 0, "percona-server-mongodb-operator\npercona-postgresql-operator", "");
    match out
        .out_not_contains(["percona-xtradb-cluster-operator", "percona-postgresql-operator"])
        .unwrap_err()
    {
        E2eError::UnexpectedText { unexpected, .. } => {
            assert_eq!(unexpected, "percona-postgresql-operator")
        }
        other => panic!("expected UnexpectedText, got {other:?}"),
    }
}

#[test]
fn out_err_not_contains_checks_stderr() {
    let out = InvocationResult::new("cmd", 0, "", "panic: runtime error");
    assert!(out.out_not_contains(["panic"]).is_ok());
    assert!(out.out_err_not_contains(["panic"]).is_err());
}

#[test]
fn empty_needle_list_always_passes() {
    let out = InvocationResult::new("cmd", 0, "", "");
    let none: [&str; 0] = [];
    out.out_contains(none).unwrap();
    out.out_contains_normalized_many(none).unwrap();
    out.out_not_contains(none).unwrap();
}

#[test]
fn json_stdout_is_parsed() {
    let out = InvocationResult::new(
        "everest --json list versions",
        0,
        r#"{"pxc": ["8.0.32"], "psmdb": ["6.0.5"], "postgresql": ["15.2"]}"#,
        "",
    );
    let versions: std::collections::HashMap<String, Vec<String>> = out.json().unwrap();
    assert_eq!(versions["pxc"], vec!["8.0.32".to_string()]);

    let broken = InvocationResult::new("cmd", 0, "not json", "");
    assert!(matches!(
        broken.json::<serde_json::Value>(),
        Err(E2eError::Json(_))
    ));
}

#[test_case("a\r\nb", "a\nb" ; "crlf")]
#[test_case("a\rb", "a\nb" ; "lone cr")]
#[test_case("a   \t b", "a b" ; "whitespace run")]
#[test_case("  a b  ", "a b" ; "trimmed")]
#[test_case("\x1b[32ma\x1b[0m b", "a b" ; "ansi")]
fn normalization_is_format_insensitive(raw: &str, canonical: &str) {
    assert_eq!(normalize(raw), canonical);
    assert_eq!(normalize(&normalize(raw)), normalize(raw));
}

#[test_case("ok \x1b[1\t m done" ; "tab inside csi")]
#[test_case("ok \x1b[1\u{a0}\u{a0}m done" ; "nbsp inside csi")]
#[test_case("\x1b[1;\t\t32mgreen \x1b" ; "trailing lone escape")]
fn normalized_output_contains_itself(stdout: &str) {
    let out = InvocationResult::new("cmd", 0, stdout, "");
    let visible = normalize(stdout);
    assert_eq!(normalize(&visible), visible);
    out.out_contains_normalized_many([visible.as_str()]).unwrap();
}
