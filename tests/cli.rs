use std::path::Path;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_webpage2pdf"))
        .args(args)
        // An unlaunchable browser: if validation ever lets a bad invocation
        // through, the run fails with a launch error (6), never a usage error.
        .env("WEBPAGE2PDF_CHROME", "/nonexistent/chromium")
        .output()
        .expect("can't run webpage2pdf")
}

fn assert_usage_error(output: &Output, out: &Path) {
    assert_eq!(output.status.code(), Some(2), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(!output.stderr.is_empty());
    assert!(!out.exists());
}

#[test]
fn missing_url_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");

    let output = run(&["--output", out.to_str().unwrap()]);

    assert_usage_error(&output, &out);
}

#[test]
fn missing_output_is_a_usage_error() {
    let output = run(&["--url", "https://example.com"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--output"));
}

#[test]
fn bad_width_is_rejected_before_launching_a_browser() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");

    for width in ["0", "-1", "abc"] {
        let output = run(&["--url", "https://example.com", "--output", out.to_str().unwrap(), "--width", width]);
        assert_usage_error(&output, &out);
    }
}

#[test]
fn empty_url_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");

    let output = run(&["--url", "", "--output", out.to_str().unwrap()]);

    assert_usage_error(&output, &out);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid argument"), "stderr: {stderr}");
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
}

#[test]
fn relative_url_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");

    let output = run(&["--url", "not a url", "--output", out.to_str().unwrap()]);

    assert_usage_error(&output, &out);
}

#[test]
fn host_without_scheme_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");

    let output = run(&["--url", "example.com:8080/page", "--output", out.to_str().unwrap()]);

    assert_usage_error(&output, &out);
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported URL scheme"));
}
