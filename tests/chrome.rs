//! End-to-end runs against a real Chromium; they also need network access.
//! Run with `cargo test -- --ignored`.

use std::time::Duration;
use webpage2pdf::browser::ChromeLauncher;
use webpage2pdf::render::{CancelToken, RenderError, RenderOptions, render};
use webpage2pdf::request::{RenderRequest, Viewport};
use webpage2pdf::webpage::PageOptions;

fn options() -> RenderOptions {
    RenderOptions {
        navigation_timeout: Duration::from_secs(30),
        page: PageOptions { settle: Duration::from_millis(200), ..Default::default() },
        ..Default::default()
    }
}

#[test]
#[ignore = "needs Chromium and network"]
fn example_com_becomes_a_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");
    let request = RenderRequest::new("https://example.com", &out, Viewport::default()).unwrap();

    let report = render(&ChromeLauncher, &request, &options(), &CancelToken::new()).unwrap();

    let pdf = std::fs::read(&out).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
    assert_eq!(report.pdf_bytes, pdf.len());
}

#[test]
#[ignore = "needs Chromium and network"]
fn second_run_replaces_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");
    std::fs::write(&out, b"stale").unwrap();
    let request = RenderRequest::new("https://example.com", &out, Viewport::default()).unwrap();

    render(&ChromeLauncher, &request, &options(), &CancelToken::new()).unwrap();
    render(&ChromeLauncher, &request, &options(), &CancelToken::new()).unwrap();

    assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF-"));
}

#[test]
#[ignore = "needs Chromium"]
fn unresolvable_host_is_a_navigation_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");
    let request = RenderRequest::new("https://does-not-exist.invalid", &out, Viewport::default()).unwrap();

    let err = render(&ChromeLauncher, &request, &options(), &CancelToken::new()).unwrap_err();

    assert!(matches!(err, RenderError::Navigation(_)), "{err}");
    assert!(!out.exists());
}

#[test]
#[ignore = "needs Chromium"]
fn local_file_with_screenshot() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    std::fs::write(&page, "<html><body><h1>Hello</h1><img src='missing.png'></body></html>").unwrap();
    let out = dir.path().join("nested/page.pdf");
    let shot = dir.path().join("nested/page.png");
    let request = RenderRequest::new(page.to_str().unwrap(), &out, Viewport::new(414, 896).unwrap())
        .unwrap()
        .with_screenshot(&shot);

    render(&ChromeLauncher, &request, &options(), &CancelToken::new()).unwrap();

    assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF-"));
    assert!(std::fs::read(&shot).unwrap().starts_with(b"\x89PNG"));
}
