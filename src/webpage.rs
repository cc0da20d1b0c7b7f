//! Getting a freshly loaded page ready to print.
//!
//! Many pages only fetch their images once they scroll into view, so before
//! exporting we walk the page top to bottom, give lazy images a chance to
//! load and log what is still missing. Only the HTTP status check and the
//! optional selector wait can fail the render; the rest is best effort.

use crate::images::{self, ImageReport};
use crate::session::{Session, SessionError};
use log::{debug, info, warn};
use serde_json::Value;
use std::time::Duration;

const STATUS_SCRIPT: &str = r#"
    (() => {
        const entry = performance.getEntriesByType('navigation')[0];
        return entry && entry.responseStatus ? entry.responseStatus : 0;
    })()
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    /// CSS selector that must be present before the page is printed.
    pub wait_for: Option<String>,
    pub selector_timeout: Duration,
    /// Scope for image checks; every `<img>` when unset.
    pub content_selector: Option<String>,
    pub lazy_load: bool,
    pub scroll_step_px: u32,
    pub scroll_interval: Duration,
    pub image_timeout: Duration,
    /// Pause after each preparation step.
    pub settle: Duration,
    pub allow_http_errors: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            wait_for: None,
            selector_timeout: Duration::from_secs(10),
            content_selector: None,
            lazy_load: true,
            scroll_step_px: 100,
            scroll_interval: Duration::from_millis(100),
            image_timeout: Duration::from_secs(30),
            settle: Duration::from_secs(1),
            allow_http_errors: false,
        }
    }
}

impl PageOptions {
    fn image_selector(&self) -> String {
        match &self.content_selector {
            Some(scope) => format!("{scope} img"),
            None => "img".to_string(),
        }
    }
}

/// Runs after navigation and before export.
pub fn prepare<S: Session>(session: &mut S, options: &PageOptions) -> Result<(), SessionError> {

    check_status(session, options)?;

    if let Some(selector) = &options.wait_for {
        info!("Waiting for `{selector}`...");
        session.wait_for_selector(selector, options.selector_timeout)?;
    }

    if !options.lazy_load {
        return Ok(());
    }

    info!("Scrolling through page to trigger lazy loading...");
    match session.evaluate(&scroll_script(options), true) {
        Ok(Some(Value::String(state))) if state == "timeout" => {
            warn!("Page still growing after {:?} of scrolling, continuing anyway", options.image_timeout)
        }
        other => best_effort("scrolling", other),
    }
    settle(options);

    let selector = options.image_selector();
    info!("Ensuring all images are loaded...");
    let outcome = session.evaluate(
        &images::load_script(&selector, options.image_timeout.as_millis()),
        true,
    );
    match outcome {
        Ok(Some(Value::String(state))) if state == "timeout" => {
            warn!("Image loading timed out after {:?}, continuing anyway", options.image_timeout)
        }
        other => best_effort("image loading", other),
    }
    settle(options);

    match session.evaluate(&images::status_script(&selector), false) {
        Ok(value) => match ImageReport::from_value(value) {
            Ok(report) if report.is_empty() => debug!("No images matched `{selector}`"),
            Ok(report) => {
                info!("{} images found, {} not loaded", report.len(), report.pending());
                report.log_details();
            }
            Err(e) => warn!("Can't read image status: {e}"),
        },
        Err(e) => warn!("Can't read image status: {e}"),
    }

    best_effort("revealing images", session.evaluate(&images::reveal_script(&selector), false));
    settle(options);

    Ok(())
}

fn check_status<S: Session>(session: &mut S, options: &PageOptions) -> Result<(), SessionError> {

    let status = match session.evaluate(STATUS_SCRIPT, false) {
        Ok(value) => value.as_ref().and_then(Value::as_u64).unwrap_or(0),
        Err(e) => {
            warn!("Can't read response status: {e}");
            return Ok(());
        }
    };

    // 0 means the browser doesn't expose it (older Chrome, file:// URLs).
    if status == 0 {
        debug!("Response status unknown");
        return Ok(());
    }
    debug!("Response status {status}");

    if status >= 400 && !options.allow_http_errors {
        return Err(SessionError::Navigation(format!("server answered with HTTP {status}")));
    }

    Ok(())
}

/// Scrolls to the bottom and back. Infinite-scroll pages never reach the
/// bottom, so the walk gives up with `"timeout"` after `image_timeout`.
fn scroll_script(options: &PageOptions) -> String {
    let step = options.scroll_step_px.max(1);
    let interval = options.scroll_interval.as_millis();
    let timeout_ms = options.image_timeout.as_millis();
    format!(
        r#"
        new Promise((resolve) => {{
            let total = 0;
            const finish = (result) => {{
                clearInterval(timer);
                clearTimeout(deadline);
                window.scrollTo(0, 0);
                resolve(result);
            }};
            const timer = setInterval(() => {{
                const height = document.body ? document.body.scrollHeight : 0;
                window.scrollBy(0, {step});
                total += {step};
                if (total >= height) {{
                    finish(total);
                }}
            }}, {interval});
            const deadline = setTimeout(() => finish('timeout'), {timeout_ms});
        }})
        "#
    )
}

fn best_effort(step: &str, outcome: Result<Option<Value>, SessionError>) {
    if let Err(e) = outcome {
        warn!("Page preparation step `{step}` failed, continuing: {e}");
    }
}

fn settle(options: &PageOptions) {
    if !options.settle.is_zero() {
        std::thread::sleep(options.settle);
    }
}
