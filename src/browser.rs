use crate::pdf::PdfOptions;
use crate::session::{Launcher, Result, Session, SessionConfig, SessionError};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::LaunchOptions;
use headless_chrome::browser::tab::Tab;
use log::debug;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Starts a fresh headless Chrome per session.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

/// A headless Chrome process with the single tab we render in.
/// Dropping it kills the browser process.
pub struct ChromeSession {
    browser: headless_chrome::Browser,
    tab: Arc<Tab>,
}

fn chain(err: anyhow::Error) -> String {
    format!("{err:#}")
}

impl Launcher for ChromeLauncher {
    type Session = ChromeSession;

    fn open_session(&self, config: &SessionConfig) -> Result<ChromeSession> {

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(config.sandbox)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .path(config.chrome_path.clone())
            .idle_browser_timeout(config.navigation_timeout.max(Duration::from_secs(30)))
            .build()
            .map_err(|e| SessionError::Launch(format!("invalid launch options: {e}")))?;

        let browser = headless_chrome::Browser::new(launch_options)
            .map_err(|e| SessionError::Launch(chain(e)))?;
        debug!("Browser launched with {}x{} viewport", config.viewport.width, config.viewport.height);

        let tab = browser.new_tab().map_err(|e| SessionError::Launch(chain(e)))?;
        tab.set_default_timeout(config.navigation_timeout);

        if let Some(user_agent) = &config.user_agent {
            tab.set_user_agent(user_agent, None, None)
                .map_err(|e| SessionError::Launch(chain(e)))?;
        }

        Ok(ChromeSession { browser, tab })
    }
}

impl Session for ChromeSession {

    fn navigate(&mut self, url: &Url) -> Result<()> {
        self.tab
            .navigate_to(url.as_str())
            .map_err(|e| SessionError::Navigation(chain(e)))?
            .wait_until_navigated()
            .map_err(|e| SessionError::Navigation(chain(e)))?;
        Ok(())
    }

    fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| {
                debug!("wait for `{selector}` failed: {e:#}");
                SessionError::SelectorTimeout { selector: selector.to_string(), timeout }
            })?;
        Ok(())
    }

    fn evaluate(&mut self, script: &str, await_promise: bool) -> Result<Option<Value>> {

        // The tab hands back previews instead of values for objects, so the
        // result crosses the protocol as a JSON string.
        let expression = if await_promise {
            format!("Promise.resolve(({script})).then(v => JSON.stringify(v))")
        } else {
            format!("JSON.stringify(({script}))")
        };

        let remote = self
            .tab
            .evaluate(&expression, await_promise)
            .map_err(|e| SessionError::Script(chain(e)))?;

        match remote.value {
            Some(Value::String(json)) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| SessionError::Script(format!("unreadable result: {e}"))),
            _ => Ok(None),
        }
    }

    fn export_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>> {
        self.tab
            .print_to_pdf(Some(options.into()))
            .map_err(|e| SessionError::Export(chain(e)))
    }

    fn screenshot_full_page(&mut self) -> Result<Vec<u8>> {

        let size = self
            .evaluate(
                "({ width: document.documentElement.scrollWidth, height: document.documentElement.scrollHeight })",
                false,
            )
            .map_err(|e| SessionError::Screenshot(e.to_string()))?
            .unwrap_or(Value::Null);

        let dimension = |key: &str| size.get(key).and_then(Value::as_f64).filter(|v| *v > 0.0);
        let (Some(width), Some(height)) = (dimension("width"), dimension("height")) else {
            return Err(SessionError::Screenshot("can't measure page size".into()));
        };
        debug!("Capturing {width}x{height} screenshot");

        let clip = Page::Viewport { x: 0.0, y: 0.0, width, height, scale: 1.0 };
        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| SessionError::Screenshot(chain(e)))
    }

    fn close(self) -> Result<()> {
        let closed = self.tab.close(false);
        // Browser's Drop terminates the Chrome process.
        drop(self.browser);
        closed.map(|_| ()).map_err(|e| SessionError::Close(chain(e)))
    }
}
