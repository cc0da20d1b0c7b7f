//! The browser-automation capability the render sequence is written against.
//!
//! [`crate::browser`] implements it on top of headless Chrome; tests use the
//! in-memory fake from this module.

use crate::pdf::PdfOptions;
use crate::request::Viewport;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("can't launch browser: {0}")]
    Launch(String),
    #[error("can't load page: {0}")]
    Navigation(String),
    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    SelectorTimeout { selector: String, timeout: Duration },
    #[error("script evaluation failed: {0}")]
    Script(String),
    #[error("browser refused to print PDF: {0}")]
    Export(String),
    #[error("screenshot failed: {0}")]
    Screenshot(String),
    #[error("can't close browser: {0}")]
    Close(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Everything needed to start one browser session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub chrome_path: Option<PathBuf>,
    pub navigation_timeout: Duration,
    pub sandbox: bool,
}

pub trait Launcher {
    type Session: Session;

    fn open_session(&self, config: &SessionConfig) -> Result<Self::Session>;
}

/// One open page in a running browser.
pub trait Session {
    /// Navigates and blocks until the browser reports the page as loaded.
    fn navigate(&mut self, url: &Url) -> Result<()>;

    fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Runs the JavaScript expression `script` in the page and returns its
    /// JSON-serializable result. With `await_promise`, a returned promise is
    /// awaited first.
    fn evaluate(&mut self, script: &str, await_promise: bool) -> Result<Option<Value>>;

    fn export_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>>;

    fn screenshot_full_page(&mut self) -> Result<Vec<u8>>;

    /// Releases the page and the browser process behind it.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n% fake document\n%%EOF\n";
    pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

    /// What the fake observed, shared between the launcher and its sessions.
    #[derive(Debug, Default)]
    pub struct Journal {
        pub configs: Vec<SessionConfig>,
        pub calls: Vec<String>,
        pub closed: usize,
    }

    #[derive(Default)]
    pub struct Script {
        pub launch_error: bool,
        pub navigation_error: bool,
        pub export_error: bool,
        pub screenshot_error: bool,
        pub pdf_bytes: Option<Vec<u8>>,
        pub missing_selector: bool,
        /// Values handed out by successive `evaluate` calls; `None` once exhausted.
        pub evaluations: VecDeque<Result<Option<Value>>>,
        /// Runs inside `navigate`, before it returns.
        pub on_navigate: Option<Box<dyn Fn()>>,
    }

    #[derive(Default, Clone)]
    pub struct FakeLauncher {
        pub journal: Rc<RefCell<Journal>>,
        pub script: Rc<RefCell<Script>>,
    }

    impl FakeLauncher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(script: Script) -> Self {
            Self { script: Rc::new(RefCell::new(script)), ..Self::default() }
        }

        pub fn calls(&self) -> Vec<String> {
            self.journal.borrow().calls.clone()
        }

        pub fn closed(&self) -> usize {
            self.journal.borrow().closed
        }
    }

    pub struct FakeSession {
        journal: Rc<RefCell<Journal>>,
        script: Rc<RefCell<Script>>,
    }

    impl FakeSession {
        pub fn new(launcher: &FakeLauncher) -> Self {
            Self { journal: launcher.journal.clone(), script: launcher.script.clone() }
        }

        fn record(&self, call: impl Into<String>) {
            self.journal.borrow_mut().calls.push(call.into());
        }
    }

    impl Launcher for FakeLauncher {
        type Session = FakeSession;

        fn open_session(&self, config: &SessionConfig) -> Result<FakeSession> {
            self.journal.borrow_mut().configs.push(config.clone());
            if self.script.borrow().launch_error {
                return Err(SessionError::Launch("no chrome here".into()));
            }
            Ok(FakeSession::new(self))
        }
    }

    impl Session for FakeSession {
        fn navigate(&mut self, url: &Url) -> Result<()> {
            self.record(format!("navigate {url}"));
            let script = self.script.borrow();
            if let Some(hook) = &script.on_navigate {
                hook();
            }
            if script.navigation_error {
                return Err(SessionError::Navigation("net::ERR_NAME_NOT_RESOLVED".into()));
            }
            Ok(())
        }

        fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
            self.record(format!("wait_for {selector}"));
            if self.script.borrow().missing_selector {
                return Err(SessionError::SelectorTimeout { selector: selector.to_string(), timeout });
            }
            Ok(())
        }

        fn evaluate(&mut self, _script: &str, await_promise: bool) -> Result<Option<Value>> {
            self.record(format!("evaluate await={await_promise}"));
            self.script
                .borrow_mut()
                .evaluations
                .pop_front()
                .unwrap_or(Ok(None))
        }

        fn export_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>> {
            self.record(format!("export_pdf {:?}", options.paper));
            let script = self.script.borrow();
            if script.export_error {
                return Err(SessionError::Export("renderer crashed".into()));
            }
            Ok(script.pdf_bytes.clone().unwrap_or_else(|| FAKE_PDF.to_vec()))
        }

        fn screenshot_full_page(&mut self) -> Result<Vec<u8>> {
            self.record("screenshot");
            if self.script.borrow().screenshot_error {
                return Err(SessionError::Screenshot("page is too large".into()));
            }
            Ok(FAKE_PNG.to_vec())
        }

        fn close(self) -> Result<()> {
            self.record("close");
            self.journal.borrow_mut().closed += 1;
            Ok(())
        }
    }
}
