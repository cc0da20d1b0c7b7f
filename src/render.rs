use crate::output::{self, Staged};
use crate::pdf::{self, PdfOptions};
use crate::request::{RenderRequest, RequestError};
use crate::session::{Launcher, Session, SessionConfig, SessionError};
use crate::webpage::{self, PageOptions};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] RequestError),
    #[error("Browser error: {0}")]
    Launch(String),
    #[error("Navigation error: {0}")]
    Navigation(String),
    #[error("Export error: {0}")]
    Export(String),
    #[error("I/O error writing {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Interrupted")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, RenderError>;

impl From<SessionError> for RenderError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Launch(_) | SessionError::Close(_) => RenderError::Launch(err.to_string()),
            SessionError::Navigation(_) | SessionError::SelectorTimeout { .. } | SessionError::Script(_) => {
                RenderError::Navigation(err.to_string())
            }
            SessionError::Export(_) | SessionError::Screenshot(_) => RenderError::Export(err.to_string()),
        }
    }
}

impl RenderError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            RenderError::InvalidArgument(_) => 2,
            RenderError::Navigation(_) => 3,
            RenderError::Export(_) => 4,
            RenderError::Io { .. } => 5,
            RenderError::Launch(_) => 6,
            RenderError::Cancelled => 130,
        }
    }
}

/// Knobs beyond the render request itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub user_agent: Option<String>,
    pub chrome_path: Option<PathBuf>,
    pub navigation_timeout: Duration,
    pub sandbox: bool,
    pub page: PageOptions,
    pub pdf: PdfOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            chrome_path: None,
            navigation_timeout: Duration::from_secs(60),
            sandbox: true,
            page: PageOptions::default(),
            pdf: PdfOptions::default(),
        }
    }
}

impl RenderOptions {
    fn session_config(&self, request: &RenderRequest) -> SessionConfig {
        SessionConfig {
            viewport: request.viewport,
            user_agent: self.user_agent.clone(),
            chrome_path: self.chrome_path.clone(),
            navigation_timeout: self.navigation_timeout,
            sandbox: self.sandbox,
        }
    }
}

/// Shared flag that stops a render at the next step boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() { Err(RenderError::Cancelled) } else { Ok(()) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub output_path: PathBuf,
    pub pdf_bytes: usize,
    pub screenshot_path: Option<PathBuf>,
}

/// Loads the requested page in a fresh browser session and writes it out as
/// a PDF. The session is closed on every path once it has been opened.
pub fn render<L: Launcher>(
    launcher: &L,
    request: &RenderRequest,
    options: &RenderOptions,
    cancel: &CancelToken,
) -> Result<RenderReport> {

    cancel.check()?;
    let mut session = launcher.open_session(&options.session_config(request))?;

    let outcome = capture(&mut session, request, options, cancel);

    if let Err(e) = session.close() {
        warn!("{e}");
    }

    // An interrupt also reaches the browser, so the step in flight fails
    // with its own error.
    match outcome {
        Err(_) if cancel.is_cancelled() => Err(RenderError::Cancelled),
        outcome => outcome,
    }
}

fn capture<S: Session>(
    session: &mut S,
    request: &RenderRequest,
    options: &RenderOptions,
    cancel: &CancelToken,
) -> Result<RenderReport> {

    cancel.check()?;
    info!("Loading page {}...", request.url);
    session.navigate(&request.url)?;

    cancel.check()?;
    webpage::prepare(session, &options.page)?;

    cancel.check()?;
    let screenshot = match &request.screenshot_path {
        Some(path) => {
            info!("Capturing full-page screenshot...");
            Some((path, session.screenshot_full_page()?))
        }
        None => None,
    };

    info!("Generating PDF...");
    let pdf = session.export_pdf(&options.pdf)?;
    if !pdf::is_pdf(&pdf) {
        return Err(RenderError::Export(format!(
            "browser returned {} bytes that are not a PDF document",
            pdf.len()
        )));
    }

    // Stage everything before replacing anything, so a failed write leaves
    // no files behind.
    let staged_pdf = stage(&request.output_path, &pdf)?;
    let staged_screenshot = match &screenshot {
        Some((path, png)) => Some(stage(path, png)?),
        None => None,
    };

    cancel.check()?;
    commit(&request.output_path, staged_pdf)?;
    if let (Some(staged), Some((path, _))) = (staged_screenshot, &screenshot) {
        if let Err(e) = commit(path, staged) {
            if let Err(cleanup) = std::fs::remove_file(&request.output_path) {
                warn!("Can't remove {}: {cleanup}", request.output_path.display());
            }
            return Err(e);
        }
        info!("Saved screenshot to {}", path.display());
    }

    Ok(RenderReport {
        output_path: request.output_path.clone(),
        pdf_bytes: pdf.len(),
        screenshot_path: request.screenshot_path.clone(),
    })
}

fn stage(path: &Path, bytes: &[u8]) -> Result<Staged> {
    output::stage(path, bytes).map_err(|source| RenderError::Io { path: path.to_path_buf(), source })
}

fn commit(path: &Path, staged: Staged) -> Result<()> {
    staged.commit().map_err(|source| RenderError::Io { path: path.to_path_buf(), source })
}
