use std::path::{Path, PathBuf};
use thiserror::Error;
use url::{ParseError, Url};

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Schemes Chrome can print.
const SCHEMES: &[&str] = &["http", "https", "file", "data", "about"];

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("--url is missing or empty")]
    MissingUrl,
    #[error("--output is missing or empty")]
    MissingOutput,
    #[error("UrlError, can't parse given URL `{0}`: {1}")]
    UrlError(String, ParseError),
    #[error("unsupported URL scheme `{0}:` (expected one of http, https, file, data, about)")]
    UnsupportedScheme(String),
    #[error("{0} must be a positive integer")]
    NonPositive(&'static str),
}

pub type Result<T> = std::result::Result<T, RequestError>;

/// Browser viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 {
            return Err(RequestError::NonPositive("width"));
        }
        if height == 0 {
            return Err(RequestError::NonPositive("height"));
        }
        Ok(Self { width, height })
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT }
    }
}

/// One page to render, built once per invocation.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub url: Url,
    pub output_path: PathBuf,
    pub viewport: Viewport,
    /// Full-page PNG captured before the PDF export.
    pub screenshot_path: Option<PathBuf>,
}

impl RenderRequest {

    pub fn new(url: &str, output_path: impl Into<PathBuf>, viewport: Viewport) -> Result<Self> {

        let output_path = output_path.into();
        if output_path.as_os_str().is_empty() {
            return Err(RequestError::MissingOutput);
        }

        Ok(Self {
            url: parse_target(url)?,
            output_path,
            viewport,
            screenshot_path: None,
        })
    }

    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot_path = Some(path.into());
        self
    }
}

/// Accepts an absolute URL, or a path to an existing local file which is
/// turned into a `file://` URL.
fn parse_target(raw: &str) -> Result<Url> {

    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RequestError::MissingUrl);
    }

    match Url::parse(raw) {
        Ok(url) if SCHEMES.contains(&url.scheme()) => Ok(url),
        // `example.com:8080/page` parses with `example.com` as its scheme.
        Ok(url) => Err(RequestError::UnsupportedScheme(url.scheme().to_string())),
        Err(err) => {
            let path = Path::new(raw);
            if path.is_file() {
                let absolute = std::path::absolute(path)
                    .map_err(|_| RequestError::UrlError(raw.to_string(), err))?;
                Url::from_file_path(&absolute)
                    .map_err(|_| RequestError::UrlError(raw.to_string(), err))
            } else {
                Err(RequestError::UrlError(raw.to_string(), err))
            }
        }
    }
}
