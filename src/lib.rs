//! Renders a webpage in headless Chrome and saves it as a PDF.
//!
//! ```no_run
//! use webpage2pdf::browser::ChromeLauncher;
//! use webpage2pdf::render::{self, CancelToken, RenderOptions};
//! use webpage2pdf::request::{RenderRequest, Viewport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = RenderRequest::new("https://example.com", "out.pdf", Viewport::default())?;
//! render::render(&ChromeLauncher, &request, &RenderOptions::default(), &CancelToken::new())?;
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod cli;
pub mod images;
pub mod output;
pub mod pdf;
pub mod render;
pub mod request;
pub mod session;
pub mod webpage;
