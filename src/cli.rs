use crate::pdf::{PaperSize, PdfOptions};
use crate::render::RenderOptions;
use crate::request::{self, RenderRequest, Viewport};
use crate::webpage::PageOptions;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Converts a webpage to a PDF using a headless browser
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// URL of the webpage to convert (a local HTML file also works)
    #[arg(long)]
    pub url: String,

    /// Path of the PDF to write, replaced if it exists
    #[arg(long)]
    pub output: PathBuf,

    /// Viewport width in pixels
    #[arg(long, default_value_t = request::DEFAULT_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = request::DEFAULT_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Also save a full-page PNG screenshot here
    #[arg(long, value_name = "PATH")]
    pub screenshot: Option<PathBuf>,

    /// Override the browser's user agent
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Chromium executable to launch instead of the auto-detected one
    #[arg(long = "chrome", value_name = "PATH", env = "WEBPAGE2PDF_CHROME")]
    pub chrome_path: Option<PathBuf>,

    /// Seconds to wait for the page to load
    #[arg(long, value_name = "SECS", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// CSS selector that must appear before printing
    #[arg(long, value_name = "SELECTOR")]
    pub wait_for: Option<String>,

    /// Only check images inside this CSS selector
    #[arg(long, value_name = "SELECTOR")]
    pub content_selector: Option<String>,

    /// Don't scroll through the page to trigger lazy-loaded images
    #[arg(long)]
    pub no_lazy_load: bool,

    /// Pause after each page preparation step, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub settle_ms: u64,

    /// Seconds to wait for images to finish loading
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub image_timeout: u64,

    /// Print the page even when the server answers with an HTTP error status
    #[arg(long)]
    pub allow_http_errors: bool,

    #[arg(long, value_enum, default_value_t = PaperSize::A4)]
    pub paper: PaperSize,

    #[arg(long)]
    pub landscape: bool,

    /// Don't print background colors and images
    #[arg(long)]
    pub no_background: bool,

    /// Page margin on every side, in CSS pixels
    #[arg(long, value_name = "PX", default_value_t = 20)]
    pub margin: u32,

    /// Rendering scale, between 0.1 and 2
    #[arg(long, default_value_t = 1.0, value_parser = parse_scale)]
    pub scale: f64,

    /// Launch Chromium without its sandbox (needed as root in some containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_scale(raw: &str) -> Result<f64, String> {
    let scale: f64 = raw.parse().map_err(|_| format!("`{raw}` isn't a number"))?;
    if (0.1..=2.0).contains(&scale) {
        Ok(scale)
    } else {
        Err(format!("{scale} is outside 0.1..=2"))
    }
}

impl Args {
    /// Validates the arguments clap can't check on its own and splits them
    /// into the request and the render options.
    pub fn into_job(self) -> request::Result<(RenderRequest, RenderOptions)> {

        let viewport = Viewport::new(self.width, self.height)?;
        let mut request = RenderRequest::new(&self.url, self.output, viewport)?;
        if let Some(path) = self.screenshot {
            request = request.with_screenshot(path);
        }

        let options = RenderOptions {
            user_agent: self.user_agent.filter(|ua| !ua.trim().is_empty()),
            chrome_path: self.chrome_path,
            navigation_timeout: Duration::from_secs(self.timeout),
            sandbox: !self.no_sandbox,
            page: PageOptions {
                wait_for: self.wait_for,
                content_selector: self.content_selector,
                lazy_load: !self.no_lazy_load,
                image_timeout: Duration::from_secs(self.image_timeout),
                settle: Duration::from_millis(self.settle_ms),
                allow_http_errors: self.allow_http_errors,
                ..PageOptions::default()
            },
            pdf: PdfOptions {
                paper: self.paper,
                landscape: self.landscape,
                print_background: !self.no_background,
                margin_px: self.margin,
                scale: self.scale,
            },
        };

        Ok((request, options))
    }
}
