use clap::ValueEnum;
use headless_chrome::types::PrintToPdfOptions;

/// Every PDF document starts with this header.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

const CSS_PX_PER_INCH: f64 = 96.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PaperSize {
    /// Portrait (width, height) in inches.
    pub fn inches(self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (8.27, 11.69),
            PaperSize::A3 => (11.69, 16.54),
            PaperSize::A5 => (5.83, 8.27),
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::Legal => (8.5, 14.0),
            PaperSize::Tabloid => (11.0, 17.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub paper: PaperSize,
    pub landscape: bool,
    pub print_background: bool,
    /// Applied to all four sides, in CSS pixels.
    pub margin_px: u32,
    pub scale: f64,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            landscape: false,
            print_background: true,
            margin_px: 20,
            scale: 1.0,
        }
    }
}

impl From<&PdfOptions> for PrintToPdfOptions {
    fn from(options: &PdfOptions) -> Self {
        let (paper_width, paper_height) = options.paper.inches();
        let margin = f64::from(options.margin_px) / CSS_PX_PER_INCH;

        PrintToPdfOptions {
            landscape: Some(options.landscape),
            print_background: Some(options.print_background),
            scale: Some(options.scale),
            paper_width: Some(paper_width),
            paper_height: Some(paper_height),
            margin_top: Some(margin),
            margin_bottom: Some(margin),
            margin_left: Some(margin),
            margin_right: Some(margin),
            prefer_css_page_size: Some(false),
            ..Default::default()
        }
    }
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}
