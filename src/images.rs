use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// Load state of one `<img>` as seen by the page.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageStatus {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub data_src: Option<String>,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub natural_width: u32,
    #[serde(default)]
    pub natural_height: u32,
    #[serde(default)]
    pub offset_top: f64,
}

impl ImageStatus {
    /// Lazy-loading placeholders are usually 1x1 pixels.
    pub fn is_loaded(&self) -> bool {
        self.complete && self.natural_width > 1
    }
}

pub struct ImageReport(pub Vec<ImageStatus>);

impl ImageReport {

    pub fn from_value(value: Option<Value>) -> serde_json::Result<Self> {
        match value {
            Some(value) => Ok(Self(serde_json::from_value(value)?)),
            None => Ok(Self(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.0.iter().filter(|image| !image.is_loaded()).count()
    }

    pub fn log_details(&self) {
        for (idx, image) in self.0.iter().enumerate() {
            debug!(
                "Image {}: complete={} size={}x{} top={}px src={} data-src={}",
                idx + 1,
                image.complete,
                image.natural_width,
                image.natural_height,
                image.offset_top,
                image.src,
                image.data_src.as_deref().unwrap_or("None"),
            );
        }
    }
}

/// JavaScript returning an [`ImageStatus`] array for `selector`.
pub fn status_script(selector: &str) -> String {
    let selector = serde_json::Value::from(selector);
    format!(
        r#"
        Array.from(document.querySelectorAll({selector})).map(img => ({{
            src: img.src || '',
            dataSrc: img.dataset.src || null,
            complete: img.complete,
            naturalWidth: img.naturalWidth,
            naturalHeight: img.naturalHeight,
            offsetTop: img.offsetTop
        }}))
        "#
    )
}

/// JavaScript that swaps `data-src` into `src` and resolves once every image
/// has loaded or failed, or with `"timeout"` after `timeout_ms`.
pub fn load_script(selector: &str, timeout_ms: u128) -> String {
    let selector = serde_json::Value::from(selector);
    format!(
        r#"
        (() => {{
            const loadImage = (img) => new Promise((resolve) => {{
                if (img.complete && img.naturalWidth > 1) {{
                    resolve();
                    return;
                }}
                const originalSrc = img.src;
                if (img.dataset.src) {{
                    img.src = img.dataset.src;
                }}
                img.addEventListener('load', () => resolve());
                img.addEventListener('error', () => {{
                    if (originalSrc && originalSrc !== img.src) {{
                        img.src = originalSrc;
                    }}
                    resolve();
                }});
            }});
            const images = Array.from(document.querySelectorAll({selector}));
            const all = Promise.all(images.map(loadImage)).then(() => 'loaded');
            const timer = new Promise((resolve) => setTimeout(() => resolve('timeout'), {timeout_ms}));
            return Promise.race([all, timer]);
        }})()
        "#
    )
}

/// JavaScript that scrolls every matching image into view, then back to the top.
pub fn reveal_script(selector: &str) -> String {
    let selector = serde_json::Value::from(selector);
    format!(
        r#"
        (() => {{
            document.querySelectorAll({selector}).forEach(img => img.scrollIntoView());
            window.scrollTo(0, 0);
            return true;
        }})()
        "#
    )
}
