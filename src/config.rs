//! Configuration types for docshift conversions.
//!
//! All behaviour is controlled through [`ConverterConfig`], built via its
//! [`ConverterConfigBuilder`]. The defaults reproduce the geometry, ceilings
//! and heuristics of the original web utility exactly; every knob exists so
//! tests and embedders can tighten or relax one value without forking the
//! pipeline.
//!
//! There is no global mutable configuration: callers pass a config by
//! reference into each conversion.

use crate::error::{DocShiftError, Locale};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One mebibyte.
pub const MIB: usize = 1024 * 1024;

/// Default ceiling for markdown input: 5 MiB of text.
pub const DEFAULT_MAX_MARKDOWN_BYTES: usize = 5 * MIB;

/// Default ceiling for decoded PDF input: 8 MiB.
pub const DEFAULT_MAX_PDF_BYTES: usize = 8 * MIB;

/// Configuration for a docshift conversion.
///
/// Built via [`ConverterConfig::builder()`] or using
/// [`ConverterConfig::default()`].
///
/// # Example
/// ```rust
/// use docshift::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .max_pdf_bytes(4 * 1024 * 1024)
///     .min_reduction_percent(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Page geometry and font sizing for Markdown → PDF.
    pub page: PageLayout,

    /// Column at which the HTML → text step wraps paragraphs. Default: 80.
    ///
    /// The layout engine wraps again against the real page width; this
    /// first pass only keeps very long source paragraphs readable.
    pub text_wrap_column: usize,

    /// Metadata written into generated and optimized PDFs.
    pub document_info: DocumentInfo,

    /// Maximum markdown input size in bytes. Default: 5 MiB.
    pub max_markdown_bytes: usize,

    /// Maximum decoded PDF input size in bytes. Default: 8 MiB.
    pub max_pdf_bytes: usize,

    /// Heuristics deciding when optimization is not worth it.
    pub thresholds: OptimizeThresholds,

    /// Print parameters handed to the headless browser.
    pub print: PrintOptions,

    /// Path to the Chrome/Chromium executable. If None, the browser crate
    /// searches the usual install locations.
    pub chrome_path: Option<PathBuf>,

    /// Run Chrome inside its sandbox. Default: true. Chrome will not start
    /// sandboxed as root, which is the norm in containers.
    pub chrome_sandbox: bool,

    /// Timeout for browser launch, navigation and printing, in seconds. Default: 30.
    pub render_timeout_secs: u64,

    /// Path to the pdfium shared library, or the directory containing it.
    /// If None, the system library search path is used.
    pub pdfium_library_path: Option<PathBuf>,

    /// Language of user-facing error messages. Default: English.
    pub locale: Locale,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            page: PageLayout::default(),
            text_wrap_column: 80,
            document_info: DocumentInfo::default(),
            max_markdown_bytes: DEFAULT_MAX_MARKDOWN_BYTES,
            max_pdf_bytes: DEFAULT_MAX_PDF_BYTES,
            thresholds: OptimizeThresholds::default(),
            print: PrintOptions::default(),
            chrome_path: None,
            chrome_sandbox: true,
            render_timeout_secs: 30,
            pdfium_library_path: None,
            locale: Locale::default(),
        }
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn page(mut self, page: PageLayout) -> Self {
        self.config.page = page;
        self
    }

    pub fn text_wrap_column(mut self, column: usize) -> Self {
        self.config.text_wrap_column = column;
        self
    }

    pub fn document_info(mut self, info: DocumentInfo) -> Self {
        self.config.document_info = info;
        self
    }

    pub fn max_markdown_bytes(mut self, bytes: usize) -> Self {
        self.config.max_markdown_bytes = bytes;
        self
    }

    pub fn max_pdf_bytes(mut self, bytes: usize) -> Self {
        self.config.max_pdf_bytes = bytes;
        self
    }

    pub fn thresholds(mut self, thresholds: OptimizeThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    pub fn min_reduction_percent(mut self, percent: i64) -> Self {
        self.config.thresholds.min_reduction_percent = percent;
        self
    }

    pub fn print(mut self, print: PrintOptions) -> Self {
        self.config.print = print;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn chrome_sandbox(mut self, sandbox: bool) -> Self {
        self.config.chrome_sandbox = sandbox;
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs.max(1);
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.config.locale = locale;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, DocShiftError> {
        let c = &self.config;
        c.page.validate()?;
        c.print.validate()?;
        if c.text_wrap_column < 20 {
            return Err(DocShiftError::InvalidConfig(format!(
                "Text wrap column must be ≥ 20, got {}",
                c.text_wrap_column
            )));
        }
        if c.max_markdown_bytes == 0 || c.max_pdf_bytes == 0 {
            return Err(DocShiftError::InvalidConfig(
                "Input size ceilings must be > 0".into(),
            ));
        }
        if !(0..=100).contains(&c.thresholds.min_reduction_percent) {
            return Err(DocShiftError::InvalidConfig(format!(
                "Minimum reduction must be 0–100%, got {}",
                c.thresholds.min_reduction_percent
            )));
        }
        Ok(self.config)
    }
}

// ── Sub-configs ──────────────────────────────────────────────────────────

/// Page geometry for the Markdown → PDF layout engine, in PDF points.
///
/// Defaults to A4 portrait with a 50pt margin and an 11pt base font at
/// 1.5× line height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub line_height_factor: f32,
    /// Extra points added to the base size for heading lines.
    pub heading_size_delta: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            margin: 50.0,
            font_size: 11.0,
            line_height_factor: 1.5,
            heading_size_delta: 2.0,
        }
    }
}

impl PageLayout {
    /// Vertical advance between consecutive lines.
    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_height_factor
    }

    /// Horizontal budget for word wrap: page width minus both margins.
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Baseline of the first line on a fresh page.
    pub fn top(&self) -> f32 {
        self.height - self.margin
    }

    fn validate(&self) -> Result<(), DocShiftError> {
        if self.font_size <= 0.0 || self.line_height_factor <= 0.0 {
            return Err(DocShiftError::InvalidConfig(
                "Font size and line height must be positive".into(),
            ));
        }
        if self.content_width() <= 0.0 {
            return Err(DocShiftError::InvalidConfig(format!(
                "Margins ({}pt) leave no room on a {}pt-wide page",
                self.margin, self.width
            )));
        }
        // A fresh page must accept at least one line or layout never advances.
        if self.top() < self.margin + self.line_height() {
            return Err(DocShiftError::InvalidConfig(format!(
                "Page height {}pt cannot fit a single {}pt line",
                self.height,
                self.line_height()
            )));
        }
        Ok(())
    }
}

/// Metadata strings stamped on generated PDFs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: String,
    pub creator: String,
    pub producer: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "Documento convertido desde Markdown".to_string(),
            creator: "MD-to Converter".to_string(),
            producer: "md-to-converter".to_string(),
        }
    }
}

/// Heuristic thresholds for the optimizer's early exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeThresholds {
    /// A PDF under this many bytes per page counts as lean. Default: 30 000.
    pub trivial_bytes_per_page: usize,
    /// A PDF under this many text chars per page counts as sparse. Default: 1 000.
    pub trivial_chars_per_page: usize,
    /// Results shrinking less than this are refused. Default: 5.
    pub min_reduction_percent: i64,
}

impl Default for OptimizeThresholds {
    fn default() -> Self {
        Self {
            trivial_bytes_per_page: 30_000,
            trivial_chars_per_page: 1_000,
            min_reduction_percent: 5,
        }
    }
}

/// Print parameters for the headless-browser render.
///
/// Paper and margins are in inches because that is what the DevTools
/// `Page.printToPDF` command takes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintOptions {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    pub margin_in: f64,
    pub scale: f64,
    pub print_background: bool,
    pub display_header_footer: bool,
}

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            // A4
            paper_width_in: 210.0 / MM_PER_INCH,
            paper_height_in: 297.0 / MM_PER_INCH,
            margin_in: 10.0 / MM_PER_INCH,
            scale: 0.9,
            print_background: false,
            display_header_footer: false,
        }
    }
}

impl PrintOptions {
    fn validate(&self) -> Result<(), DocShiftError> {
        // Chrome rejects scales outside 0.1–2.0.
        if !(0.1..=2.0).contains(&self.scale) {
            return Err(DocShiftError::InvalidConfig(format!(
                "Print scale must be 0.1–2.0, got {}",
                self.scale
            )));
        }
        if self.paper_width_in <= 2.0 * self.margin_in
            || self.paper_height_in <= 2.0 * self.margin_in
        {
            return Err(DocShiftError::InvalidConfig(
                "Print margins leave no printable area".into(),
            ));
        }
        Ok(())
    }
}
