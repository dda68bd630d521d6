//! HTML → PDF re-print through headless Chrome.
//!
//! The optimizer's size win comes from here: Chrome lays the reflowed text
//! out with its own subsetted fonts and compressed streams, and everything
//! the source PDF carried besides text is gone.
//!
//! Each call launches its own browser process, prints one document and
//! drops the browser (which kills the process). The HTML is handed over as
//! a temporary `.html` file rather than a data URL so large documents do not
//! hit URL length limits.

use crate::config::PrintOptions;
use crate::error::DocShiftError;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Prints HTML documents to PDF.
pub trait HtmlRenderer: Send + Sync {
    fn render(&self, html: &str, print: &PrintOptions) -> Result<Vec<u8>, DocShiftError>;
}

/// [`HtmlRenderer`] driving a local Chrome/Chromium over DevTools.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    chrome_path: Option<PathBuf>,
    timeout: Duration,
    sandbox: bool,
}

impl ChromeRenderer {
    pub fn new(chrome_path: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            chrome_path,
            timeout,
            sandbox: true,
        }
    }

    /// Toggle Chrome's sandbox. It refuses to start as root in most
    /// containers unless disabled.
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    fn launch(&self) -> Result<Browser, DocShiftError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.sandbox)
            .path(self.chrome_path.clone())
            .idle_browser_timeout(self.timeout)
            .build()
            .map_err(|e| DocShiftError::BrowserLaunchFailed {
                detail: e.to_string(),
            })?;
        Browser::new(options).map_err(|e| DocShiftError::BrowserLaunchFailed {
            detail: e.to_string(),
        })
    }

    fn classify(&self, detail: String) -> DocShiftError {
        classify_render_error(detail, self.timeout)
    }
}

impl HtmlRenderer for ChromeRenderer {
    fn render(&self, html: &str, print: &PrintOptions) -> Result<Vec<u8>, DocShiftError> {
        let mut page = tempfile::Builder::new()
            .prefix("docshift-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| DocShiftError::Internal(format!("Failed to create temp HTML: {e}")))?;
        page.write_all(html.as_bytes())
            .and_then(|_| page.flush())
            .map_err(|e| DocShiftError::Internal(format!("Failed to write temp HTML: {e}")))?;
        let url = format!("file://{}", page.path().display());

        let browser = self.launch()?;
        let tab = browser
            .new_tab()
            .map_err(|e| self.classify(e.to_string()))?;
        tab.set_default_timeout(self.timeout);
        tab.navigate_to(&url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| self.classify(e.to_string()))?;

        let pdf = tab
            .print_to_pdf(Some(print_options(print)))
            .map_err(|e| self.classify(e.to_string()))?;
        debug!("Chrome printed {} bytes", pdf.len());
        Ok(pdf)
    }
}

fn classify_render_error(detail: String, timeout: Duration) -> DocShiftError {
    let lower = detail.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        DocShiftError::RenderTimeout {
            secs: timeout.as_secs(),
        }
    } else {
        DocShiftError::RenderFailed { detail }
    }
}

/// DevTools `Page.printToPDF` parameters for `print`.
fn print_options(print: &PrintOptions) -> PrintToPdfOptions {
    PrintToPdfOptions {
        landscape: Some(false),
        display_header_footer: Some(print.display_header_footer),
        print_background: Some(print.print_background),
        scale: Some(print.scale),
        paper_width: Some(print.paper_width_in),
        paper_height: Some(print.paper_height_in),
        margin_top: Some(print.margin_in),
        margin_bottom: Some(print.margin_in),
        margin_left: Some(print.margin_in),
        margin_right: Some(print.margin_in),
        ..Default::default()
    }
}
