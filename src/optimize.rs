//! PDF size optimization by text extraction and re-rendering.
//!
//! ## Pipeline
//!
//! ```text
//! SIZE_CHECK ─▶ EXTRACT_TEXT ─▶ TRIVIAL_CHECK ─▶ GENERATE_HTML ─▶ RENDER_PDF
//!     │              │                │                               │
//!  too large     parse error    already lean ◀── gain check ──────────┤
//!                                                                     ▼
//!                                              METADATA_STRIP ─▶ gain check ─▶ done
//! ```
//!
//! The pipeline is strictly sequential. pdfium, Chrome and the lopdf re-save
//! all block, so each runs on the blocking pool through `spawn_blocking`. Every
//! collaborator sits behind a trait so tests can script the whole flow
//! without native libraries.
//!
//! Output is lossy: only text survives. Images, forms, links and layout are
//! discarded and text is reflowed into paragraphs and headings.

use crate::config::{ConverterConfig, OptimizeThresholds};
use crate::convert::check_size;
use crate::error::DocShiftError;
use crate::output::{reduction_percent, OptimizationResult, OptimizedPdf};
use crate::pipeline::browser::{ChromeRenderer, HtmlRenderer};
use crate::pipeline::extract::{ExtractedContent, PdfiumExtractor, TextExtractor};
use crate::pipeline::html::generate_html;
use crate::pipeline::metadata::{LopdfMetadataRewriter, MetadataRewriter};
use crate::progress::{OptimizeStage, ProgressCallback};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Prefix browsers put in front of base64 file payloads.
const DATA_URL_PREFIX: &str = "data:application/pdf;base64,";

/// Runs the optimization pipeline with a fixed set of collaborators.
///
/// # Example
/// ```rust,no_run
/// use docshift::{ConverterConfig, PdfOptimizer};
///
/// # #[tokio::main]
/// # async fn main() {
/// let optimizer = PdfOptimizer::new(ConverterConfig::default());
/// let bytes = std::fs::read("report.pdf").unwrap();
/// match optimizer.optimize_bytes(bytes).await {
///     Ok(out) => println!("saved {}%", out.reduction_percent),
///     Err(e) => eprintln!("{e}"),
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct PdfOptimizer {
    config: ConverterConfig,
    extractor: Arc<dyn TextExtractor>,
    renderer: Arc<dyn HtmlRenderer>,
    rewriter: Arc<dyn MetadataRewriter>,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for PdfOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfOptimizer")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl PdfOptimizer {
    /// Optimizer using pdfium, headless Chrome and lopdf as configured.
    pub fn new(config: ConverterConfig) -> Self {
        let extractor = PdfiumExtractor::new(config.pdfium_library_path.clone());
        let renderer = ChromeRenderer::new(
            config.chrome_path.clone(),
            Duration::from_secs(config.render_timeout_secs),
        )
        .with_sandbox(config.chrome_sandbox);
        let rewriter = LopdfMetadataRewriter::new(config.document_info.clone());
        Self::with_collaborators(
            config,
            Arc::new(extractor),
            Arc::new(renderer),
            Arc::new(rewriter),
        )
    }

    /// Optimizer with caller-supplied collaborators.
    pub fn with_collaborators(
        config: ConverterConfig,
        extractor: Arc<dyn TextExtractor>,
        renderer: Arc<dyn HtmlRenderer>,
        rewriter: Arc<dyn MetadataRewriter>,
    ) -> Self {
        Self {
            config,
            extractor,
            renderer,
            rewriter,
            progress: None,
        }
    }

    /// Attach a progress observer.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Optimize a PDF given as raw bytes.
    ///
    /// # Errors
    /// * [`DocShiftError::InputTooLarge`] above `max_pdf_bytes`
    /// * [`DocShiftError::CorruptPdf`] / [`DocShiftError::EncryptedPdf`] when
    ///   the input cannot be parsed
    /// * [`DocShiftError::MinimalGain`] when the input already looks lean or
    ///   the result would not be at least `min_reduction_percent` smaller
    /// * render errors from the browser
    pub async fn optimize_bytes(&self, pdf: Vec<u8>) -> Result<OptimizedPdf, DocShiftError> {
        let original_size = pdf.len();
        info!("Optimizing PDF: {} bytes", original_size);

        // ── SIZE_CHECK ───────────────────────────────────────────────────
        self.stage(OptimizeStage::SizeCheck, async {
            check_size(original_size, self.config.max_pdf_bytes)
        })
        .await?;

        // ── EXTRACT_TEXT ─────────────────────────────────────────────────
        let content = self
            .stage(OptimizeStage::ExtractText, {
                let extractor = Arc::clone(&self.extractor);
                run_blocking("Text extraction", move || extractor.extract(&pdf))
            })
            .await?;
        info!(
            "Extracted {} pages, {} chars",
            content.page_count,
            content.text.chars().count()
        );

        // ── TRIVIAL_CHECK ────────────────────────────────────────────────
        self.stage(OptimizeStage::TrivialCheck, async {
            if is_trivial(original_size, &content, &self.config.thresholds) {
                warn!(
                    "PDF looks already optimized ({} bytes over {} pages); skipping render",
                    original_size, content.page_count
                );
                return Err(DocShiftError::MinimalGain {
                    reduction_percent: None,
                    size: None,
                });
            }
            Ok(())
        })
        .await?;

        // ── GENERATE_HTML ────────────────────────────────────────────────
        let html = self
            .stage(OptimizeStage::GenerateHtml, async {
                Ok(generate_html(&content.text))
            })
            .await?;
        debug!("Generated {} bytes of HTML", html.len());

        // ── RENDER_PDF ───────────────────────────────────────────────────
        let rendered = self
            .stage(OptimizeStage::RenderPdf, {
                let renderer = Arc::clone(&self.renderer);
                let print = self.config.print;
                run_blocking("Render", move || renderer.render(&html, &print))
            })
            .await?;
        info!("Rendered {} bytes", rendered.len());
        self.check_gain(OptimizeStage::RenderPdf, original_size, rendered.len())?;

        // ── METADATA_STRIP ───────────────────────────────────────────────
        let stripped = self
            .stage(OptimizeStage::MetadataStrip, {
                let rewriter = Arc::clone(&self.rewriter);
                run_blocking("Metadata rewrite", move || rewriter.rewrite(&rendered))
            })
            .await?;
        let percent =
            self.check_gain(OptimizeStage::MetadataStrip, original_size, stripped.len())?;

        info!(
            "Optimization complete: {} → {} bytes ({}% smaller)",
            original_size,
            stripped.len(),
            percent
        );
        if let Some(cb) = &self.progress {
            cb.on_optimize_complete(original_size, stripped.len());
        }

        Ok(OptimizedPdf {
            original_size,
            size: stripped.len(),
            reduction_percent: percent,
            bytes: stripped,
        })
    }

    /// Optimize a base64-encoded PDF, reporting every outcome in the result.
    ///
    /// A `data:application/pdf;base64,` prefix and surrounding whitespace
    /// are accepted. Never fails: errors are logged and returned as a
    /// localized message plus an [`crate::ErrorKind`].
    pub async fn optimize_base64(&self, encoded: &str) -> OptimizationResult {
        let locale = self.config.locale;
        let decoded = match decode_pdf(encoded, self.config.max_pdf_bytes) {
            Ok(bytes) => bytes,
            Err((size, e)) => {
                error!("Rejected optimizer input: {}", e);
                if let Some(cb) = &self.progress {
                    cb.on_stage_error(OptimizeStage::SizeCheck, &e.to_string());
                }
                return OptimizationResult::failure(size, &e, locale);
            }
        };

        let original_size = decoded.len();
        match self.optimize_bytes(decoded).await {
            Ok(optimized) => {
                let data = STANDARD.encode(&optimized.bytes);
                OptimizationResult::success(&optimized, data)
            }
            Err(e) => {
                if matches!(e, DocShiftError::MinimalGain { .. }) {
                    warn!("Optimization refused: {}", e);
                } else {
                    error!("Error optimizing PDF: {}", e);
                }
                OptimizationResult::failure(original_size, &e, locale)
            }
        }
    }

    /// Run one stage, reporting start, completion or error to the observer.
    async fn stage<T, F>(&self, stage: OptimizeStage, work: F) -> Result<T, DocShiftError>
    where
        F: std::future::Future<Output = Result<T, DocShiftError>>,
    {
        if let Some(cb) = &self.progress {
            cb.on_stage_start(stage);
        }
        let result = work.await;
        if let Some(cb) = &self.progress {
            match &result {
                Ok(_) => cb.on_stage_complete(stage),
                Err(e) => cb.on_stage_error(stage, &e.to_string()),
            }
        }
        result
    }

    /// Refuse results that shrink less than the configured minimum.
    fn check_gain(
        &self,
        stage: OptimizeStage,
        original_size: usize,
        size: usize,
    ) -> Result<i64, DocShiftError> {
        let percent = reduction_percent(original_size, size);
        debug!("{}: {} → {} bytes ({}%)", stage, original_size, size, percent);
        if percent < self.config.thresholds.min_reduction_percent {
            let err = DocShiftError::MinimalGain {
                reduction_percent: Some(percent),
                size: Some(size),
            };
            if let Some(cb) = &self.progress {
                cb.on_stage_error(stage, &err.to_string());
            }
            return Err(err);
        }
        Ok(percent)
    }
}

/// A PDF is trivial when it is both small per page and sparse in text.
fn is_trivial(original_size: usize, content: &ExtractedContent, t: &OptimizeThresholds) -> bool {
    let pages = content.page_count;
    pages > 0
        && original_size / pages < t.trivial_bytes_per_page
        && content.text.chars().count() < t.trivial_chars_per_page * pages
}

/// Decode base64 input, rejecting oversized payloads before decoding.
///
/// On error also returns the best known input size for reporting.
fn decode_pdf(encoded: &str, limit: usize) -> Result<Vec<u8>, (usize, DocShiftError)> {
    let trimmed = encoded.trim();
    let payload = trimmed.strip_prefix(DATA_URL_PREFIX).unwrap_or(trimmed);
    // Line-wrapped (MIME, `base64` CLI) payloads are accepted.
    let payload: Cow<'_, str> = if payload.contains(|c: char| c.is_ascii_whitespace()) {
        Cow::Owned(
            payload
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect(),
        )
    } else {
        Cow::Borrowed(payload)
    };

    // Four base64 chars carry three bytes, less at most two of padding.
    let lower_bound = (payload.len() / 4 * 3).saturating_sub(2);
    if lower_bound > limit {
        return Err((
            lower_bound,
            DocShiftError::InputTooLarge {
                size: lower_bound,
                limit,
            },
        ));
    }

    STANDARD.decode(payload.as_bytes()).map_err(|e| {
        (
            0,
            DocShiftError::InvalidBase64 {
                detail: e.to_string(),
            },
        )
    })
}

/// Run a blocking collaborator call on the blocking pool.
async fn run_blocking<T, F>(what: &str, f: F) -> Result<T, DocShiftError>
where
    F: FnOnce() -> Result<T, DocShiftError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DocShiftError::Internal(format!("{what} task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(page_count: usize, chars: usize) -> ExtractedContent {
        ExtractedContent {
            page_count,
            text: "x".repeat(chars),
        }
    }

    #[test]
    fn trivial_needs_both_small_and_sparse() {
        let t = OptimizeThresholds::default();
        assert!(is_trivial(20_000, &content(1, 500), &t));
        // Dense text.
        assert!(!is_trivial(20_000, &content(1, 1_000), &t));
        // Heavy pages.
        assert!(!is_trivial(30_000, &content(1, 10), &t));
        // Thresholds scale with page count.
        assert!(is_trivial(59_999, &content(2, 1_999), &t));
    }

    #[test]
    fn zero_pages_is_never_trivial() {
        assert!(!is_trivial(10, &content(0, 0), &OptimizeThresholds::default()));
    }

    #[test]
    fn decodes_plain_and_data_url_input() {
        assert_eq!(decode_pdf("JVBERi0=", 100).unwrap(), b"%PDF-");
        assert_eq!(
            decode_pdf("  data:application/pdf;base64,JVBERi0=\n", 100).unwrap(),
            b"%PDF-"
        );
    }

    #[test]
    fn line_wrapped_base64_is_accepted() {
        assert_eq!(decode_pdf("JVBERi0x\nLjQK", 100).unwrap(), b"%PDF-1.4\n");
        assert_eq!(
            decode_pdf("JVBE\r\nRi0x\tLjQK\n", 100).unwrap(),
            b"%PDF-1.4\n"
        );
    }

    #[test]
    fn malformed_base64_is_invalid() {
        let (size, err) = decode_pdf("not base64!!", 100).unwrap_err();
        assert_eq!(size, 0);
        assert!(matches!(err, DocShiftError::InvalidBase64 { .. }));
    }

    #[test]
    fn oversized_payload_is_rejected_before_decoding() {
        // Not valid base64 either; the size check must win.
        let huge = "!".repeat(200);
        let (_, err) = decode_pdf(&huge, 100).unwrap_err();
        assert!(matches!(err, DocShiftError::InputTooLarge { limit: 100, .. }));
    }
}
