//! Optimizer pipeline tests with scripted collaborators.
//!
//! No pdfium or Chrome needed: extraction, rendering and the metadata
//! rewrite are replaced by fakes that return canned sizes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docshift::pipeline::browser::HtmlRenderer;
use docshift::pipeline::extract::{ExtractedContent, TextExtractor};
use docshift::pipeline::metadata::MetadataRewriter;
use docshift::{
    ConverterConfig, DocShiftError, ErrorKind, Locale, OptimizationMethod, OptimizationResult,
    OptimizeProgressCallback, OptimizeStage, PdfOptimizer, PrintOptions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Fakes ────────────────────────────────────────────────────────────────────

/// Returns a fixed page count and text length, or a fixed error.
struct FakeExtractor {
    pages: usize,
    chars: usize,
    fail: Option<fn() -> DocShiftError>,
    calls: AtomicUsize,
}

impl FakeExtractor {
    fn pages(pages: usize, chars: usize) -> Arc<Self> {
        Arc::new(Self {
            pages,
            chars,
            fail: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(fail: fn() -> DocShiftError) -> Arc<Self> {
        Arc::new(Self {
            pages: 0,
            chars: 0,
            fail: Some(fail),
            calls: AtomicUsize::new(0),
        })
    }
}

impl TextExtractor for FakeExtractor {
    fn extract(&self, _pdf: &[u8]) -> Result<ExtractedContent, DocShiftError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail {
            Some(fail) => Err(fail()),
            None => Ok(content(self.pages, self.chars)),
        }
    }
}

fn content(page_count: usize, chars: usize) -> ExtractedContent {
    let mut text = String::from("QUARTERLY REPORT\n");
    text.push_str(&"word ".repeat(chars / 5));
    text.truncate(chars);
    ExtractedContent { page_count, text }
}

/// Renders a PDF of a fixed size and records the HTML it was given.
struct FakeRenderer {
    output_size: usize,
    fail_with_timeout: bool,
    calls: AtomicUsize,
    last_html: Mutex<Option<String>>,
}

impl FakeRenderer {
    fn sized(output_size: usize) -> Arc<Self> {
        Arc::new(Self {
            output_size,
            fail_with_timeout: false,
            calls: AtomicUsize::new(0),
            last_html: Mutex::new(None),
        })
    }

    fn timing_out() -> Arc<Self> {
        Arc::new(Self {
            output_size: 0,
            fail_with_timeout: true,
            calls: AtomicUsize::new(0),
            last_html: Mutex::new(None),
        })
    }
}

impl HtmlRenderer for FakeRenderer {
    fn render(&self, html: &str, print: &PrintOptions) -> Result<Vec<u8>, DocShiftError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().unwrap() = Some(html.to_string());
        assert_eq!(*print, PrintOptions::default());
        if self.fail_with_timeout {
            return Err(DocShiftError::RenderTimeout { secs: 30 });
        }
        Ok(vec![b'r'; self.output_size])
    }
}

/// Rewrites to a fixed size.
struct FakeRewriter {
    output_size: usize,
    calls: AtomicUsize,
}

impl FakeRewriter {
    fn sized(output_size: usize) -> Arc<Self> {
        Arc::new(Self {
            output_size,
            calls: AtomicUsize::new(0),
        })
    }
}

impl MetadataRewriter for FakeRewriter {
    fn rewrite(&self, _pdf: &[u8]) -> Result<Vec<u8>, DocShiftError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![b'm'; self.output_size])
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
    completed: Mutex<Option<(usize, usize)>>,
}

impl OptimizeProgressCallback for Recorder {
    fn on_stage_start(&self, stage: OptimizeStage) {
        self.events.lock().unwrap().push(format!("start {stage:?}"));
    }

    fn on_stage_complete(&self, stage: OptimizeStage) {
        self.events.lock().unwrap().push(format!("done {stage:?}"));
    }

    fn on_stage_error(&self, stage: OptimizeStage, _error: &str) {
        self.events.lock().unwrap().push(format!("error {stage:?}"));
    }

    fn on_optimize_complete(&self, original_size: usize, final_size: usize) {
        *self.completed.lock().unwrap() = Some((original_size, final_size));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn optimizer(
    extractor: Arc<FakeExtractor>,
    renderer: Arc<FakeRenderer>,
    rewriter: Arc<FakeRewriter>,
) -> PdfOptimizer {
    PdfOptimizer::with_collaborators(ConverterConfig::default(), extractor, renderer, rewriter)
}

fn encoded_pdf(size: usize) -> String {
    STANDARD.encode(vec![b'p'; size])
}

fn assert_data_xor_error(result: &OptimizationResult) {
    assert_ne!(
        result.data.is_some(),
        result.error.is_some(),
        "exactly one of data / error must be set: {result:?}"
    );
    assert_eq!(result.error.is_some(), result.error_kind.is_some());
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_heavy_pdf_is_rerendered() {
    let extractor = FakeExtractor::pages(1, 5_000);
    let renderer = FakeRenderer::sized(40_000);
    let rewriter = FakeRewriter::sized(39_000);
    let opt = optimizer(extractor.clone(), renderer.clone(), rewriter.clone());

    let result = opt.optimize_base64(&encoded_pdf(100_000)).await;

    assert_data_xor_error(&result);
    assert!(result.is_success());
    assert_eq!(result.original_size, 100_000);
    assert_eq!(result.size, Some(39_000));
    assert_eq!(result.reduction_percent, Some(61));
    assert_eq!(result.method, OptimizationMethod::Rerender);
    let data = STANDARD.decode(result.data.unwrap()).unwrap();
    assert_eq!(data.len(), 39_000);
    assert!(data.iter().all(|&b| b == b'm'));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(rewriter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn renderer_receives_escaped_reflowed_html() {
    let renderer = FakeRenderer::sized(10_000);
    let opt = optimizer(
        FakeExtractor::pages(1, 5_000),
        renderer.clone(),
        FakeRewriter::sized(10_000),
    );

    opt.optimize_bytes(vec![b'p'; 100_000]).await.unwrap();

    let html = renderer.last_html.lock().unwrap().clone().unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h2>QUARTERLY REPORT</h2>"));
    assert!(html.contains("<p>word word"));
}

#[tokio::test]
async fn lean_pdf_exits_before_rendering() {
    let renderer = FakeRenderer::sized(1);
    let rewriter = FakeRewriter::sized(1);
    let opt = optimizer(FakeExtractor::pages(1, 500), renderer.clone(), rewriter.clone());

    let result = opt.optimize_base64(&encoded_pdf(20_000)).await;

    assert_data_xor_error(&result);
    assert_eq!(result.error_kind, Some(ErrorKind::MinimalGain));
    assert_eq!(result.original_size, 20_000);
    assert_eq!(result.size, None);
    assert_eq!(result.reduction_percent, None);
    assert_eq!(result.method, OptimizationMethod::Skipped);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(rewriter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_page_pdf_is_not_treated_as_lean() {
    let renderer = FakeRenderer::sized(1_000);
    let opt = optimizer(
        FakeExtractor::pages(0, 0),
        renderer.clone(),
        FakeRewriter::sized(1_000),
    );

    let out = opt.optimize_bytes(vec![b'p'; 20_000]).await.unwrap();
    assert_eq!(out.size, 1_000);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn small_gain_after_render_is_refused() {
    let rewriter = FakeRewriter::sized(1);
    let opt = optimizer(
        FakeExtractor::pages(1, 5_000),
        FakeRenderer::sized(96_000),
        rewriter.clone(),
    );

    let result = opt.optimize_base64(&encoded_pdf(100_000)).await;

    assert_data_xor_error(&result);
    assert_eq!(result.error_kind, Some(ErrorKind::MinimalGain));
    assert_eq!(result.size, Some(96_000));
    assert_eq!(result.reduction_percent, Some(4));
    assert_eq!(result.method, OptimizationMethod::Rerender);
    assert!(result.data.is_none());
    assert_eq!(rewriter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn exactly_five_percent_is_accepted() {
    let opt = optimizer(
        FakeExtractor::pages(1, 5_000),
        FakeRenderer::sized(95_000),
        FakeRewriter::sized(95_000),
    );

    let out = opt.optimize_bytes(vec![b'p'; 100_000]).await.unwrap();
    assert_eq!(out.reduction_percent, 5);
}

#[tokio::test]
async fn gain_is_rechecked_after_metadata_rewrite() {
    let opt = optimizer(
        FakeExtractor::pages(1, 5_000),
        FakeRenderer::sized(90_000),
        FakeRewriter::sized(97_000),
    );

    let err = opt.optimize_bytes(vec![b'p'; 100_000]).await.unwrap_err();
    assert!(matches!(
        err,
        DocShiftError::MinimalGain {
            reduction_percent: Some(3),
            size: Some(97_000)
        }
    ));
}

#[tokio::test]
async fn oversized_pdf_is_rejected_before_extraction() {
    let extractor = FakeExtractor::pages(1, 5_000);
    let opt = optimizer(
        extractor.clone(),
        FakeRenderer::sized(1),
        FakeRewriter::sized(1),
    );
    let size = 8 * 1024 * 1024 + 1;

    let result = opt.optimize_base64(&encoded_pdf(size)).await;

    assert_data_xor_error(&result);
    assert_eq!(result.error_kind, Some(ErrorKind::InputTooLarge));
    assert_eq!(result.original_size, size);
    assert_eq!(result.error.as_deref(), Some("The file is too large."));
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pdf_at_the_ceiling_is_accepted() {
    let extractor = FakeExtractor::pages(1, 5_000);
    let opt = optimizer(
        extractor.clone(),
        FakeRenderer::sized(1_000),
        FakeRewriter::sized(1_000),
    );

    let result = opt.optimize_base64(&encoded_pdf(8 * 1024 * 1024)).await;
    assert!(result.is_success());
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn corrupt_pdf_is_a_parse_error() {
    let extractor = FakeExtractor::failing(|| DocShiftError::CorruptPdf {
        detail: "no xref".into(),
    });
    let config = ConverterConfig::builder().locale(Locale::Es).build().unwrap();
    let opt = PdfOptimizer::with_collaborators(
        config,
        extractor,
        FakeRenderer::sized(1),
        FakeRewriter::sized(1),
    );

    let result = opt.optimize_base64(&encoded_pdf(50_000)).await;

    assert_data_xor_error(&result);
    assert_eq!(result.error_kind, Some(ErrorKind::ParseError));
    assert_eq!(result.original_size, 50_000);
    assert_eq!(
        result.error.as_deref(),
        Some("El archivo está corrupto, no es válido o está protegido con contraseña.")
    );
}

#[tokio::test]
async fn encrypted_pdf_is_a_parse_error() {
    let opt = optimizer(
        FakeExtractor::failing(|| DocShiftError::EncryptedPdf),
        FakeRenderer::sized(1),
        FakeRewriter::sized(1),
    );
    let result = opt.optimize_base64(&encoded_pdf(50_000)).await;
    assert_eq!(result.error_kind, Some(ErrorKind::ParseError));
}

#[tokio::test]
async fn invalid_base64_is_a_parse_error() {
    let opt = optimizer(
        FakeExtractor::pages(1, 5_000),
        FakeRenderer::sized(1),
        FakeRewriter::sized(1),
    );
    let result = opt.optimize_base64("%%% not base64 %%%").await;
    assert_data_xor_error(&result);
    assert_eq!(result.error_kind, Some(ErrorKind::ParseError));
    assert_eq!(result.original_size, 0);
}

#[tokio::test]
async fn line_wrapped_base64_reaches_extraction() {
    let extractor = FakeExtractor::pages(1, 5_000);
    let opt = optimizer(
        extractor.clone(),
        FakeRenderer::sized(40_000),
        FakeRewriter::sized(40_000),
    );
    // 76-column MIME style, CRLF line endings.
    let encoded = encoded_pdf(100_000);
    let wrapped = encoded
        .as_bytes()
        .chunks(76)
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect::<Vec<_>>()
        .join("\r\n");

    let result = opt.optimize_base64(&wrapped).await;

    assert_data_xor_error(&result);
    assert!(result.is_success(), "{result:?}");
    assert_eq!(result.original_size, 100_000);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn render_timeout_is_a_render_error() {
    let rewriter = FakeRewriter::sized(1);
    let opt = optimizer(
        FakeExtractor::pages(1, 5_000),
        FakeRenderer::timing_out(),
        rewriter.clone(),
    );

    let result = opt.optimize_base64(&encoded_pdf(100_000)).await;

    assert_data_xor_error(&result);
    assert_eq!(result.error_kind, Some(ErrorKind::RenderError));
    assert_eq!(result.size, None);
    assert_eq!(rewriter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn progress_reports_every_stage_in_order() {
    let recorder = Arc::new(Recorder::default());
    let opt = optimizer(
        FakeExtractor::pages(1, 5_000),
        FakeRenderer::sized(40_000),
        FakeRewriter::sized(40_000),
    )
    .with_progress(recorder.clone());

    opt.optimize_bytes(vec![b'p'; 100_000]).await.unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start SizeCheck",
            "done SizeCheck",
            "start ExtractText",
            "done ExtractText",
            "start TrivialCheck",
            "done TrivialCheck",
            "start GenerateHtml",
            "done GenerateHtml",
            "start RenderPdf",
            "done RenderPdf",
            "start MetadataStrip",
            "done MetadataStrip",
        ]
    );
    assert_eq!(*recorder.completed.lock().unwrap(), Some((100_000, 40_000)));
}

#[tokio::test]
async fn progress_reports_the_stage_that_stopped_the_run() {
    let recorder = Arc::new(Recorder::default());
    let opt = optimizer(
        FakeExtractor::pages(1, 500),
        FakeRenderer::sized(1),
        FakeRewriter::sized(1),
    )
    .with_progress(recorder.clone());

    opt.optimize_bytes(vec![b'p'; 20_000]).await.unwrap_err();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(events.last().map(String::as_str), Some("error TrivialCheck"));
    assert!(recorder.completed.lock().unwrap().is_none());
}

#[test]
fn result_serializes_for_json_callers() {
    let opt = optimizer(
        FakeExtractor::pages(1, 500),
        FakeRenderer::sized(1),
        FakeRewriter::sized(1),
    );
    let result = tokio_test::block_on(opt.optimize_base64(&encoded_pdf(20_000)));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["originalSize"], 20_000);
    assert_eq!(json["method"], "skipped");
    assert_eq!(json["errorKind"], "MinimalGain");
    assert!(json["data"].is_null());
}
