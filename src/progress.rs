//! Progress callbacks for the PDF optimization pipeline.
//!
//! Attach an [`Arc<dyn OptimizeProgressCallback>`] with
//! [`crate::PdfOptimizer::with_progress`] to observe the pipeline as it moves
//! through its stages. The CLI uses this to drive its spinner.
//!
//! # Example
//!
//! ```rust
//! use docshift::{OptimizeProgressCallback, OptimizeStage};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct StageCounter(AtomicUsize);
//!
//! impl OptimizeProgressCallback for StageCounter {
//!     fn on_stage_complete(&self, stage: OptimizeStage) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("done: {}", stage.label());
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

/// Stages of the optimization pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizeStage {
    SizeCheck,
    ExtractText,
    TrivialCheck,
    GenerateHtml,
    RenderPdf,
    MetadataStrip,
}

impl OptimizeStage {
    /// Short human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            OptimizeStage::SizeCheck => "Checking size",
            OptimizeStage::ExtractText => "Extracting text",
            OptimizeStage::TrivialCheck => "Checking density",
            OptimizeStage::GenerateHtml => "Reflowing to HTML",
            OptimizeStage::RenderPdf => "Re-printing with Chrome",
            OptimizeStage::MetadataStrip => "Rewriting metadata",
        }
    }
}

impl fmt::Display for OptimizeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the optimizer as it moves through its stages.
///
/// All methods default to no-ops. Calls arrive sequentially from whichever
/// task is driving the pipeline.
pub trait OptimizeProgressCallback: Send + Sync {
    fn on_stage_start(&self, stage: OptimizeStage) {
        let _ = stage;
    }

    fn on_stage_complete(&self, stage: OptimizeStage) {
        let _ = stage;
    }

    /// The pipeline stopped at `stage`, either with a failure or a
    /// minimal-gain refusal.
    ///
    /// # Arguments
    /// * `error` — human-readable description (not localized)
    fn on_stage_error(&self, stage: OptimizeStage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once after a successful run.
    fn on_optimize_complete(&self, original_size: usize, final_size: usize) {
        let _ = (original_size, final_size);
    }
}

/// A callback that ignores every event.
pub struct NoopProgressCallback;

impl OptimizeProgressCallback for NoopProgressCallback {}

/// Shared callback handle as stored by the optimizer.
pub type ProgressCallback = Arc<dyn OptimizeProgressCallback>;
