//! Prometheus metrics for the upload pipeline.
//!
//! This module provides metrics for:
//! - Intake (accepted / skipped files)
//! - Compression (outcome, bytes saved)
//! - Uploads (outcome, duration)
//! - Remote deletions
//!
//! The host registers [`all_metrics`] in its own registry.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Intake
// =============================================================================

/// Files seen at intake by result.
pub static INTAKE_FILES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gallery_intake_files_total", "Files seen at intake"),
        &["result"], // "accepted", "skipped"
    )
    .unwrap()
});

// =============================================================================
// Compression
// =============================================================================

/// Compression runs by result.
pub static COMPRESSION_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gallery_compression_total", "Compression runs"),
        &["result"], // "compressed", "passthrough", "fallback"
    )
    .unwrap()
});

/// Bytes saved by compression.
pub static COMPRESSION_SAVED_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "gallery_compression_saved_bytes_total",
        "Bytes saved by compressing payloads before upload",
    )
    .unwrap()
});

// =============================================================================
// Uploads
// =============================================================================

/// Uploads by result.
pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gallery_uploads_total", "Uploads processed by the scheduler"),
        &["result"], // "completed", "errored", "discarded"
    )
    .unwrap()
});

/// Upload duration in seconds, compression included.
pub static UPLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gallery_upload_duration_seconds",
            "Duration of a single item upload",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["result"],
    )
    .unwrap()
});

/// Remote deletions by result.
pub static REMOTE_DELETES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gallery_remote_deletes_total", "Best-effort remote deletions"),
        &["result"], // "ok", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all pipeline metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(INTAKE_FILES.clone()),
        Box::new(COMPRESSION_TOTAL.clone()),
        Box::new(COMPRESSION_SAVED_BYTES.clone()),
        Box::new(UPLOADS_TOTAL.clone()),
        Box::new(UPLOAD_DURATION.clone()),
        Box::new(REMOTE_DELETES.clone()),
    ]
}
