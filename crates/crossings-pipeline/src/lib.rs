//! crossings-pipeline: Junction and crossing detection for line drawings (sans-IO).
//!
//! Takes a picture of a graph drawn with dark strokes on a light
//! background and counts the places where two edges cross:
//! decode -> grayscale -> threshold -> junction scan -> connectivity
//! probing -> near-edge test.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Reading files, writing
//! overlays, and printing results live in the `crossings` binary and
//! `crossings-export`.

pub mod analyze;
pub mod connect;
pub mod crossing;
pub mod detect;
pub mod diagnostics;
pub mod field;
pub mod graph;
pub mod grayscale;
pub mod scan;
pub mod types;

pub use analyze::{Analysis, Report, analyze};
pub use connect::{Connectivity, ProbeConfig, are_connected};
pub use diagnostics::{Clock, PipelineDiagnostics, process_with_diagnostics};
pub use field::BinaryField;
pub use graph::JunctionGraph;
pub use scan::{CellState, JunctionScan, SuppressionMask};
pub use types::{DetectionConfig, Dimensions, PipelineError, Point, ProcessResult, StagedResult};

use image::{DynamicImage, GrayImage};

/// Run the full detection pipeline on encoded image bytes.
///
/// # Pipeline steps
///
/// 1. Validate the configuration
/// 2. Decode the image and convert to grayscale
/// 3. Threshold into a binary ink field
/// 4. Scan for junctions, suppressing near-duplicates
/// 5. Probe every junction pair for an ink path within the depth budget
/// 6. Flag junctions lying on an edge they are not an endpoint of
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` is invalid.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process(
    image_bytes: &[u8],
    config: &DetectionConfig,
) -> Result<ProcessResult, PipelineError> {
    config.validate()?;
    let gray = grayscale::decode_and_grayscale(image_bytes)?;
    Ok(run(&gray, config))
}

/// Run the detection pipeline on an already decoded image.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` is invalid.
pub fn process_image(
    image: &DynamicImage,
    config: &DetectionConfig,
) -> Result<ProcessResult, PipelineError> {
    config.validate()?;
    Ok(run(&grayscale::to_gray(image), config))
}

fn run(gray: &GrayImage, config: &DetectionConfig) -> ProcessResult {
    let field = BinaryField::from_luma(gray, config.ink_threshold);
    tracing::debug!(
        width = field.width(),
        height = field.height(),
        ink = field.ink_count(),
        "thresholded input"
    );
    ProcessResult {
        analysis: analyze(&field, config),
        dimensions: field.dimensions(),
    }
}
