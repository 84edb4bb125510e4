//! Face descriptor enrollment and matching
//!
//! Descriptors are fixed-length real vectors produced by an external
//! embedding model; this module never sees an image. Enrollment stores the
//! element-wise mean of the captured samples, and login compares a live
//! descriptor against the enrolled mean by Euclidean distance. Everything
//! here is a pure function of its inputs.

use thiserror::Error;

/// Maximum Euclidean distance at which a live descriptor still matches the
/// enrolled one. Calibration constant carried over from the deployed
/// system; a distance of exactly this value authenticates.
pub const MATCH_THRESHOLD: f64 = 0.45;

/// Number of face samples the capture UI collects during enrollment.
/// The server accepts any non-zero count but logs a warning on mismatch.
pub const ENROLLMENT_SAMPLES: usize = 3;

/// Errors from descriptor math and the byte codec
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FaceError {
    /// Enrollment was attempted without any captured samples
    #[error("No face samples provided")]
    NoSamples,

    /// Two descriptors (or two samples) have different lengths
    #[error("Face descriptor length mismatch: {0} vs {1}")]
    LengthMismatch(usize, usize),

    /// A stored descriptor's byte length is not a multiple of four
    #[error("Invalid stored descriptor length: {0} bytes")]
    InvalidEncoding(usize),
}

/// Compute the element-wise arithmetic mean of the captured samples.
///
/// This is the entire "training" step of enrollment: the stored template
/// is just the average of the sample vectors.
pub fn mean_embedding(samples: &[Vec<f32>]) -> Result<Vec<f32>, FaceError> {
    let first = samples.first().ok_or(FaceError::NoSamples)?;
    let dim = first.len();

    for sample in samples {
        if sample.len() != dim {
            return Err(FaceError::LengthMismatch(dim, sample.len()));
        }
    }

    let count = samples.len() as f64;
    let mean = (0..dim)
        .map(|i| {
            let sum: f64 = samples.iter().map(|s| s[i] as f64).sum();
            (sum / count) as f32
        })
        .collect();

    Ok(mean)
}

/// Standard Euclidean distance between two equal-length descriptors.
///
/// Accumulates in f64 so the comparison against [`MATCH_THRESHOLD`] is not
/// at the mercy of f32 rounding.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f64, FaceError> {
    if a.len() != b.len() {
        return Err(FaceError::LengthMismatch(a.len(), b.len()));
    }

    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = *x as f64 - *y as f64;
            diff * diff
        })
        .sum();

    Ok(sum.sqrt())
}

/// Encode a descriptor as the stored byte form: little-endian f32s,
/// 4 bytes per element.
pub fn encode_descriptor(descriptor: &[f32]) -> Vec<u8> {
    descriptor.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode a stored descriptor back into its vector form.
pub fn decode_descriptor(bytes: &[u8]) -> Result<Vec<f32>, FaceError> {
    if bytes.len() % 4 != 0 {
        return Err(FaceError::InvalidEncoding(bytes.len()));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
