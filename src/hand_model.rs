use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;

use crate::landmarks::{Landmark, LandmarkSet, LandmarkSource};
use crate::LANDMARK_COUNT;

// x, y, z per keypoint
const VALUES_PER_LANDMARK: usize = 3;

/// Single-hand landmark network run through ONNX Runtime.
///
/// Expects an NHWC float input of `input_size`² RGB scaled to [0, 1]. The first
/// output holds 21 (x, y, z) keypoints in input pixels, the second the hand
/// presence score.
///
/// The whole frame is fed in; there is no palm-detection crop. Networks trained
/// on palm crops track best when the hand fills much of the view.
pub struct HandLandmarker {
    model: Session,
    input_size: u32,
    min_presence: f32,
}

impl HandLandmarker {
    pub fn new(model_path: &Path, input_size: u32, min_presence: f32, threads: usize) -> Result<Self> {
        let model = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(threads)?
            .with_inter_threads(1)?
            .commit_from_file(model_path)
            .context("Failed to load hand landmark model")?;

        Ok(Self {
            model,
            input_size,
            min_presence,
        })
    }
}

impl LandmarkSource for HandLandmarker {
    fn detect(&mut self, image: &RgbImage) -> Result<Option<LandmarkSet>> {
        let size = self.input_size;
        let min_presence = self.min_presence;

        let tensor = Tensor::from_array(prepare_input(image, size))?;
        let outputs = self.model.run(ort::inputs![tensor])?;

        let coords: ndarray::ArrayViewD<f32> = outputs[0]
            .try_extract_array()
            .context("Failed to extract landmark output")?;
        let presence: ndarray::ArrayViewD<f32> = outputs[1]
            .try_extract_array()
            .context("Failed to extract presence output")?;

        let score = presence.iter().next().copied().unwrap_or(0.0);
        if score < min_presence {
            return Ok(None);
        }

        let raw: Vec<f32> = coords.iter().copied().collect();
        Ok(decode_landmarks(&raw, size as f32))
    }
}

/// Resize to the network input and lay out as [1, size, size, 3]
pub fn prepare_input(image: &RgbImage, size: u32) -> Array4<f32> {
    let resized = imageops::resize(image, size, size, FilterType::Triangle);
    let side = size as usize;

    let mut input = Array4::<f32>::zeros((1, side, side, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            input[[0, y as usize, x as usize, c]] = pixel[c] as f32 / 255.0;
        }
    }
    input
}

/// Convert raw network keypoints (input pixels) to normalized coordinates.
/// Returns `None` if the output is too short to hold a full hand or any
/// point is not finite.
pub fn decode_landmarks(raw: &[f32], input_size: f32) -> Option<LandmarkSet> {
    if raw.len() < LANDMARK_COUNT * VALUES_PER_LANDMARK || input_size <= 0.0 {
        return None;
    }

    let points: Vec<Landmark> = raw
        .chunks_exact(VALUES_PER_LANDMARK)
        .take(LANDMARK_COUNT)
        .map(|xyz| Landmark::new(xyz[0] / input_size, xyz[1] / input_size))
        .collect();
    if !points.iter().all(Landmark::is_finite) {
        return None;
    }

    LandmarkSet::from_slice(&points)
}
