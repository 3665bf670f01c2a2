// Landmark detector bridge
// Abstracts the external pose detector so callers can swap a live MediaPipe
// backend for recorded results without touching classification

use crate::models::pose::{DetectorConfig, PoseError, PoseFrame, PoseResult};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, info};

/// Detector output for one video frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    /// `None` when no body was found in the frame
    pub pose_landmarks: Option<PoseFrame>,
    pub processing_time_ms: u64,
}

/// Landmark detector trait
/// Implement this for MediaPipe, ONNX, or replay backends
pub trait LandmarkDetector: Send + Sync {
    /// Run detection on a raw frame
    fn process_frame(&self, frame_data: &[u8], width: u32, height: u32) -> PoseResult<DetectionResult>;

    /// Check if the backend is ready to produce landmarks
    fn is_initialized(&self) -> bool;

    /// Get model info
    fn model_info(&self) -> String;
}

// ==============================================================================
// Replay Implementation (recorded detector output)
// ==============================================================================

/// Plays back previously recorded detector results, one per processed frame.
///
/// Frame pixels are ignored. Once the recording is exhausted every frame
/// reports no pose.
pub struct ReplayDetector {
    config: DetectorConfig,
    results: Mutex<VecDeque<DetectionResult>>,
}

impl ReplayDetector {
    pub fn new(config: &DetectorConfig, frames: Vec<Option<PoseFrame>>) -> PoseResult<Self> {
        config.validate()?;

        let results = frames
            .into_iter()
            .map(|pose_landmarks| DetectionResult {
                pose_landmarks,
                processing_time_ms: 0,
            })
            .collect::<VecDeque<_>>();

        info!(frames = results.len(), "replay detector loaded");

        Ok(Self {
            config: config.clone(),
            results: Mutex::new(results),
        })
    }

    /// Parse a JSON-lines recording: one landmark array or results object per line.
    /// Blank lines are skipped.
    pub fn from_json_lines(config: &DetectorConfig, recording: &str) -> PoseResult<Self> {
        let frames = recording
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PoseFrame::from_json)
            .collect::<PoseResult<Vec<_>>>()?;

        Self::new(config, frames)
    }

    /// Recorded results not yet played back
    pub fn remaining(&self) -> usize {
        self.results.lock().map(|results| results.len()).unwrap_or(0)
    }
}

impl LandmarkDetector for ReplayDetector {
    fn process_frame(&self, _frame_data: &[u8], width: u32, height: u32) -> PoseResult<DetectionResult> {
        let mut results = self
            .results
            .lock()
            .map_err(|e| PoseError::InferenceFailed(format!("Replay queue poisoned: {}", e)))?;

        let result = results.pop_front().unwrap_or_default();
        debug!(
            width,
            height,
            has_pose = result.pose_landmarks.is_some(),
            remaining = results.len(),
            "replayed detection"
        );

        Ok(result)
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn model_info(&self) -> String {
        format!(
            "Replay detector (recorded landmarks) - complexity: {:?}, selfie: {}",
            self.config.model_complexity, self.config.selfie_mode
        )
    }
}

// ==============================================================================
// Null Implementation (no detection backend)
// ==============================================================================

pub struct NullDetector;

impl LandmarkDetector for NullDetector {
    fn process_frame(&self, _frame_data: &[u8], _width: u32, _height: u32) -> PoseResult<DetectionResult> {
        Ok(DetectionResult::default())
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn model_info(&self) -> String {
        "Null detector (no landmark detection)".to_string()
    }
}
