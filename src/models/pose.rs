// Data models for body-pose landmarks and posture classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==============================================================================
// Landmarks
// ==============================================================================

/// A single body landmark as produced by the external detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32, // Normalized image coordinate, not clamped
    pub y: f32, // Normalized image coordinate, not clamped
    #[serde(default)]
    pub z: f32, // Depth, unused by the classifier
    #[serde(default)]
    pub visibility: f32, // Confidence that the point is located correctly [0, 1]
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// Visibility must be strictly above the threshold
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }
}

/// MediaPipe Pose Landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    /// Number of landmarks in a full MediaPipe Pose result
    pub const COUNT: usize = 33;

    pub fn index(self) -> usize {
        self as usize
    }
}

// ==============================================================================
// Pose Frame
// ==============================================================================

/// Ordered landmark sequence for a single detection result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseFrame {
    landmarks: Vec<Landmark>,
}

/// Raw detector results as emitted by MediaPipe (`poseLandmarks` may be null)
#[derive(Debug, Deserialize)]
struct DetectorResults {
    #[serde(rename = "poseLandmarks", default)]
    pose_landmarks: Option<Vec<Landmark>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FramePayload {
    Landmarks(Vec<Landmark>),
    Results(DetectorResults),
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Look up a landmark by anatomical name; `None` when the frame is too short
    pub fn get(&self, landmark: BodyLandmark) -> Option<&Landmark> {
        self.landmarks.get(landmark.index())
    }

    /// Parse a bare landmark array or a detector results object.
    ///
    /// Returns `Ok(None)` when the results object carries no pose.
    pub fn from_json(json: &str) -> PoseResult<Option<Self>> {
        let payload: FramePayload = serde_json::from_str(json)?;
        Ok(match payload {
            FramePayload::Landmarks(landmarks) => Some(Self::new(landmarks)),
            FramePayload::Results(results) => results.pose_landmarks.map(Self::new),
        })
    }
}

impl From<Vec<Landmark>> for PoseFrame {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self::new(landmarks)
    }
}

/// The six landmarks the knee-angle heuristic needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowerBodyLandmarks {
    pub left_hip: Landmark,
    pub right_hip: Landmark,
    pub left_knee: Landmark,
    pub right_knee: Landmark,
    pub left_ankle: Landmark,
    pub right_ankle: Landmark,
}

// ==============================================================================
// Classification
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseLabel {
    Stand,
    Squat,
    Unknown,
}

impl PoseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoseLabel::Stand => "stand",
            PoseLabel::Squat => "squat",
            PoseLabel::Unknown => "unknown",
        }
    }

    /// Legacy spelling: `"null"` for no match
    pub fn legacy_str(&self) -> &'static str {
        match self {
            PoseLabel::Unknown => "null",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for PoseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoseLabel {
    type Err = PoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stand" => Ok(PoseLabel::Stand),
            "squat" => Ok(PoseLabel::Squat),
            "unknown" | "null" => Ok(PoseLabel::Unknown),
            other => Err(PoseError::InvalidConfig(format!("Unknown pose label: {}", other))),
        }
    }
}

/// Why a frame could not be classified
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum UnclassifiableReason {
    /// Frame is shorter than the highest required landmark index
    MissingLandmarks { found: usize, required: usize },
    /// A knee or ankle is not visible enough
    LowVisibility { landmark: u8, visibility: f32 },
}

impl fmt::Display for UnclassifiableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnclassifiableReason::MissingLandmarks { found, required } => {
                write!(f, "frame has {} landmarks, {} required", found, required)
            }
            UnclassifiableReason::LowVisibility {
                landmark,
                visibility,
            } => write!(f, "landmark {} visibility {:.2} too low", landmark, visibility),
        }
    }
}

/// Detailed outcome of classifying one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Classification {
    Unclassifiable { cause: UnclassifiableReason },
    Classified { label: PoseLabel, knee_angle: f64 },
    NoMatch { knee_angle: f64 },
}

impl Classification {
    /// Collapse to the single label callers have always seen
    pub fn label(&self) -> PoseLabel {
        match self {
            Classification::Classified { label, .. } => *label,
            Classification::Unclassifiable { .. } | Classification::NoMatch { .. } => {
                PoseLabel::Unknown
            }
        }
    }

    pub fn knee_angle(&self) -> Option<f64> {
        match self {
            Classification::Classified { knee_angle, .. }
            | Classification::NoMatch { knee_angle } => Some(*knee_angle),
            Classification::Unclassifiable { .. } => None,
        }
    }
}

// ==============================================================================
// Monitor Events
// ==============================================================================

/// One classified frame, as handed to display/logging collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureEvent {
    pub session_id: String,
    pub timestamp: i64,
    pub label: PoseLabel,
    pub knee_angle: Option<f64>,
    pub outcome: Classification,
    pub processing_time_ms: u64,
}

// ==============================================================================
// Detector Configuration
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub model_complexity: ModelComplexity,
    pub smooth_landmarks: bool,            // Detector-side landmark filtering across frames
    pub min_detection_confidence: f32,     // Minimum confidence for detection (default: 0.5)
    pub min_tracking_confidence: f32,      // Minimum confidence for tracking (default: 0.5)
    pub selfie_mode: bool,                 // Mirror input horizontally (front-facing camera)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelComplexity {
    Lite = 0,
    Full = 1,
    Heavy = 2,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_complexity: ModelComplexity::Full,
            smooth_landmarks: true,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            selfie_mode: true,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> PoseResult<()> {
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PoseError::InvalidConfig(format!(
                    "Invalid {}: {}. Must be between 0.0 and 1.0",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Pose is not classifiable: {0}")]
    Unclassifiable(UnclassifiableReason),

    #[error("Posture monitor not started")]
    NotInitialized,

    #[error("Posture monitor already running")]
    AlreadyRunning,

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PoseResult<T> = Result<T, PoseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_visibility_is_strict() {
        let landmark = Landmark::new(0.5, 0.5, 0.0, 0.5);
        assert!(!landmark.is_visible(0.5));
        assert!(landmark.is_visible(0.4));
    }

    #[test]
    fn test_body_landmark_indices() {
        assert_eq!(BodyLandmark::LeftHip.index(), 23);
        assert_eq!(BodyLandmark::RightAnkle.index(), 28);
        assert_eq!(BodyLandmark::RightFootIndex.index(), BodyLandmark::COUNT - 1);
    }

    #[test]
    fn test_frame_lookup_out_of_range() {
        let frame = PoseFrame::new(vec![Landmark::new(0.0, 0.0, 0.0, 1.0); 10]);
        assert!(frame.get(BodyLandmark::Nose).is_some());
        assert!(frame.get(BodyLandmark::LeftHip).is_none());
    }

    #[test]
    fn test_frame_from_landmark_array() {
        let json = r#"[{"x": 0.1, "y": 0.2, "z": -0.3, "visibility": 0.9}, {"x": 0.4, "y": 0.5}]"#;
        let frame = PoseFrame::from_json(json).unwrap().unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.landmarks()[0].visibility, 0.9);
        assert_eq!(frame.landmarks()[1].z, 0.0);
        assert_eq!(frame.landmarks()[1].visibility, 0.0);
    }

    #[test]
    fn test_frame_from_results_object() {
        let json = r#"{"poseLandmarks": [{"x": 0.1, "y": 0.2, "z": 0.0, "visibility": 1.0}]}"#;
        let frame = PoseFrame::from_json(json).unwrap().unwrap();
        assert_eq!(frame.len(), 1);

        assert!(PoseFrame::from_json(r#"{"poseLandmarks": null}"#).unwrap().is_none());
        assert!(PoseFrame::from_json("{}").unwrap().is_none());
        assert!(PoseFrame::from_json("not json").is_err());
    }

    #[test]
    fn test_label_strings() {
        assert_eq!(PoseLabel::Squat.to_string(), "squat");
        assert_eq!(PoseLabel::Unknown.legacy_str(), "null");
        assert_eq!(PoseLabel::Stand.legacy_str(), "stand");
        assert_eq!("null".parse::<PoseLabel>().unwrap(), PoseLabel::Unknown);
        assert!("sit".parse::<PoseLabel>().is_err());
    }

    #[test]
    fn test_detector_config_default() {
        let config = DetectorConfig::default();
        assert_eq!(config.model_complexity, ModelComplexity::Full);
        assert_eq!(config.min_detection_confidence, 0.5);
        assert!(config.smooth_landmarks);
        assert!(config.selfie_mode);
        assert!(config.validate().is_ok());

        let invalid = DetectorConfig {
            min_tracking_confidence: -0.1,
            ..DetectorConfig::default()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_classification_collapses_to_unknown() {
        let no_match = Classification::NoMatch { knee_angle: 150.0 };
        assert_eq!(no_match.label(), PoseLabel::Unknown);
        assert_eq!(no_match.knee_angle(), Some(150.0));

        let unclassifiable = Classification::Unclassifiable {
            cause: UnclassifiableReason::MissingLandmarks {
                found: 0,
                required: 29,
            },
        };
        assert_eq!(unclassifiable.label(), PoseLabel::Unknown);
        assert_eq!(unclassifiable.knee_angle(), None);
    }
}
