//! Knee-angle posture classification for body-pose landmarks.
//!
//! Landmarks come from an external detector (MediaPipe Pose layout, 33
//! points). The classifier averages both knee angles and maps the result to
//! `stand`, `squat` or `unknown` through configurable angle bands.

pub mod core;
pub mod models;
pub mod platform;

pub use crate::core::angles::joint_angle;
pub use crate::core::classifier::PoseClassifier;
pub use crate::core::config::{AngleBand, ClassifierConfig};
pub use crate::core::extractor::extract_lower_body;
pub use crate::core::posture_monitor::PostureMonitor;
pub use crate::models::pose::{
    BodyLandmark, Classification, DetectorConfig, Landmark, LowerBodyLandmarks, PoseError,
    PoseFrame, PoseLabel, PoseResult, PostureEvent, UnclassifiableReason,
};
pub use crate::platform::pose::{DetectionResult, LandmarkDetector, NullDetector, ReplayDetector};
