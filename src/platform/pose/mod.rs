// Pose detector integration
// Provides the landmark detector abstraction and its backends

pub mod mediapipe_bridge;

pub use mediapipe_bridge::{DetectionResult, LandmarkDetector, NullDetector, ReplayDetector};
