//! Knee-angle posture classifier
//!
//! Single-frame and stateless: every call extracts the lower body, averages
//! the two knee angles and looks the average up in the configured bands.

use crate::core::angles::joint_angle;
use crate::core::config::ClassifierConfig;
use crate::core::extractor::extract_lower_body;
use crate::models::pose::{
    Classification, LowerBodyLandmarks, PoseError, PoseFrame, PoseLabel, PoseResult,
};
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct PoseClassifier {
    config: ClassifierConfig,
}

impl PoseClassifier {
    /// Build a classifier from a validated configuration
    pub fn new(config: ClassifierConfig) -> PoseResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a frame, collapsing every non-match to `Unknown`
    pub fn classify(&self, frame: &PoseFrame) -> PoseLabel {
        self.evaluate(frame).label()
    }

    /// Classify a frame, keeping the reason a frame was not labelled
    pub fn evaluate(&self, frame: &PoseFrame) -> Classification {
        let lower_body = match extract_lower_body(frame, self.config.visibility_threshold) {
            Ok(lower_body) => lower_body,
            Err(cause) => {
                trace!(%cause, "frame not classifiable");
                return Classification::Unclassifiable { cause };
            }
        };

        let knee_angle = Self::knee_angle(&lower_body);
        match self.label_for_angle(knee_angle) {
            Some(label) => Classification::Classified { label, knee_angle },
            None => Classification::NoMatch { knee_angle },
        }
    }

    /// Like `evaluate`, but surfaces unclassifiable frames as an error
    pub fn try_classify(&self, frame: &PoseFrame) -> PoseResult<PoseLabel> {
        match self.evaluate(frame) {
            Classification::Unclassifiable { cause } => Err(PoseError::Unclassifiable(cause)),
            outcome => Ok(outcome.label()),
        }
    }

    /// Mean of the left and right knee angles, in degrees
    pub fn knee_angle(lower_body: &LowerBodyLandmarks) -> f64 {
        let left = joint_angle(&lower_body.left_hip, &lower_body.left_knee, &lower_body.left_ankle);
        let right = joint_angle(
            &lower_body.right_hip,
            &lower_body.right_knee,
            &lower_body.right_ankle,
        );
        f64::from(left + right) / 2.0
    }

    /// First configured band strictly containing the angle
    pub fn label_for_angle(&self, knee_angle: f64) -> Option<PoseLabel> {
        self.config
            .bands
            .iter()
            .find(|band| band.contains(knee_angle))
            .map(|band| band.label)
    }
}
