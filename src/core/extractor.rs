use crate::models::pose::{
    BodyLandmark, Landmark, LowerBodyLandmarks, PoseFrame, UnclassifiableReason,
};

/// Landmarks whose visibility gates classification. Hip visibility is not checked.
const GATED_LANDMARKS: [BodyLandmark; 4] = [
    BodyLandmark::LeftKnee,
    BodyLandmark::RightKnee,
    BodyLandmark::LeftAnkle,
    BodyLandmark::RightAnkle,
];

/// Minimum frame length covering every lower-body index (hips through ankles)
pub const REQUIRED_LANDMARKS: usize = BodyLandmark::RightAnkle as usize + 1;

/// Pull hips, knees and ankles out of a frame, rejecting frames where any
/// knee or ankle visibility is not strictly above `visibility_threshold`.
pub fn extract_lower_body(
    frame: &PoseFrame,
    visibility_threshold: f32,
) -> Result<LowerBodyLandmarks, UnclassifiableReason> {
    let lookup = |landmark: BodyLandmark| -> Result<Landmark, UnclassifiableReason> {
        frame
            .get(landmark)
            .copied()
            .ok_or(UnclassifiableReason::MissingLandmarks {
                found: frame.len(),
                required: REQUIRED_LANDMARKS,
            })
    };

    let lower_body = LowerBodyLandmarks {
        left_hip: lookup(BodyLandmark::LeftHip)?,
        right_hip: lookup(BodyLandmark::RightHip)?,
        left_knee: lookup(BodyLandmark::LeftKnee)?,
        right_knee: lookup(BodyLandmark::RightKnee)?,
        left_ankle: lookup(BodyLandmark::LeftAnkle)?,
        right_ankle: lookup(BodyLandmark::RightAnkle)?,
    };

    for landmark in GATED_LANDMARKS {
        let point = lookup(landmark)?;
        if !point.is_visible(visibility_threshold) {
            return Err(UnclassifiableReason::LowVisibility {
                landmark: landmark as u8,
                visibility: point.visibility,
            });
        }
    }

    Ok(lower_body)
}
