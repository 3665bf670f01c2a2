use crate::core::classifier::PoseClassifier;
use crate::models::pose::{PoseError, PoseFrame, PoseResult, PostureEvent};
use crate::platform::pose::LandmarkDetector;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Events buffered for a slow subscriber before new ones are dropped
const EVENT_BUFFER: usize = 100;

// ==============================================================================
// Posture Monitor
// ==============================================================================

/// Wires a landmark detector to the classifier for a live video feed.
///
/// The monitor owns no per-frame history: each frame is detected, classified
/// and published on its own.
pub struct PostureMonitor {
    detector: Arc<dyn LandmarkDetector>,
    classifier: PoseClassifier,
    current_session_id: Arc<RwLock<Option<String>>>,
    event_tx: Arc<RwLock<Option<mpsc::Sender<PostureEvent>>>>,
}

impl PostureMonitor {
    pub fn new(detector: Arc<dyn LandmarkDetector>, classifier: PoseClassifier) -> Self {
        info!(detector = %detector.model_info(), "posture monitor created");
        Self {
            detector,
            classifier,
            current_session_id: Arc::new(RwLock::new(None)),
            event_tx: Arc::new(RwLock::new(None)),
        }
    }

    pub fn classifier(&self) -> &PoseClassifier {
        &self.classifier
    }

    pub async fn is_running(&self) -> bool {
        self.current_session_id.read().await.is_some()
    }

    /// Start a monitoring session; classified frames are delivered on the
    /// returned receiver until the session stops
    pub async fn start_session(&self) -> PoseResult<(String, mpsc::Receiver<PostureEvent>)> {
        let mut session = self.current_session_id.write().await;
        if session.is_some() {
            return Err(PoseError::AlreadyRunning);
        }

        let session_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel::<PostureEvent>(EVENT_BUFFER);

        *self.event_tx.write().await = Some(tx);
        *session = Some(session_id.clone());

        info!(%session_id, "started posture monitoring");
        Ok((session_id, rx))
    }

    /// Stop the current session. The subscriber sees the channel close.
    pub async fn stop_session(&self) -> PoseResult<()> {
        let mut session = self.current_session_id.write().await;
        let Some(session_id) = session.take() else {
            return Ok(());
        };

        // Dropping the sender closes the subscriber's channel
        *self.event_tx.write().await = None;

        info!(%session_id, "stopped posture monitoring");
        Ok(())
    }

    /// Run detection on a raw frame and classify the result.
    ///
    /// Frames where the detector finds no body are skipped and yield `None`.
    pub async fn process_frame(
        &self,
        frame_data: &[u8],
        width: u32,
        height: u32,
        timestamp: i64,
    ) -> PoseResult<Option<PostureEvent>> {
        let session_id = self.session_id().await?;

        let detection = self.detector.process_frame(frame_data, width, height)?;
        let Some(landmarks) = detection.pose_landmarks else {
            debug!(timestamp, "no pose in frame");
            return Ok(None);
        };

        let event = self.build_event(session_id, &landmarks, timestamp, detection.processing_time_ms);
        self.publish(&event).await;
        Ok(Some(event))
    }

    /// Same as `process_frame`, stamped with the current wall-clock time
    pub async fn process_frame_now(
        &self,
        frame_data: &[u8],
        width: u32,
        height: u32,
    ) -> PoseResult<Option<PostureEvent>> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        self.process_frame(frame_data, width, height, timestamp).await
    }

    /// Classify landmarks delivered by a detector that pushes its results
    /// (for example through a callback) instead of being polled
    pub async fn submit_landmarks(&self, landmarks: &PoseFrame, timestamp: i64) -> PoseResult<PostureEvent> {
        let session_id = self.session_id().await?;
        let event = self.build_event(session_id, landmarks, timestamp, 0);
        self.publish(&event).await;
        Ok(event)
    }

    async fn session_id(&self) -> PoseResult<String> {
        self.current_session_id
            .read()
            .await
            .clone()
            .ok_or(PoseError::NotInitialized)
    }

    fn build_event(
        &self,
        session_id: String,
        landmarks: &PoseFrame,
        timestamp: i64,
        detection_time_ms: u64,
    ) -> PostureEvent {
        let start_time = std::time::Instant::now();
        let outcome = self.classifier.evaluate(landmarks);
        let label = outcome.label();

        info!(
            %session_id,
            timestamp,
            %label,
            knee_angle = ?outcome.knee_angle(),
            "classified pose"
        );

        PostureEvent {
            session_id,
            timestamp,
            label,
            knee_angle: outcome.knee_angle(),
            outcome,
            processing_time_ms: detection_time_ms + start_time.elapsed().as_millis() as u64,
        }
    }

    async fn publish(&self, event: &PostureEvent) {
        let tx = self.event_tx.read().await;
        let Some(tx) = tx.as_ref() else {
            return;
        };

        match tx.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(timestamp = event.timestamp, "posture subscriber lagging, event dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("posture subscriber gone");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::tests::frame_with_knee_angles;
    use crate::models::pose::{Classification, DetectorConfig, Landmark, PoseLabel};
    use crate::platform::pose::{NullDetector, ReplayDetector};

    fn replay_monitor(frames: Vec<Option<PoseFrame>>) -> PostureMonitor {
        let detector = ReplayDetector::new(&DetectorConfig::default(), frames).unwrap();
        PostureMonitor::new(Arc::new(detector), PoseClassifier::default())
    }

    #[tokio::test]
    async fn test_requires_session() {
        let monitor = PostureMonitor::new(Arc::new(NullDetector), PoseClassifier::default());
        assert!(!monitor.is_running().await);

        let result = monitor.process_frame(&[], 640, 480, 0).await;
        assert!(matches!(result, Err(PoseError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let monitor = PostureMonitor::new(Arc::new(NullDetector), PoseClassifier::default());

        let (session_id, mut rx) = monitor.start_session().await.unwrap();
        assert!(!session_id.is_empty());
        assert!(monitor.is_running().await);
        assert!(matches!(
            monitor.start_session().await,
            Err(PoseError::AlreadyRunning)
        ));

        monitor.stop_session().await.unwrap();
        assert!(!monitor.is_running().await);
        assert!(rx.recv().await.is_none());

        // Stopping twice is harmless
        monitor.stop_session().await.unwrap();
    }

    #[tokio::test]
    async fn test_classifies_replayed_frames() {
        let monitor = replay_monitor(vec![
            Some(frame_with_knee_angles(125.0, 125.0)),
            None,
            Some(frame_with_knee_angles(180.0, 180.0)),
            Some(PoseFrame::new(vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 5])),
        ]);
        let (session_id, mut rx) = monitor.start_session().await.unwrap();

        let squat = monitor.process_frame(&[], 640, 480, 1).await.unwrap().unwrap();
        assert_eq!(squat.label, PoseLabel::Squat);
        assert_eq!(squat.knee_angle, Some(125.0));
        assert_eq!(squat.session_id, session_id);

        // No landmarks in the frame: skipped, nothing published
        assert!(monitor.process_frame(&[], 640, 480, 2).await.unwrap().is_none());

        let stand = monitor.process_frame(&[], 640, 480, 3).await.unwrap().unwrap();
        assert_eq!(stand.label, PoseLabel::Stand);

        let short = monitor.process_frame(&[], 640, 480, 4).await.unwrap().unwrap();
        assert_eq!(short.label, PoseLabel::Unknown);
        assert!(matches!(short.outcome, Classification::Unclassifiable { .. }));

        let received: Vec<_> = [rx.recv().await, rx.recv().await, rx.recv().await]
            .into_iter()
            .map(|event| event.unwrap().timestamp)
            .collect();
        assert_eq!(received, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn test_submit_landmarks_without_detector() {
        let monitor = PostureMonitor::new(Arc::new(NullDetector), PoseClassifier::default());
        let frame = frame_with_knee_angles(130.0, 130.0);

        assert!(matches!(
            monitor.submit_landmarks(&frame, 7).await,
            Err(PoseError::NotInitialized)
        ));

        let (_, mut rx) = monitor.start_session().await.unwrap();
        let event = monitor.submit_landmarks(&frame, 7).await.unwrap();
        assert_eq!(event.label, PoseLabel::Squat);
        assert_eq!(rx.recv().await.unwrap().label, PoseLabel::Squat);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_fail_processing() {
        let monitor = PostureMonitor::new(Arc::new(NullDetector), PoseClassifier::default());
        let (_, rx) = monitor.start_session().await.unwrap();
        drop(rx);

        let event = monitor
            .submit_landmarks(&frame_with_knee_angles(180.0, 180.0), 0)
            .await
            .unwrap();
        assert_eq!(event.label, PoseLabel::Stand);
    }
}
