pub mod angles;
pub mod extractor;
pub mod config;
pub mod classifier;

// Caller-side wiring of detector and classifier
pub mod posture_monitor;
