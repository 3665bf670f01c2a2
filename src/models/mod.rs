// Data models for pose landmarks, classification results and detector settings

pub mod pose;
