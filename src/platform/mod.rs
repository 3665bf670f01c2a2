// Platform integrations for external collaborators

pub mod pose;
