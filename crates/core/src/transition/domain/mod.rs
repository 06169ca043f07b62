pub mod blur_coordinator;
pub mod transition;
