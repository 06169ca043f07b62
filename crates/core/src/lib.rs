pub mod desktop;
pub mod frames;
pub mod pipeline;
pub mod shared;
pub mod transition;
