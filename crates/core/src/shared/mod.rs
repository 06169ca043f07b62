pub mod blur_config;
pub mod command;
pub mod constants;
pub mod paths;
pub mod range;
