pub mod frame_cache_validator;
pub mod frame_generator;
pub mod frame_renderer;
pub mod frame_store;
