pub mod convert_frame_renderer;
pub mod image_frame_renderer;
pub mod renderer_factory;
