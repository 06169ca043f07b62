pub mod pipeline_logger;
pub mod prepare_frames_use_case;
pub mod watch_windows_use_case;
