pub mod background;
pub mod notifier;
pub mod original_wallpaper;
pub mod window_counter;
pub mod window_event_source;
