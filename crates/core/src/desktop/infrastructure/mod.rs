pub mod feh_background;
pub mod notify_send_notifier;
pub mod xprop;
pub mod xprop_event_source;
pub mod xprop_window_counter;
