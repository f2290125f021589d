pub mod console;
pub mod render;

pub use console::ConsoleRenderer;
pub use render::{tag_counter_label, Notification, NotificationLevel, TagRenderer};
