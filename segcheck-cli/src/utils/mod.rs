pub mod progress;
mod time;

pub use self::time::format_duration;
pub use self::time::parse_time;
