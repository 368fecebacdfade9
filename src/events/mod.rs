pub mod interval;
pub mod window;

pub use interval::{CompletedInterval, TimeEntry};
pub use window::{WindowIdentity, WindowInfo};
