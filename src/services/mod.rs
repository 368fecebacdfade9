pub mod clock;
pub mod focus_tracker;
pub mod interval_timer;
pub mod reporter;
pub mod tracking_loop;
pub mod usage_store;
pub mod window_source;

pub use focus_tracker::FocusTracker;
pub use usage_store::UsageStore;
pub use window_source::create_window_source;
