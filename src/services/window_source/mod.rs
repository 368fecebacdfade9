//! WindowSource service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for reading the identity
//! (title) of the currently focused window. They MUST NOT decide anything about
//! focus sessions or elapsed time: that belongs exclusively to FocusTracker.

mod dry_run;
mod kdotool;
mod sway;
mod r#trait;
mod window_source;
mod wmctrl;
mod xdotool;

pub use self::dry_run::DryRunSource;
pub use self::r#trait::{create_window_source, WindowSource};
