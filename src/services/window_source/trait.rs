use crate::config::Config;
use crate::error::Result;

/// Trait for sources of the focused window identity
#[async_trait::async_trait]
pub trait WindowSource: Send {
    /// Identity of the focused window; empty string when nothing is focused
    async fn current_identity(&mut self) -> String;
}

/// Factory function to create an appropriate window source based on the dry_run flag
pub fn create_window_source(config: &Config, dry_run: bool) -> Result<Box<dyn WindowSource>> {
    if dry_run {
        Ok(Box::new(super::DryRunSource::default()))
    } else {
        Ok(Box::new(super::window_source::RealWindowSource::new(
            &config.tracking.detection_method,
        )?))
    }
}
