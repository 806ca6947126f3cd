//! Spinner management for long-running phases

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::config::SPINNER_TEMPLATE;

const SPINNER_TICK_MS: u64 = 100;

/// Creates a ticking spinner showing `message`
///
/// Falls back to indicatif's default spinner style if the template is rejected.
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    spinner
}
