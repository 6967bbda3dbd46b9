//! CLI-specific progress handling for border-stitch
//!
//! Shows a bar over the focus states while the pipeline runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use border_stitch::core::pipeline::ProgressCallback;
use border_stitch::StateCode;

/// Creates a progress bar counting processed states
pub fn create_progress_bar(total_states: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_states);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} states {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Progress manager for a stitching run
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager; the length is set on the first update
    pub fn new(message: &str) -> Self {
        let pb = create_progress_bar(0);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Callback feeding this bar from the pipeline
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        Arc::new(move |done: usize, total: usize, state: &StateCode| {
            if pb.length().unwrap_or(0) != total as u64 {
                pb.set_length(total as u64);
            }
            pb.set_position(done as u64);
            pb.set_message(state.to_string());
            if done >= total {
                pb.finish_with_message("✅ all states stitched");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_progress_bar_template() {
        let pb = create_progress_bar(49);
        assert_eq!(pb.length().unwrap(), 49);
        pb.set_position(10);
        pb.finish();
    }

    #[test]
    fn test_callback_tracks_states() {
        let manager = ProgressManager::new("Test run");
        let callback = manager.callback();
        let state = StateCode::parse("AR").unwrap();

        callback(1, 3, &state);
        assert_eq!(manager.pb.length().unwrap(), 3);
        assert_eq!(manager.pb.position(), 1);

        callback(3, 3, &state);
        assert!(manager.pb.is_finished());
    }
}
