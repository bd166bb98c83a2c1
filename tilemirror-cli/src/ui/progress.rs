//! Download progress bar.
//!
//! Renders the dispatcher's progress snapshots on stderr. Hidden when
//! stderr is not a terminal or when output is machine-readable.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tilemirror::download::{ProgressCallback, ProgressSnapshot};

const TEMPLATE: &str =
    "{spinner:.green} {prefix:>6} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} | {msg}";

/// Progress bar for one dataset's downloads.
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    /// Create a bar labelled with `dataset`, drawn only when `visible`.
    pub fn new(dataset: &str, visible: bool) -> Self {
        let bar = ProgressBar::new(0);
        if visible {
            bar.set_draw_target(ProgressDrawTarget::stderr());
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_prefix(dataset.to_string());
        Self { bar }
    }

    /// Whether a terminal is available to draw on.
    pub fn terminal_available() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Callback feeding dispatcher snapshots into the bar.
    pub fn callback(&self) -> ProgressCallback {
        let bar = self.bar.clone();
        Arc::new(move |snapshot: ProgressSnapshot| update(&bar, snapshot))
    }

    /// Stop drawing and leave the final state on screen.
    pub fn finish(&self) {
        self.bar.finish();
    }

    #[cfg(test)]
    fn position(&self) -> (u64, Option<u64>) {
        (self.bar.position(), self.bar.length())
    }
}

fn update(bar: &ProgressBar, snapshot: ProgressSnapshot) {
    bar.set_length(snapshot.total as u64);
    bar.set_position(snapshot.completed as u64);
    bar.set_message(format!(
        "{} queued, {:.1}% done",
        snapshot.queued,
        snapshot.percent_complete()
    ));
}
