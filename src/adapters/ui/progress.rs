//! indicatif spinner and progress bar used by the terminal menu.

use crate::domain::DownloadProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Drive a bar from download ticks until the sender side is dropped.
///
/// The bar lives in `multi` next to `fetching`, which is cleared on the first
/// tick so the two never draw over each other. Returns the last tick seen.
pub async fn follow_download(
    multi: MultiProgress,
    fetching: ProgressBar,
    mut rx: mpsc::UnboundedReceiver<DownloadProgress>,
) -> Option<DownloadProgress> {
    let pb = multi.add(ProgressBar::new(0));
    if let Ok(style) =
        ProgressStyle::with_template("{bar:40.green/white} {pos}/{len} {wide_msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    let mut last = None;
    while let Some(tick) = rx.recv().await {
        if !fetching.is_finished() {
            fetching.finish_and_clear();
        }
        pb.set_length(tick.total as u64);
        pb.set_position(tick.completed as u64);
        let name = tick
            .last_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(name);
        last = Some(tick);
    }
    fetching.finish_and_clear();
    pb.finish_and_clear();
    last
}
