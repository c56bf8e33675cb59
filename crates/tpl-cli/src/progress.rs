//! Terminal progress rendering
//!
//! Implements the engine's [`ProgressSink`] on top of indicatif. The engine
//! already serializes events, so the only state to guard is the bar map.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tpl_transfer::{ProgressEvent, ProgressSink};

pub struct TransferProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl TransferProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn bar_for(&self, event: &ProgressEvent) -> Option<ProgressBar> {
        let mut bars = self.bars.lock().ok()?;
        let bar = bars
            .entry(event.item.clone())
            .or_insert_with(|| {
                let bar = match event.bytes_total {
                    Some(total) => {
                        let bar = self.multi.add(ProgressBar::new(total));
                        bar.set_style(byte_style());
                        bar
                    }
                    None => {
                        // No Content-Length: indeterminate spinner.
                        let bar = self.multi.add(ProgressBar::new_spinner());
                        bar.enable_steady_tick(Duration::from_millis(100));
                        bar
                    }
                };
                bar.set_message(event.item.clone());
                bar
            })
            .clone();
        Some(bar)
    }
}

impl Default for TransferProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TransferProgress {
    fn on_progress(&self, event: ProgressEvent) {
        let Some(bar) = self.bar_for(&event) else {
            return;
        };
        bar.set_position(event.bytes_done);

        if event.bytes_total == Some(event.bytes_done) {
            bar.finish_and_clear();
            self.multi.remove(&bar);
            if let Ok(mut bars) = self.bars.lock() {
                bars.remove(&event.item);
            }
        }
    }
}

fn byte_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:30!} {bar:24.green} {bytes}/{total_bytes}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_item_drops_its_bar() {
        let progress = TransferProgress::new();
        progress.on_progress(ProgressEvent {
            item: "a.txt".into(),
            bytes_done: 1,
            bytes_total: Some(2),
        });
        assert_eq!(progress.bars.lock().unwrap().len(), 1);

        progress.on_progress(ProgressEvent {
            item: "a.txt".into(),
            bytes_done: 2,
            bytes_total: Some(2),
        });
        assert!(progress.bars.lock().unwrap().is_empty());
    }

    #[test]
    fn indeterminate_event_creates_spinner() {
        let progress = TransferProgress::new();
        progress.on_progress(ProgressEvent {
            item: "download.exe".into(),
            bytes_done: 512,
            bytes_total: None,
        });
        assert_eq!(progress.bars.lock().unwrap().len(), 1);
    }
}
