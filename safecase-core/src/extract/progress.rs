//! Advisory extraction progress.

use tokio::sync::watch;

/// Reports recognition progress in `0.0..=1.0` to an optional watcher.
///
/// Progress is advisory: a dropped receiver or a disabled reporter never
/// affects extraction.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<watch::Sender<f32>>,
}

impl ProgressReporter {
    /// A reporter that discards every update.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// A reporter plus the receiver that observes it, starting at `0.0`.
    pub fn channel() -> (Self, watch::Receiver<f32>) {
        let (tx, rx) = watch::channel(0.0);
        (Self { tx: Some(tx) }, rx)
    }

    /// Publish a progress value, clamped to `0.0..=1.0`. NaN is ignored.
    pub fn report(&self, fraction: f32) {
        if fraction.is_nan() {
            return;
        }
        if let Some(tx) = &self.tx {
            let value = fraction.clamp(0.0, 1.0);
            tx.send_if_modified(|current| {
                if *current == value {
                    false
                } else {
                    *current = value;
                    true
                }
            });
        }
    }

    pub fn finish(&self) {
        self.report(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_values() {
        let (progress, rx) = ProgressReporter::channel();
        progress.report(1.7);
        assert_eq!(*rx.borrow(), 1.0);
        progress.report(-0.2);
        assert_eq!(*rx.borrow(), 0.0);
        progress.report(f32::NAN);
        assert_eq!(*rx.borrow(), 0.0);
        progress.report(0.42);
        assert_eq!(*rx.borrow(), 0.42);
    }

    #[test]
    fn test_disabled_and_dropped_receiver_are_noops() {
        ProgressReporter::disabled().report(0.5);

        let (progress, rx) = ProgressReporter::channel();
        drop(rx);
        progress.finish();
    }
}
