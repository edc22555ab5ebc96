//! Progress reporting for pipeline stages.
//!
//! Each stage receives a progress sink instead of writing to a global
//! console, so callers decide where status lines go (stdout, a UI channel,
//! nowhere).

/// Receives human-readable status lines as a resign job advances.
pub trait Progress: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> Progress for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Discards all progress output.
pub struct NullProgress;

impl Progress for NullProgress {
    fn report(&self, _message: &str) {}
}

/// Integer percentage for `done` out of `total` entries.
pub(crate) fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        100
    } else {
        done * 100 / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_are_progress_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |message: &str| seen.lock().unwrap().push(message.to_string());
        sink.report("extracting 50%");
        assert_eq!(seen.lock().unwrap().as_slice(), ["extracting 50%"]);
    }

    #[test]
    fn percent_is_clamped_and_total_zero_is_done() {
        assert_eq!(percent(0, 4), 0);
        assert_eq!(percent(2, 4), 50);
        assert_eq!(percent(4, 4), 100);
        assert_eq!(percent(0, 0), 100);
    }
}
