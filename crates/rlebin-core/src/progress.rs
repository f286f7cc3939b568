//! Progress reporting for long-running row sweeps
//!
//! Operations report `(current, total)` synchronously at row or plane
//! boundaries. Reporting is advisory: it cannot abort an operation.

/// Receiver of progress notifications.
///
/// Implemented for every `FnMut(usize, usize)` closure.
pub trait ProgressObserver {
    /// Called after `current` of `total` units of work are done.
    fn on_progress(&mut self, current: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, current: usize, total: usize) {
        self(current, total)
    }
}

/// Observer that ignores all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _current: usize, _total: usize) {}
}

/// Reports each completed unit once, in order, to an observer.
pub struct ProgressTracker<'a> {
    observer: &'a mut dyn ProgressObserver,
    total: usize,
    done: usize,
}

impl<'a> ProgressTracker<'a> {
    /// Track `total` units of work.
    pub fn new(observer: &'a mut dyn ProgressObserver, total: usize) -> Self {
        ProgressTracker {
            observer,
            total,
            done: 0,
        }
    }

    /// Mark every unit before `unit` as done.
    ///
    /// Units are visited in ascending order but may be skipped; skipped
    /// units are reported as a single step.
    pub fn enter(&mut self, unit: usize) {
        let unit = unit.min(self.total);
        if unit > self.done {
            self.done = unit;
            self.observer.on_progress(self.done, self.total);
        }
    }

    /// Mark all units as done.
    pub fn finish(&mut self) {
        if self.done < self.total || self.total == 0 {
            self.done = self.total;
            self.observer.on_progress(self.total, self.total);
        }
    }
}
