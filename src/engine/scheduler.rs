use anyhow::Result;
use std::cell::{Cell, RefCell};

/// Callback handed to the host, receives the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Opaque id of a pending frame request, used to cancel it
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// "call me back before the next paint"
/// - one request produces at most one callback
/// - re-arming is the caller's job, from inside the callback
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle>;
    fn cancel_frame(&self, handle: FrameHandle) -> Result<()>;
}

/// Scheduler that only fires when told to.
/// Headless hosts step it from their own loop, tests step it one frame at a
/// time.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: Cell<i32>,
    requested: Cell<usize>,
    pending: RefCell<Vec<(FrameHandle, FrameCallback)>>,
    cancelled: RefCell<Vec<FrameHandle>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Total requests ever made
    pub fn requested(&self) -> usize {
        self.requested.get()
    }

    pub fn cancelled(&self) -> Vec<FrameHandle> {
        self.cancelled.borrow().clone()
    }

    /// Fires every pending callback with `timestamp`, returns how many ran.
    /// Requests made while firing wait for the next call.
    pub fn run_frame(&self, timestamp: f64) -> usize {
        // take the queue first, callbacks re-arm through `request_frame`
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let count = due.len();
        for (_, callback) in due {
            callback(timestamp);
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.requested.set(self.requested.get() + 1);
        let handle = FrameHandle(id);
        self.pending.borrow_mut().push((handle, callback));
        Ok(handle)
    }

    fn cancel_frame(&self, handle: FrameHandle) -> Result<()> {
        self.pending.borrow_mut().retain(|(pending, _)| *pending != handle);
        self.cancelled.borrow_mut().push(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn fires_pending_callbacks_with_the_timestamp() {
        let scheduler = ManualScheduler::new();
        let seen = Rc::new(Cell::new(0.0));
        let sink = seen.clone();
        scheduler
            .request_frame(Box::new(move |timestamp| sink.set(timestamp)))
            .unwrap();

        assert_eq!(scheduler.run_frame(16.0), 1);
        assert_eq!(seen.get(), 16.0);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.run_frame(32.0), 0);
    }

    #[test]
    fn cancelled_request_never_fires() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let sink = fired.clone();
        let handle = scheduler
            .request_frame(Box::new(move |_| sink.set(true)))
            .unwrap();

        scheduler.cancel_frame(handle).unwrap();

        assert_eq!(scheduler.run_frame(16.0), 0);
        assert!(!fired.get());
        assert_eq!(scheduler.cancelled(), vec![handle]);
    }

    #[test]
    fn handles_are_unique() {
        let scheduler = ManualScheduler::new();
        let first = scheduler.request_frame(Box::new(|_| {})).unwrap();
        let second = scheduler.request_frame(Box::new(|_| {})).unwrap();
        assert_ne!(first, second);
        assert_eq!(scheduler.requested(), 2);
    }
}
