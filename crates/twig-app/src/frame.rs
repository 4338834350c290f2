//! Animation-frame queue
//!
//! The host decides when a frame ticks by calling [`FrameQueue::run_frame`].
//! Callbacks requested while a frame is running wait for the next tick.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type FrameCallback = Box<dyn FnOnce()>;

/// Shared queue of callbacks waiting for the next frame
#[derive(Clone, Default)]
pub struct FrameQueue {
    queue: Rc<RefCell<VecDeque<FrameCallback>>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` on the next frame
    pub fn request(&self, callback: impl FnOnce() + 'static) {
        self.queue.borrow_mut().push_back(Box::new(callback));
    }

    /// Callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Tick one frame. Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let batch: Vec<FrameCallback> = self.queue.borrow_mut().drain(..).collect();
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_requests_during_frame_wait_for_next() {
        let frames = FrameQueue::new();
        let runs = Rc::new(Cell::new(0));

        let (queue, counter) = (frames.clone(), runs.clone());
        frames.request(move || {
            counter.set(counter.get() + 1);
            let counter = counter.clone();
            queue.request(move || counter.set(counter.get() + 1));
        });

        assert_eq!(frames.run_frame(), 1);
        assert_eq!(runs.get(), 1);
        assert_eq!(frames.pending(), 1);

        assert_eq!(frames.run_frame(), 1);
        assert_eq!(runs.get(), 2);
        assert_eq!(frames.run_frame(), 0);
    }
}
