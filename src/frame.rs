//! Self-rescheduling per-frame tasks with explicit cancellation.

use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::Rc;

use crate::error::Result;

pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// The host's "call me on the next display refresh" primitive.
///
/// In the browser this is `requestAnimationFrame`; the callback receives the
/// frame timestamp in milliseconds.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<i32>;
    fn cancel_frame(&self, id: i32);
}

#[derive(Debug, Default)]
struct TaskState {
    cancelled: Cell<bool>,
    finished: Cell<bool>,
    pending: Cell<Option<i32>>,
}

/// Owner's side of a running [`spawn_periodic`] task.
///
/// Dropping the handle does not stop the task; call [`TaskHandle::cancel`].
pub struct TaskHandle {
    state: Rc<TaskState>,
    scheduler: Rc<dyn FrameScheduler>,
}

impl TaskHandle {
    /// True until the task is cancelled or its body asks to stop.
    pub fn is_live(&self) -> bool {
        !self.state.cancelled.get() && !self.state.finished.get()
    }

    /// Stop the task. Any frame already requested is withdrawn, and a callback
    /// the host fires anyway returns without running the body.
    pub fn cancel(self) {
        self.state.cancelled.set(true);
        if let Some(id) = self.state.pending.take() {
            self.scheduler.cancel_frame(id);
        }
    }
}

/// Run `body` on every frame until it returns `Break` or the handle is
/// cancelled.
pub fn spawn_periodic<F>(scheduler: Rc<dyn FrameScheduler>, body: F) -> Result<TaskHandle>
where
    F: FnMut(f64) -> ControlFlow<()> + 'static,
{
    let state = Rc::new(TaskState::default());
    let body: Rc<RefCell<dyn FnMut(f64) -> ControlFlow<()>>> = Rc::new(RefCell::new(body));
    schedule_next(Rc::clone(&scheduler), Rc::clone(&state), body)?;
    Ok(TaskHandle { state, scheduler })
}

fn schedule_next(
    scheduler: Rc<dyn FrameScheduler>,
    state: Rc<TaskState>,
    body: Rc<RefCell<dyn FnMut(f64) -> ControlFlow<()>>>,
) -> Result<()> {
    let cb_scheduler = Rc::clone(&scheduler);
    let cb_state = Rc::clone(&state);
    let id = scheduler.request_frame(Box::new(move |timestamp| {
        cb_state.pending.set(None);
        if cb_state.cancelled.get() {
            return;
        }
        let flow = (&mut *body.borrow_mut())(timestamp);
        if flow.is_break() {
            cb_state.finished.set(true);
            return;
        }
        if cb_state.cancelled.get() {
            return;
        }
        if let Err(err) = schedule_next(cb_scheduler, Rc::clone(&cb_state), body) {
            log::error!("could not schedule next frame: {err}");
            cb_state.finished.set(true);
        }
    }))?;
    state.pending.set(Some(id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Queue {
        next_id: Cell<i32>,
        pending: RefCell<Vec<(i32, FrameCallback)>>,
        cancelled: RefCell<Vec<i32>>,
    }

    impl FrameScheduler for Queue {
        fn request_frame(&self, callback: FrameCallback) -> Result<i32> {
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            self.pending.borrow_mut().push((id, callback));
            Ok(id)
        }

        fn cancel_frame(&self, id: i32) {
            self.cancelled.borrow_mut().push(id);
            self.pending.borrow_mut().retain(|(p, _)| *p != id);
        }
    }

    impl Queue {
        fn fire(&self, ts: f64) {
            let due: Vec<_> = self.pending.borrow_mut().drain(..).collect();
            for (_, cb) in due {
                cb(ts);
            }
        }
    }

    #[test]
    fn break_ends_the_task() {
        let queue = Rc::new(Queue::default());
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let handle = spawn_periodic(queue.clone(), move |_| {
            seen.set(seen.get() + 1);
            if seen.get() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        for ts in 0..10 {
            queue.fire(ts as f64);
        }
        assert_eq!(count.get(), 3);
        assert!(!handle.is_live());
    }

    #[test]
    fn cancel_withdraws_pending_request() {
        let queue = Rc::new(Queue::default());
        let handle = spawn_periodic(queue.clone(), |_| ControlFlow::Continue(())).unwrap();
        queue.fire(0.0);
        handle.cancel();
        assert_eq!(queue.cancelled.borrow().as_slice(), &[2]);
        assert!(queue.pending.borrow().is_empty());
    }
}
