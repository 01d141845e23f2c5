//! Cancelable callback scheduling.
//!
//! Controllers never call browser timer APIs directly. They ask a
//! [`Scheduler`] for a timeout, interval or animation frame and keep the
//! returned [`TaskHandle`]. Cancelling (or dropping) the handle guarantees the
//! callback will not run afterwards. [`ManualScheduler`] drives the same
//! controllers on a virtual clock.

use crate::config::FRAME_INTERVAL_MS;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// Signal delivery from scheduled callbacks back to their owner.
pub type Wake<S> = Rc<dyn Fn(S)>;

/// Host event loop facade: a wall clock plus cancelable callbacks.
pub trait Scheduler {
    /// Milliseconds on a monotonic-enough wall clock.
    fn now_ms(&self) -> f64;
    fn timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle;
    fn interval(&self, period_ms: u32, task: Box<dyn FnMut()>) -> TaskHandle;
    /// Run `task` before the next display refresh.
    fn animation_frame(&self, task: Box<dyn FnOnce()>) -> TaskHandle;
}

/// Owning handle to a pending callback. Cancels on drop.
#[must_use = "dropping a TaskHandle cancels the task"]
pub struct TaskHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TaskHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Cancel whatever handle sits in `slot`.
pub(crate) fn cancel_slot(slot: &mut Option<TaskHandle>) {
    if let Some(handle) = slot.take() {
        handle.cancel();
    }
}

enum Job {
    Once(Box<dyn FnOnce()>),
    Every(u32, Box<dyn FnMut()>),
}

struct Pending {
    due: f64,
    job: Job,
}

#[derive(Default)]
struct Queue {
    now: f64,
    next_id: u64,
    tasks: BTreeMap<u64, Pending>,
    running: Option<u64>,
    running_cancelled: bool,
}

impl Queue {
    fn push(&mut self, due: f64, job: Job) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.insert(id, Pending { due, job });
        id
    }

    /// Earliest task due at or before `until`, ties broken by creation order.
    fn next_due(&self, until: f64) -> Option<u64> {
        self.tasks
            .iter()
            .filter(|(_, p)| p.due <= until)
            .min_by(|(a_id, a), (b_id, b)| a.due.total_cmp(&b.due).then(a_id.cmp(b_id)))
            .map(|(id, _)| *id)
    }
}

/// Virtual-time scheduler. Nothing runs until [`ManualScheduler::advance`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Queue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks still waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }

    /// Move the clock forward by `ms`, running every callback that falls due,
    /// in due order. Returns how many callbacks ran.
    pub fn advance(&self, ms: f64) -> usize {
        let until = self.queue.borrow().now + ms;
        let mut ran = 0;
        loop {
            let (id, pending) = {
                let mut q = self.queue.borrow_mut();
                let Some(id) = q.next_due(until) else {
                    break;
                };
                let Some(pending) = q.tasks.remove(&id) else {
                    break;
                };
                q.now = pending.due;
                q.running = Some(id);
                q.running_cancelled = false;
                (id, pending)
            };
            // The queue is not borrowed while the task runs, so it may
            // schedule or cancel freely.
            ran += 1;
            match pending.job {
                Job::Once(task) => task(),
                Job::Every(period, mut task) => {
                    task();
                    let mut q = self.queue.borrow_mut();
                    if !q.running_cancelled {
                        q.tasks.insert(
                            id,
                            Pending {
                                due: pending.due + period as f64,
                                job: Job::Every(period, task),
                            },
                        );
                    }
                }
            }
            self.queue.borrow_mut().running = None;
        }
        self.queue.borrow_mut().now = until;
        ran
    }

    fn handle(&self, id: u64) -> TaskHandle {
        let queue: Weak<RefCell<Queue>> = Rc::downgrade(&self.queue);
        TaskHandle::new(move || {
            let Some(queue) = queue.upgrade() else {
                return;
            };
            let mut q = queue.borrow_mut();
            if q.tasks.remove(&id).is_none() && q.running == Some(id) {
                q.running_cancelled = true;
            }
        })
    }
}

impl Scheduler for ManualScheduler {
    fn now_ms(&self) -> f64 {
        self.queue.borrow().now
    }

    fn timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        let id = {
            let mut q = self.queue.borrow_mut();
            let due = q.now + delay_ms as f64;
            q.push(due, Job::Once(task))
        };
        self.handle(id)
    }

    fn interval(&self, period_ms: u32, task: Box<dyn FnMut()>) -> TaskHandle {
        let period = period_ms.max(1);
        let id = {
            let mut q = self.queue.borrow_mut();
            let due = q.now + period as f64;
            q.push(due, Job::Every(period, task))
        };
        self.handle(id)
    }

    fn animation_frame(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
        let id = {
            let mut q = self.queue.borrow_mut();
            let due = q.now + FRAME_INTERVAL_MS;
            q.push(due, Job::Once(task))
        };
        self.handle(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() -> Box<dyn FnMut()>) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move || -> Box<dyn FnMut()> {
            let h = h.clone();
            Box::new(move || h.set(h.get() + 1))
        })
    }

    #[test]
    fn timeouts_fire_once_in_due_order() {
        let sched = ManualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (order.clone(), order.clone());
        let _late = sched.timeout(200, Box::new(move || a.borrow_mut().push("late")));
        let _early = sched.timeout(100, Box::new(move || b.borrow_mut().push("early")));

        assert_eq!(sched.advance(99.0), 0);
        assert_eq!(sched.advance(500.0), 2);
        assert_eq!(*order.borrow(), vec!["early", "late"]);
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.now_ms(), 599.0);
    }

    #[test]
    fn dropped_handle_never_fires() {
        let sched = ManualScheduler::new();
        let (hits, make) = counter();
        let mut task = make();
        let handle = sched.timeout(10, Box::new(move || task()));
        handle.cancel();
        sched.advance(100.0);
        assert_eq!(hits.get(), 0);

        let mut task = make();
        drop(sched.interval(10, Box::new(move || task())));
        sched.advance(100.0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn interval_repeats_until_cancelled() {
        let sched = ManualScheduler::new();
        let (hits, make) = counter();
        let handle = sched.interval(500, make());
        sched.advance(1_600.0);
        assert_eq!(hits.get(), 3);
        handle.cancel();
        sched.advance(5_000.0);
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn interval_can_cancel_itself_while_running() {
        let sched = ManualScheduler::new();
        let slot: Rc<RefCell<Option<TaskHandle>>> = Rc::new(RefCell::new(None));
        let (hits, _) = counter();
        let (h, s) = (hits.clone(), slot.clone());
        let handle = sched.interval(
            10,
            Box::new(move || {
                h.set(h.get() + 1);
                s.borrow_mut().take();
            }),
        );
        *slot.borrow_mut() = Some(handle);
        sched.advance(100.0);
        assert_eq!(hits.get(), 1);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn tasks_scheduled_from_tasks_run_in_same_advance() {
        let sched = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let keep: Rc<RefCell<Vec<TaskHandle>>> = Rc::default();
        let (s, h, k) = (sched.clone(), hits.clone(), keep.clone());
        let first = sched.animation_frame(Box::new(move || {
            h.set(h.get() + 1);
            let h2 = h.clone();
            k.borrow_mut()
                .push(s.animation_frame(Box::new(move || h2.set(h2.get() + 1))));
        }));
        sched.advance(FRAME_INTERVAL_MS * 2.0);
        assert_eq!(hits.get(), 2);
        drop(first);
    }
}
