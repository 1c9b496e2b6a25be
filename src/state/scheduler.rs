// Cancellable timeouts and animation frames on the single UI thread.
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Timeout,
    Frame,
}

/// Returned by the scheduling calls, consumed by [`Scheduler::cancel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    pub id: u64,
    pub kind: TaskKind,
}

pub trait Scheduler {
    /// Monotonic milliseconds, same clock as frame timestamps.
    fn now_ms(&self) -> f64;
    fn set_timeout(&self, delay_ms: f64, task: Box<dyn FnOnce()>) -> TaskHandle;
    /// `task` receives the frame timestamp in milliseconds.
    fn request_frame(&self, task: Box<dyn FnOnce(f64)>) -> TaskHandle;
    /// Cancelling a fired or unknown handle does nothing.
    fn cancel(&self, handle: TaskHandle);
}

/// Whole milliseconds handed to `setTimeout`. Truncates so a delay drawn
/// below an upper bound never lands on it.
pub fn timeout_ms(delay_ms: f64) -> i32 {
    if delay_ms.is_nan() || delay_ms <= 0.0 {
        return 0;
    }
    delay_ms.floor().min(i32::MAX as f64) as i32
}

enum Slot {
    Timeout(i32, Closure<dyn FnMut()>),
    Frame(i32, Closure<dyn FnMut(f64)>),
}

#[derive(Default)]
struct Slots {
    next_id: u64,
    live: HashMap<u64, Slot>,
    // Fired closures; dropped on the next scheduling call, never while running.
    spent: Vec<u64>,
    running: Option<u64>,
}

impl Slots {
    fn purge(&mut self) {
        for id in self.spent.drain(..) {
            self.live.remove(&id);
        }
    }

    fn finish(slots: &Weak<RefCell<Slots>>, id: u64) {
        if let Some(s) = slots.upgrade() {
            let mut s = s.borrow_mut();
            s.running = None;
            s.spent.push(id);
        }
    }
}

/// `window.setTimeout` / `requestAnimationFrame` backed scheduler.
pub struct BrowserScheduler {
    window: web_sys::Window,
    slots: Rc<RefCell<Slots>>,
}

impl BrowserScheduler {
    pub fn new() -> Option<Self> {
        Some(Self {
            window: web_sys::window()?,
            slots: Rc::new(RefCell::new(Slots::default())),
        })
    }

    fn reserve(&self) -> u64 {
        let mut s = self.slots.borrow_mut();
        s.purge();
        s.next_id += 1;
        s.next_id
    }
}

impl Scheduler for BrowserScheduler {
    fn now_ms(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn set_timeout(&self, delay_ms: f64, task: Box<dyn FnOnce()>) -> TaskHandle {
        let id = self.reserve();
        let handle = TaskHandle { id, kind: TaskKind::Timeout };
        let weak = Rc::downgrade(&self.slots);
        let mut task = Some(task);
        let cb = Closure::wrap(Box::new(move || {
            if let Some(s) = weak.upgrade() {
                s.borrow_mut().running = Some(id);
            }
            if let Some(t) = task.take() {
                t();
            }
            Slots::finish(&weak, id);
        }) as Box<dyn FnMut()>);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                timeout_ms(delay_ms),
            ) {
            Ok(js_id) => {
                self.slots.borrow_mut().live.insert(id, Slot::Timeout(js_id, cb));
            }
            Err(_) => crate::util::cerror("setTimeout failed"),
        }
        handle
    }

    fn request_frame(&self, task: Box<dyn FnOnce(f64)>) -> TaskHandle {
        let id = self.reserve();
        let handle = TaskHandle { id, kind: TaskKind::Frame };
        let weak = Rc::downgrade(&self.slots);
        let mut task = Some(task);
        let cb = Closure::wrap(Box::new(move |ts: f64| {
            if let Some(s) = weak.upgrade() {
                s.borrow_mut().running = Some(id);
            }
            if let Some(t) = task.take() {
                t(ts);
            }
            Slots::finish(&weak, id);
        }) as Box<dyn FnMut(f64)>);
        match self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(js_id) => {
                self.slots.borrow_mut().live.insert(id, Slot::Frame(js_id, cb));
            }
            Err(_) => crate::util::cerror("requestAnimationFrame failed"),
        }
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        let mut s = self.slots.borrow_mut();
        if s.running == Some(handle.id) {
            return;
        }
        match s.live.remove(&handle.id) {
            Some(Slot::Timeout(js_id, _cb)) => self.window.clear_timeout_with_handle(js_id),
            Some(Slot::Frame(js_id, _cb)) => {
                let _ = self.window.cancel_animation_frame(js_id);
            }
            None => {}
        }
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        let mut s = self.slots.borrow_mut();
        for (_, slot) in s.live.drain() {
            match slot {
                Slot::Timeout(js_id, _) => self.window.clear_timeout_with_handle(js_id),
                Slot::Frame(js_id, _) => {
                    let _ = self.window.cancel_animation_frame(js_id);
                }
            }
        }
    }
}

/// Virtual-clock scheduler; tasks only run when the test advances time.
#[cfg(test)]
pub mod manual {
    use super::*;

    #[derive(Default)]
    struct Inner {
        now: f64,
        next_id: u64,
        timeouts: Vec<(f64, u64, Box<dyn FnOnce()>)>,
        frames: Vec<(u64, Box<dyn FnOnce(f64)>)>,
        delays: Vec<f64>,
        cancelled: Vec<TaskHandle>,
    }

    #[derive(Default)]
    pub struct ManualScheduler {
        inner: RefCell<Inner>,
    }

    impl ManualScheduler {
        pub fn new() -> Rc<Self> {
            Rc::new(Self::default())
        }

        /// Runs every timeout due within `ms`, in deadline order.
        pub fn advance(&self, ms: f64) {
            let target = self.inner.borrow().now + ms;
            loop {
                let due = {
                    let mut inner = self.inner.borrow_mut();
                    let next = inner
                        .timeouts
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| t.0 <= target)
                        .min_by(|a, b| a.1.0.total_cmp(&b.1.0).then(a.1.1.cmp(&b.1.1)))
                        .map(|(i, _)| i);
                    next.map(|i| {
                        let (at, _, task) = inner.timeouts.remove(i);
                        inner.now = inner.now.max(at);
                        task
                    })
                };
                match due {
                    Some(task) => task(),
                    None => break,
                }
            }
            self.inner.borrow_mut().now = target;
        }

        /// Moves the clock by `dt_ms` and runs the frames requested before this call.
        pub fn frame(&self, dt_ms: f64) {
            let (now, frames) = {
                let mut inner = self.inner.borrow_mut();
                inner.now += dt_ms;
                (inner.now, std::mem::take(&mut inner.frames))
            };
            for (_, task) in frames {
                task(now);
            }
        }

        pub fn pending_timeouts(&self) -> usize {
            self.inner.borrow().timeouts.len()
        }

        pub fn pending_frames(&self) -> usize {
            self.inner.borrow().frames.len()
        }

        /// Every delay passed to `set_timeout`, in call order.
        pub fn requested_delays(&self) -> Vec<f64> {
            self.inner.borrow().delays.clone()
        }

        pub fn cancelled(&self) -> Vec<TaskHandle> {
            self.inner.borrow().cancelled.clone()
        }
    }

    impl Scheduler for ManualScheduler {
        fn now_ms(&self) -> f64 {
            self.inner.borrow().now
        }

        fn set_timeout(&self, delay_ms: f64, task: Box<dyn FnOnce()>) -> TaskHandle {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            let at = inner.now + delay_ms.max(0.0);
            inner.delays.push(delay_ms);
            inner.timeouts.push((at, id, task));
            TaskHandle { id, kind: TaskKind::Timeout }
        }

        fn request_frame(&self, task: Box<dyn FnOnce(f64)>) -> TaskHandle {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.frames.push((id, task));
            TaskHandle { id, kind: TaskKind::Frame }
        }

        fn cancel(&self, handle: TaskHandle) {
            let mut inner = self.inner.borrow_mut();
            let before = inner.timeouts.len() + inner.frames.len();
            inner.timeouts.retain(|t| t.1 != handle.id);
            inner.frames.retain(|f| f.0 != handle.id);
            if inner.timeouts.len() + inner.frames.len() < before {
                inner.cancelled.push(handle);
            }
        }
    }

    mod tests {
        use super::*;
        use std::cell::Cell;

        #[test]
        fn timeouts_fire_in_deadline_order() {
            let s = ManualScheduler::new();
            let log = Rc::new(RefCell::new(Vec::new()));
            for (delay, tag) in [(30.0, "c"), (10.0, "a"), (20.0, "b")] {
                let log = log.clone();
                s.set_timeout(delay, Box::new(move || log.borrow_mut().push(tag)));
            }
            s.advance(15.0);
            assert_eq!(*log.borrow(), vec!["a"]);
            s.advance(100.0);
            assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
            assert_eq!(s.now_ms(), 115.0);
        }

        #[test]
        fn cancelled_task_never_runs() {
            let s = ManualScheduler::new();
            let hit = Rc::new(Cell::new(false));
            let h = {
                let hit = hit.clone();
                s.set_timeout(5.0, Box::new(move || hit.set(true)))
            };
            s.cancel(h);
            s.cancel(h);
            s.advance(50.0);
            assert!(!hit.get());
            assert_eq!(s.cancelled(), vec![h]);
        }

        #[test]
        fn frames_requested_inside_a_frame_wait_for_the_next() {
            let s = ManualScheduler::new();
            let count = Rc::new(Cell::new(0));
            fn again(s: Rc<ManualScheduler>, count: Rc<Cell<u32>>) {
                let s2 = s.clone();
                s.request_frame(Box::new(move |_| {
                    count.set(count.get() + 1);
                    again(s2, count);
                }));
            }
            again(s.clone(), count.clone());
            s.frame(16.0);
            s.frame(16.0);
            assert_eq!(count.get(), 2);
            assert_eq!(s.pending_frames(), 1);
        }
    }
}
