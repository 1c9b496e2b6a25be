// Randomized glitch pulses for degraded feeds.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::random::{RandomSource, SharedRandom};
use super::scheduler::{Scheduler, TaskHandle};
use crate::model::GlitchBounds;
use crate::util::clog;

/// Uniform delay in `[min, max)`; `min` when the range is empty.
pub fn next_delay(bounds: GlitchBounds, rng: &mut dyn RandomSource) -> f64 {
    let span = bounds.max_ms - bounds.min_ms;
    if span <= 0.0 {
        return bounds.min_ms;
    }
    let d = bounds.min_ms + rng.next_f64() * span;
    if d < bounds.max_ms { d } else { bounds.min_ms }
}

struct Run {
    bounds: GlitchBounds,
    scheduler: Rc<dyn Scheduler>,
    rng: SharedRandom,
    on_pulse: Rc<dyn Fn()>,
}

#[derive(Default)]
struct Inner {
    run: Option<Rc<Run>>,
    pending: Option<TaskHandle>,
    // Bumped on every start/stop so stale callbacks drop out.
    generation: u64,
    pulses: u64,
}

#[derive(Default)]
pub struct GlitchScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl GlitchScheduler {
    /// Replaces any running schedule.
    pub fn start(
        &mut self,
        bounds: GlitchBounds,
        scheduler: Rc<dyn Scheduler>,
        rng: SharedRandom,
        on_pulse: Rc<dyn Fn()>,
    ) {
        self.stop();
        let generation = {
            let mut g = self.inner.borrow_mut();
            g.run = Some(Rc::new(Run { bounds, scheduler, rng, on_pulse }));
            g.generation
        };
        clog(&format!("glitch: start [{}, {}) ms", bounds.min_ms, bounds.max_ms));
        arm(&self.inner, generation);
    }

    pub fn stop(&mut self) {
        let mut g = self.inner.borrow_mut();
        g.generation += 1;
        let run = g.run.take();
        if let (Some(run), Some(handle)) = (run, g.pending.take()) {
            run.scheduler.cancel(handle);
            clog("glitch: stop");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().run.is_some()
    }

    pub fn pending(&self) -> Option<TaskHandle> {
        self.inner.borrow().pending
    }

    pub fn pulses(&self) -> u64 {
        self.inner.borrow().pulses
    }
}

impl Drop for GlitchScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn arm(inner: &Rc<RefCell<Inner>>, generation: u64) {
    let Some(run) = inner.borrow().run.clone() else {
        return;
    };
    let delay = next_delay(run.bounds, &mut *run.rng.borrow_mut());
    let weak: Weak<RefCell<Inner>> = Rc::downgrade(inner);
    let handle = run.scheduler.set_timeout(
        delay,
        Box::new(move || fire(weak, generation)),
    );
    inner.borrow_mut().pending = Some(handle);
}

fn fire(weak: Weak<RefCell<Inner>>, generation: u64) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let on_pulse = {
        let mut g = inner.borrow_mut();
        if g.generation != generation {
            return;
        }
        let Some(run) = g.run.clone() else {
            return;
        };
        g.pending = None;
        g.pulses += 1;
        run.on_pulse.clone()
    };
    on_pulse();
    if inner.borrow().generation == generation {
        arm(&inner, generation);
    }
}
