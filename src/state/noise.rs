//! Procedural analog static for feeds that lost their signal.
//!
//! Frames are rendered into a small RGBA working buffer and handed to the
//! display, which scales them up without smoothing. Each frame is blended with
//! the one before it so the static smears like a phosphor screen.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::display::FeedDisplay;
use super::random::{RandomSource, SharedRandom};
use super::scheduler::{Scheduler, TaskHandle};
use crate::config::EffectsConfig;
use crate::util::clog;

/// Working buffer dimensions for a drawing surface of `target_w` x `target_h`.
pub fn buffer_size(target_w: u32, target_h: u32, cfg: &EffectsConfig) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * cfg.buffer_scale).floor() as u32).max(cfg.min_buffer);
    (scale(target_w), scale(target_h))
}

/// A rendered RGBA frame, row-major, 4 bytes per pixel.
#[derive(Clone, Copy, Debug)]
pub struct NoiseFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

pub struct NoiseGenerator {
    width: u32,
    height: u32,
    current: Vec<u8>,
    previous: Vec<u8>,
    /// `current` holds a finished frame.
    has_frame: bool,
    cfg: EffectsConfig,
}

impl NoiseGenerator {
    pub fn new(target_w: u32, target_h: u32, cfg: EffectsConfig) -> Self {
        let (width, height) = buffer_size(target_w, target_h, &cfg);
        let len = (width * height * 4) as usize;
        Self {
            width,
            height,
            current: vec![0; len],
            previous: vec![0; len],
            has_frame: false,
            cfg,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Forgets the previous frame; the next render starts unblended.
    pub fn reset(&mut self) {
        self.has_frame = false;
        self.current.fill(0);
        self.previous.fill(0);
    }

    pub fn frame(&self) -> NoiseFrame<'_> {
        NoiseFrame {
            width: self.width,
            height: self.height,
            data: &self.current,
        }
    }

    /// Renders one frame at `elapsed_s` seconds since the loop started.
    pub fn render(&mut self, elapsed_s: f64, rng: &mut dyn RandomSource) -> NoiseFrame<'_> {
        let blend = self.has_frame;
        if blend {
            std::mem::swap(&mut self.current, &mut self.previous);
        }
        let (w, h) = (self.width as usize, self.height as usize);
        let cfg = &self.cfg;

        for px in self.current.chunks_exact_mut(4) {
            let v = (cfg.base_gray + rng.next_f64() * cfg.gray_span).clamp(0.0, 255.0) as u8;
            px[0] = v;
            px[1] = v;
            px[2] = v;
            px[3] = 255;
        }

        let band_top = ((elapsed_s.max(0.0) * cfg.band_speed) % h as f64).floor() as usize;
        let band_end = (band_top + cfg.band_height as usize).min(h);
        for y in band_top..band_end {
            let row = &mut self.current[y * w * 4..(y + 1) * w * 4];
            for px in row.chunks_exact_mut(4) {
                for c in &mut px[..3] {
                    *c = c.saturating_add(cfg.band_boost);
                }
            }
        }

        let speckles = (cfg.speckle_density * (w * h) as f64).floor() as usize;
        for _ in 0..speckles {
            let x = ((rng.next_f64() * w as f64) as usize).min(w - 1);
            let y = ((rng.next_f64() * h as f64) as usize).min(h - 1);
            let i = (y * w + x) * 4;
            self.current[i..i + 3].fill(255);
        }

        if blend {
            let keep = cfg.persistence.clamp(0.0, 1.0);
            for (px, prev) in self.current.chunks_exact_mut(4).zip(self.previous.chunks_exact(4)) {
                for c in 0..3 {
                    let mixed = px[c] as f64 * (1.0 - keep) + prev[c] as f64 * keep;
                    px[c] = mixed.round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        self.has_frame = true;
        self.frame()
    }
}

/// Limits rendering to a target rate regardless of how often frames arrive.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePacer {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl FramePacer {
    pub fn new(interval_ms: f64) -> Self {
        Self { interval_ms, last_ms: None }
    }

    pub fn should_render(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

struct Run {
    scheduler: Rc<dyn Scheduler>,
    rng: SharedRandom,
    display: Rc<dyn FeedDisplay>,
    generator: NoiseGenerator,
    pacer: FramePacer,
    started_ms: Option<f64>,
}

#[derive(Default)]
struct Inner {
    run: Option<Run>,
    pending: Option<TaskHandle>,
    generation: u64,
    frames: u64,
}

/// Drives a [`NoiseGenerator`] from animation frames until stopped.
#[derive(Default)]
pub struct NoiseLoop {
    inner: Rc<RefCell<Inner>>,
}

impl NoiseLoop {
    pub fn start(
        &mut self,
        cfg: &EffectsConfig,
        surface: (u32, u32),
        scheduler: Rc<dyn Scheduler>,
        rng: SharedRandom,
        display: Rc<dyn FeedDisplay>,
    ) {
        self.stop();
        let generation = {
            let mut g = self.inner.borrow_mut();
            let generator = NoiseGenerator::new(surface.0, surface.1, cfg.clone());
            let (w, h) = generator.size();
            clog(&format!("noise: start {}x{} buffer for {}x{}", w, h, surface.0, surface.1));
            g.run = Some(Run {
                scheduler,
                rng,
                display,
                generator,
                pacer: FramePacer::new(cfg.frame_interval_ms()),
                started_ms: None,
            });
            g.frames = 0;
            g.generation
        };
        request(&self.inner, generation);
    }

    /// Cancels the pending frame and drops all buffered frame state.
    pub fn stop(&mut self) {
        let mut g = self.inner.borrow_mut();
        g.generation += 1;
        let pending = g.pending.take();
        // Dropping the run releases both frame buffers.
        if let Some(run) = g.run.take() {
            if let Some(handle) = pending {
                run.scheduler.cancel(handle);
            }
            clog("noise: stop");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().run.is_some()
    }

    pub fn pending(&self) -> Option<TaskHandle> {
        self.inner.borrow().pending
    }

    /// Frames rendered since the last start.
    pub fn frames_rendered(&self) -> u64 {
        self.inner.borrow().frames
    }
}

impl Drop for NoiseLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request(inner: &Rc<RefCell<Inner>>, generation: u64) {
    let Some(scheduler) = inner.borrow().run.as_ref().map(|r| r.scheduler.clone()) else {
        return;
    };
    let weak: Weak<RefCell<Inner>> = Rc::downgrade(inner);
    let handle = scheduler.request_frame(Box::new(move |ts| on_frame(weak, generation, ts)));
    inner.borrow_mut().pending = Some(handle);
}

fn on_frame(weak: Weak<RefCell<Inner>>, generation: u64, ts: f64) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    {
        let mut guard = inner.borrow_mut();
        if guard.generation != generation {
            return;
        }
        guard.pending = None;
        let g = &mut *guard;
        let Some(run) = g.run.as_mut() else {
            return;
        };
        if run.pacer.should_render(ts) {
            let started = *run.started_ms.get_or_insert(ts);
            let elapsed_s = (ts - started) / 1000.0;
            let frame = run.generator.render(elapsed_s, &mut *run.rng.borrow_mut());
            run.display.draw_noise(&frame);
            g.frames += 1;
        }
    }
    request(&inner, generation);
}
